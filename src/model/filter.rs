use super::ModelError;

/// Positions into the transaction sequence that matched the last applied
/// filter. Only meaningful for the sequence it was validated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedFilterIndices {
    indices: Vec<usize>,
}

impl MatchedFilterIndices {
    /// Replace the whole set, provided every index is below `len`.
    ///
    /// Nothing is written unless all of `indices` are valid.
    pub fn replace(&mut self, indices: &[usize], len: usize) -> Result<(), ModelError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(ModelError::InvalidArgument(format!(
                "matched filter index {} is out of range for {} transactions",
                index, len
            )));
        }
        self.indices = indices.to_vec();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.indices.clone()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

//! Transaction filters. A filter decides which positions of the model's
//! transaction sequence match; the model only stores the outcome.

use crate::model::{ExpenseTrackerModel, ModelError};
use crate::transaction::{Category, Transaction};
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("minimum amount {min} is greater than maximum amount {max}")]
    InvertedRange { min: Decimal, max: Decimal },
}

pub trait TransactionFilter {
    fn matches(&self, transaction: &Transaction) -> bool;

    /// Positions of all matching transactions, in sequence order.
    fn matched_indices(&self, transactions: &[Transaction]) -> Vec<usize> {
        transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| self.matches(t))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Inclusive amount range; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountFilter {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl AmountFilter {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self, FilterError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(FilterError::InvertedRange { min, max });
            }
        }
        Ok(Self { min, max })
    }
}

impl TransactionFilter for AmountFilter {
    fn matches(&self, transaction: &Transaction) -> bool {
        let amount = transaction.amount();
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter(pub Category);

impl TransactionFilter for CategoryFilter {
    fn matches(&self, transaction: &Transaction) -> bool {
        transaction.category() == self.0
    }
}

/// Matches transactions accepted by every inner filter.
#[derive(Default)]
pub struct AllOf(pub Vec<Box<dyn TransactionFilter>>);

impl TransactionFilter for AllOf {
    fn matches(&self, transaction: &Transaction) -> bool {
        self.0.iter().all(|f| f.matches(transaction))
    }
}

/// Run `filter` against the model's current transactions and store the result
/// as its matched filter indices.
pub fn apply_filter(
    model: &mut ExpenseTrackerModel,
    filter: &dyn TransactionFilter,
) -> Result<(), ModelError> {
    let indices = filter.matched_indices(&model.transactions());
    log::info!(
        "Filter matched {} of {} transactions",
        indices.len(),
        model.transaction_count()
    );
    model.set_matched_filter_indices(&indices)
}

use crate::transaction::Transaction;
use rust_decimal::Decimal;

/// Ordered transactions in display order. Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Remove the first transaction equal to `transaction`.
    ///
    /// Returns `false` and leaves the store untouched if there is none.
    pub fn remove_first(&mut self, transaction: &Transaction) -> bool {
        match self.transactions.iter().position(|t| t == transaction) {
            Some(pos) => {
                self.transactions.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Owned copy of the current sequence.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total_cost(&self) -> Decimal {
        self.transactions.iter().map(Transaction::amount).sum()
    }

    /// Sum of the amounts at `positions`. Positions past the end are skipped.
    pub fn total_cost_at(&self, positions: &[usize]) -> Decimal {
        positions
            .iter()
            .filter_map(|&i| self.transactions.get(i))
            .map(Transaction::amount)
            .sum()
    }
}

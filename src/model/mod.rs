//! Observable expense tracker model.
//!
//! [`ExpenseTrackerModel`] owns the transaction sequence, the positions that
//! matched the last externally computed filter, and the listeners to notify
//! after each change.
//!
//! # Invariants
//!
//! 1. Every matched filter index is below the transaction count at the time
//!    it was set.
//! 2. Adding or removing a transaction clears the matched filter indices.
//! 3. A listener handle is registered at most once.
//! 4. Getters hand out owned copies, never views into the model.
//!
//! A failed validation leaves the model untouched. A failing listener does
//! not roll back the mutation that triggered it.

pub mod filter;
pub mod listeners;
pub mod store;

pub use filter::MatchedFilterIndices;
pub use listeners::{ListenerRegistry, ModelListener};
pub use store::TransactionStore;

use crate::transaction::Transaction;
use rust_decimal::Decimal;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("listener update failed: {0:#}")]
    Listener(anyhow::Error),
}

#[derive(Debug, Default)]
pub struct ExpenseTrackerModel {
    transactions: TransactionStore,
    matched_filter_indices: MatchedFilterIndices,
    listeners: ListenerRegistry,
}

impl ExpenseTrackerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction and notify listeners.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), ModelError> {
        log::debug!("Adding transaction: {:?}", transaction);
        self.transactions.push(transaction);
        // The previous filter is no longer valid.
        self.matched_filter_indices.clear();
        self.state_changed()
    }

    /// Remove the first transaction equal to `transaction` and notify
    /// listeners.
    ///
    /// The matched filter indices are cleared and listeners notified even when
    /// no transaction was equal, so callers always observe a refresh.
    pub fn remove_transaction(&mut self, transaction: &Transaction) -> Result<(), ModelError> {
        if self.transactions.remove_first(transaction) {
            log::debug!("Removed transaction: {:?}", transaction);
        } else {
            log::debug!("Transaction to remove not found: {:?}", transaction);
        }
        self.matched_filter_indices.clear();
        self.state_changed()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.snapshot()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total_cost(&self) -> Decimal {
        self.transactions.total_cost()
    }

    /// Total of the transactions at the matched filter indices.
    pub fn matched_total_cost(&self) -> Decimal {
        self.transactions.total_cost_at(&self.matched_filter_indices.to_vec())
    }

    /// Replace the matched filter indices and notify listeners.
    ///
    /// Fails with [`ModelError::InvalidArgument`] if any index is not a
    /// position in the current transaction sequence, in which case the
    /// previous indices are kept.
    pub fn set_matched_filter_indices(&mut self, indices: &[usize]) -> Result<(), ModelError> {
        if let Err(err) = self
            .matched_filter_indices
            .replace(indices, self.transactions.len())
        {
            log::warn!("Rejected matched filter indices {:?}: {}", indices, err);
            return Err(err);
        }
        log::debug!("Matched filter indices set to {:?}", indices);
        self.state_changed()
    }

    pub fn matched_filter_indices(&self) -> Vec<usize> {
        self.matched_filter_indices.to_vec()
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched_filter_indices.contains(index)
    }

    /// Register `listener` for state change notifications.
    ///
    /// Returns `false` if this exact handle is already registered.
    pub fn register(&mut self, listener: Rc<dyn ModelListener>) -> bool {
        self.listeners.register(listener)
    }

    pub fn number_of_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn contains_listener(&self, listener: &Rc<dyn ModelListener>) -> bool {
        self.listeners.contains(listener)
    }

    fn state_changed(&self) -> Result<(), ModelError> {
        self.listeners.notify(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{parse_datetime, Category};
    use rust_decimal_macros::dec;
    use std::cell::{Cell, RefCell};

    fn tx(amount: Decimal, category: Category) -> Transaction {
        Transaction::new(amount, category, parse_datetime("2024-01-15").unwrap()).unwrap()
    }

    /// Counts updates and remembers what the model looked like each time.
    #[derive(Default)]
    struct Recorder {
        updates: Cell<usize>,
        seen_lengths: RefCell<Vec<usize>>,
        seen_indices: RefCell<Vec<Vec<usize>>>,
    }

    impl ModelListener for Recorder {
        fn update(&self, model: &ExpenseTrackerModel) -> anyhow::Result<()> {
            self.updates.set(self.updates.get() + 1);
            self.seen_lengths.borrow_mut().push(model.transaction_count());
            self.seen_indices
                .borrow_mut()
                .push(model.matched_filter_indices());
            Ok(())
        }
    }

    /// Appends its name to a shared log.
    struct Named {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ModelListener for Named {
        fn update(&self, _model: &ExpenseTrackerModel) -> anyhow::Result<()> {
            self.log.borrow_mut().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl ModelListener for Failing {
        fn update(&self, _model: &ExpenseTrackerModel) -> anyhow::Result<()> {
            anyhow::bail!("view is gone")
        }
    }

    fn model_with_recorder() -> (ExpenseTrackerModel, Rc<Recorder>) {
        let mut model = ExpenseTrackerModel::new();
        let recorder = Rc::new(Recorder::default());
        assert!(model.register(recorder.clone()));
        (model, recorder)
    }

    #[test]
    fn new_model_is_empty() {
        let model = ExpenseTrackerModel::new();
        assert!(model.is_empty());
        assert!(model.transactions().is_empty());
        assert!(model.matched_filter_indices().is_empty());
        assert_eq!(model.number_of_listeners(), 0);
        assert_eq!(model.total_cost(), Decimal::ZERO);
    }

    #[test]
    fn add_appends_to_the_end() {
        let mut model = ExpenseTrackerModel::new();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        let last = tx(dec!(20), Category::Bills);
        model.add_transaction(last.clone()).unwrap();

        let transactions = model.transactions();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions.last(), Some(&last));
    }

    #[test]
    fn add_permits_duplicates() {
        let mut model = ExpenseTrackerModel::new();
        let lunch = tx(dec!(10), Category::Food);
        model.add_transaction(lunch.clone()).unwrap();
        model.add_transaction(lunch.clone()).unwrap();
        assert_eq!(model.transactions(), vec![lunch.clone(), lunch]);
    }

    #[test]
    fn add_clears_matched_filter_indices() {
        let (mut model, recorder) = model_with_recorder();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.set_matched_filter_indices(&[0]).unwrap();

        model.add_transaction(tx(dec!(5), Category::Other)).unwrap();
        assert!(model.matched_filter_indices().is_empty());
        // the listener already sees the cleared set
        assert_eq!(recorder.seen_indices.borrow().last(), Some(&vec![]));
    }

    #[test]
    fn remove_clears_matched_filter_indices() {
        let mut model = ExpenseTrackerModel::new();
        let lunch = tx(dec!(10), Category::Food);
        model.add_transaction(lunch.clone()).unwrap();
        model.add_transaction(tx(dec!(30), Category::Travel)).unwrap();
        model.set_matched_filter_indices(&[0, 1]).unwrap();

        model.remove_transaction(&lunch).unwrap();
        assert!(model.matched_filter_indices().is_empty());
        assert_eq!(model.transaction_count(), 1);
        assert_eq!(model.transactions()[0].category(), Category::Travel);
    }

    #[test]
    fn remove_takes_first_equal_transaction() {
        let mut model = ExpenseTrackerModel::new();
        let lunch = tx(dec!(10), Category::Food);
        let train = tx(dec!(30), Category::Travel);
        model.add_transaction(lunch.clone()).unwrap();
        model.add_transaction(train.clone()).unwrap();
        model.add_transaction(lunch.clone()).unwrap();

        model.remove_transaction(&lunch).unwrap();
        assert_eq!(model.transactions(), vec![train, lunch]);
    }

    #[test]
    fn remove_missing_still_clears_and_notifies() {
        let (mut model, recorder) = model_with_recorder();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.set_matched_filter_indices(&[0]).unwrap();
        assert_eq!(recorder.updates.get(), 2);

        model
            .remove_transaction(&tx(dec!(99), Category::Entertainment))
            .unwrap();
        assert_eq!(model.transaction_count(), 1);
        assert!(model.matched_filter_indices().is_empty());
        assert_eq!(recorder.updates.get(), 3);
    }

    #[test]
    fn out_of_range_index_is_rejected_and_previous_set_kept() {
        let (mut model, recorder) = model_with_recorder();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.add_transaction(tx(dec!(20), Category::Food)).unwrap();
        model.set_matched_filter_indices(&[1]).unwrap();
        let updates = recorder.updates.get();

        let err = model.set_matched_filter_indices(&[0, 2]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
        assert_eq!(model.matched_filter_indices(), vec![1]);
        // no notification on the error path
        assert_eq!(recorder.updates.get(), updates);
    }

    #[test]
    fn matched_total_follows_the_filter() {
        let mut model = ExpenseTrackerModel::new();
        model.add_transaction(tx(dec!(12.5), Category::Food)).unwrap();
        model.add_transaction(tx(dec!(320), Category::Travel)).unwrap();
        model.add_transaction(tx(dec!(7), Category::Food)).unwrap();
        assert_eq!(model.matched_total_cost(), Decimal::ZERO);

        model.set_matched_filter_indices(&[0, 2]).unwrap();
        assert_eq!(model.matched_total_cost(), dec!(19.5));
        assert_eq!(model.total_cost(), dec!(339.5));

        model.add_transaction(tx(dec!(1), Category::Other)).unwrap();
        assert_eq!(model.matched_total_cost(), Decimal::ZERO);
    }

    #[test]
    fn any_index_on_empty_model_is_rejected() {
        let mut model = ExpenseTrackerModel::new();
        assert!(model.set_matched_filter_indices(&[0]).is_err());
        model.set_matched_filter_indices(&[]).unwrap();
        assert!(model.matched_filter_indices().is_empty());
    }

    #[test]
    fn getters_return_independent_copies() {
        let mut model = ExpenseTrackerModel::new();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.set_matched_filter_indices(&[0]).unwrap();

        let mut transactions = model.transactions();
        transactions.clear();
        let mut indices = model.matched_filter_indices();
        indices.push(7);

        assert_eq!(model.transaction_count(), 1);
        assert_eq!(model.matched_filter_indices(), vec![0]);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_mutation() {
        let mut model = ExpenseTrackerModel::new();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        let before = model.transactions();

        model.add_transaction(tx(dec!(20), Category::Bills)).unwrap();
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn setter_copies_callers_indices() {
        let mut model = ExpenseTrackerModel::new();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.add_transaction(tx(dec!(20), Category::Food)).unwrap();

        let mut indices = vec![0, 1];
        model.set_matched_filter_indices(&indices).unwrap();
        indices[0] = 1;
        assert_eq!(model.matched_filter_indices(), vec![0, 1]);
    }

    #[test]
    fn registering_twice_counts_once() {
        let mut model = ExpenseTrackerModel::new();
        let recorder = Rc::new(Recorder::default());
        let handle: Rc<dyn ModelListener> = recorder.clone();

        assert!(model.register(handle.clone()));
        assert!(!model.register(handle.clone()));
        assert_eq!(model.number_of_listeners(), 1);
        assert!(model.contains_listener(&handle));

        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        assert_eq!(recorder.updates.get(), 1);
    }

    #[test]
    fn contains_listener_for_unregistered_handle() {
        let (model, _recorder) = model_with_recorder();
        let other: Rc<dyn ModelListener> = Rc::new(Recorder::default());
        assert!(!model.contains_listener(&other));
    }

    #[test]
    fn listeners_notified_in_registration_order_once_each() {
        let mut model = ExpenseTrackerModel::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        model.register(Rc::new(Named {
            name: "first",
            log: log.clone(),
        }));
        model.register(Rc::new(Named {
            name: "second",
            log: log.clone(),
        }));

        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn listener_sees_model_after_the_change() {
        let (mut model, recorder) = model_with_recorder();
        model.add_transaction(tx(dec!(10), Category::Food)).unwrap();
        model.add_transaction(tx(dec!(20), Category::Food)).unwrap();
        model.set_matched_filter_indices(&[1]).unwrap();

        assert_eq!(*recorder.seen_lengths.borrow(), vec![1, 2, 2]);
        assert_eq!(recorder.seen_indices.borrow()[2], vec![1]);
    }

    #[test]
    fn failing_listener_stops_the_pass_but_keeps_the_change() {
        let mut model = ExpenseTrackerModel::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        model.register(Rc::new(Named {
            name: "before",
            log: log.clone(),
        }));
        model.register(Rc::new(Failing));
        model.register(Rc::new(Named {
            name: "after",
            log: log.clone(),
        }));

        let err = model
            .add_transaction(tx(dec!(10), Category::Food))
            .unwrap_err();
        assert!(matches!(err, ModelError::Listener(_)));
        assert!(err.to_string().contains("view is gone"));
        assert_eq!(model.transaction_count(), 1);
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[test]
    fn add_filter_add_scenario() {
        let (mut model, recorder) = model_with_recorder();
        let t1 = tx(dec!(10), Category::Food);
        let t2 = tx(dec!(25), Category::Travel);

        model.add_transaction(t1.clone()).unwrap();
        assert_eq!(model.transactions(), vec![t1.clone()]);
        assert_eq!(recorder.updates.get(), 1);

        model.set_matched_filter_indices(&[0]).unwrap();
        assert_eq!(model.matched_filter_indices(), vec![0]);

        model.add_transaction(t2.clone()).unwrap();
        assert!(model.matched_filter_indices().is_empty());
        assert_eq!(model.transactions(), vec![t1, t2]);

        let err = model.set_matched_filter_indices(&[2]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
        assert!(model.matched_filter_indices().is_empty());
    }
}

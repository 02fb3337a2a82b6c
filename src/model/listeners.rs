use super::{ExpenseTrackerModel, ModelError};
use std::rc::Rc;

/// Observer of an [`ExpenseTrackerModel`].
///
/// `update` runs synchronously after every successful mutation, with a shared
/// reference to the model that was changed.
pub trait ModelListener {
    fn update(&self, model: &ExpenseTrackerModel) -> anyhow::Result<()>;
}

/// Registered listeners, unique by handle identity, kept in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Rc<dyn ModelListener>>,
}

impl ListenerRegistry {
    /// Add `listener` unless the same handle is already registered.
    pub fn register(&mut self, listener: Rc<dyn ModelListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub fn contains(&self, listener: &Rc<dyn ModelListener>) -> bool {
        self.listeners.iter().any(|l| same_handle(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run one notification pass over a snapshot of the registry.
    ///
    /// The first listener error ends the pass; later listeners are not called.
    pub fn notify(&self, model: &ExpenseTrackerModel) -> Result<(), ModelError> {
        if self.is_empty() {
            return Ok(());
        }
        let snapshot = self.listeners.clone();
        for (position, listener) in snapshot.iter().enumerate() {
            if let Err(err) = listener.update(model) {
                log::warn!(
                    "Listener {} of {} failed, skipping the rest: {:#}",
                    position + 1,
                    snapshot.len(),
                    err
                );
                return Err(ModelError::Listener(err));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_handle(a: &Rc<dyn ModelListener>, b: &Rc<dyn ModelListener>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

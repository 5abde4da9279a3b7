//! Observer lists with explicit unsubscribe handles.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Returned by [`Listeners::subscribe`]; pass back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback<T> = Rc<dyn Fn(&T)>;

/// Callbacks invoked in subscription order.
pub struct Listeners<T: ?Sized> {
    next: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<T>)>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next.get();
        self.next.set(id + 1);
        self.entries.borrow_mut().push((id, Rc::new(callback)));
        Subscription(id)
    }

    /// Remove a callback. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(id, _)| *id != subscription.0);
        entries.len() != before
    }

    /// Invoke every callback registered at the time of the call.
    ///
    /// Callbacks may subscribe or unsubscribe while being notified; the
    /// change applies from the next emit.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

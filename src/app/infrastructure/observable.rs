//! Listener registry shared by the preference stores.
//!
//! Listeners are called synchronously, in registration order, on a snapshot
//! of the registry taken when `notify` starts. A listener may therefore
//! subscribe, unsubscribe or mutate the owning store while it runs; changes
//! to the registry take effect from the next notification.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

pub struct Listeners<T> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_id: Cell::new(1),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// `Subscription` is dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<Registry<T>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    // Drop the listener only after the borrow is released: its
                    // captures may own subscriptions to this same registry.
                    let removed = {
                        let mut entries = registry.entries.borrow_mut();
                        entries
                            .iter()
                            .position(|(entry, _)| *entry == id)
                            .map(|idx| entries.remove(idx))
                    };
                    drop(removed);
                }
            })),
        }
    }

    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .registry
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A boolean with change notification.
///
/// `flip` is a single non-suspending read-modify-write followed by a
/// synchronous notification round.
pub struct ObservableFlag {
    value: Cell<bool>,
    listeners: Listeners<bool>,
}

impl ObservableFlag {
    pub fn new(initial: bool) -> Self {
        Self {
            value: Cell::new(initial),
            listeners: Listeners::new(),
        }
    }

    pub fn get(&self) -> bool {
        self.value.get()
    }

    /// Invert the value, notify, and return the new value.
    pub fn flip(&self) -> bool {
        let next = !self.value.get();
        self.value.set(next);
        self.listeners.notify(&next);
        next
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.listeners.subscribe(move |value: &bool| listener(*value))
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Unsubscribe handle returned by `Listeners::subscribe`.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

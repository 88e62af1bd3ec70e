//! Shared view-model handles.
//!
//! Controllers never own their state; they reach it through a
//! [`StateHandle`], borrowing only for the duration of a closure so no borrow
//! is ever held across an `.await`. A handle that can no longer reach its
//! state (its view was torn down) answers `None`, and the controller drops
//! whatever response it was about to apply.

use std::cell::RefCell;
use std::rc::Rc;

pub trait StateHandle<T>: Clone {
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R>;
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

type Listener<T> = Rc<dyn Fn(&T)>;

/// Identifies a listener registered with [`SharedState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<T>)>,
}

/// Single-threaded store with read/write/subscribe. Listeners run after each
/// write with the state immutably borrowed: they may read it but must not
/// write back.
pub struct SharedState<T> {
    value: Rc<RefCell<T>>,
    listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T> Clone for SharedState<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T: 'static> SharedState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            listeners: Rc::new(RefCell::new(Listeners { next_id: 0, entries: Vec::new() })),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> SubscriptionId {
        let mut listeners = self.listeners.borrow_mut();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().entries.retain(|(other, _)| *other != id);
    }

    fn notify(&self) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        let value = self.value.borrow();
        for listener in listeners {
            listener(&value);
        }
    }
}

impl<T: Clone + 'static> SharedState<T> {
    pub fn snapshot(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: 'static> StateHandle<T> for SharedState<T> {
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        Some(f(&self.value.borrow()))
    }

    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let out = f(&mut self.value.borrow_mut());
        self.notify();
        Some(out)
    }
}

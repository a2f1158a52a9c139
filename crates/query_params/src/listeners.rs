//! Observer registry shared by navigation hosts and the parameter store.

use std::{cell::RefCell, fmt, rc::Rc};

/// Handle returned by a subscription; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback fired when the URL changes outside the store's own write path.
pub type NavigationListener = Rc<dyn Fn()>;

struct Slots<A> {
    next_id: u64,
    listeners: Vec<(ListenerId, Rc<dyn Fn(A)>)>,
}

/// Single-threaded list of callbacks notified in subscription order.
///
/// Clones share the same list. Notification iterates over a snapshot, so callbacks may add or
/// remove listeners while being notified.
pub struct ListenerRegistry<A = ()> {
    slots: Rc<RefCell<Slots<A>>>,
}

impl<A> Clone for ListenerRegistry<A> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<A> Default for ListenerRegistry<A> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<A> ListenerRegistry<A> {
    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.slots.borrow().listeners.len()
    }

    /// Returns whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A> fmt::Debug for ListenerRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<A: Clone> ListenerRegistry<A> {
    /// Adds a listener.
    pub fn add(&self, listener: Rc<dyn Fn(A)>) -> ListenerId {
        let mut slots = self.slots.borrow_mut();
        slots.next_id += 1;
        let id = ListenerId(slots.next_id);
        slots.listeners.push((id, listener));
        id
    }

    /// Removes a listener; returns whether it was registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.listeners.len();
        slots.listeners.retain(|(existing, _)| *existing != id);
        slots.listeners.len() != before
    }

    /// Calls every listener with `arg`.
    pub fn notify(&self, arg: A) {
        let snapshot: Vec<_> = self
            .slots
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(arg.clone());
        }
    }
}

impl ListenerRegistry<()> {
    /// Adds a navigation listener.
    pub fn add_navigation(&self, listener: NavigationListener) -> ListenerId {
        self.add(Rc::new(move |()| listener()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn notifies_in_order_and_stops_after_removal() {
        let registry = ListenerRegistry::<u64>::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = Rc::clone(&seen);
            registry.add(Rc::new(move |v: u64| seen.borrow_mut().push(("first", v))))
        };
        {
            let seen = Rc::clone(&seen);
            registry.add(Rc::new(move |v: u64| seen.borrow_mut().push(("second", v))));
        }

        registry.notify(1);
        assert!(registry.remove(first));
        assert!(!registry.remove(first));
        registry.notify(2);

        assert_eq!(
            *seen.borrow(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }

    #[test]
    fn listeners_may_unsubscribe_during_notification() {
        let registry = ListenerRegistry::<()>::default();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let id = {
            let registry = registry.clone();
            let calls = Rc::clone(&calls);
            let slot = Rc::clone(&slot);
            registry.clone().add_navigation(Rc::new(move || {
                calls.set(calls.get() + 1);
                if let Some(id) = slot.get() {
                    registry.remove(id);
                }
            }))
        };
        slot.set(Some(id));

        registry.notify(());
        registry.notify(());
        assert_eq!(calls.get(), 1);
        assert!(registry.is_empty());
    }
}

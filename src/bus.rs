//! Single-threaded broadcast channel with RAII subscriptions
//!
//! Replaces the page-global `handJump` DOM event. Subscribing returns a
//! [`Subscription`] handle; dropping the handle deregisters the listener, so
//! a scene that owns its handles cannot leak listeners across re-entries.
//!
//! Events are not buffered: emitting with no live listener drops the event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An open-hand gesture strong enough to trigger an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Open probability of the sample that fired the gesture
    pub open_probability: f32,
    /// Timestamp of that sample (ms, page clock)
    pub at_ms: f64,
}

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Listener<E> {
    id: u64,
    once: bool,
    callback: Callback<E>,
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<Listener<E>>,
}

impl<E> Registry<E> {
    fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }
}

/// Broadcast channel for events of type `E`
pub struct Bus<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

/// The gesture channel shared by the vision poller and the game director
pub type GestureBus = Bus<Gesture>;

impl<E> Clone for Bus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<E: 'static> Default for Bus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Bus<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 1,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener that fires on every event until the handle drops
    #[must_use = "dropping the subscription immediately deregisters the listener"]
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        self.register(false, Rc::new(RefCell::new(callback)))
    }

    /// Register a listener that fires at most once, then removes itself
    #[must_use = "dropping the subscription immediately deregisters the listener"]
    pub fn subscribe_once(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        self.register(true, Rc::new(RefCell::new(callback)))
    }

    fn register(&self, once: bool, callback: Callback<E>) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener { id, once, callback });

        let registry: Rc<RefCell<dyn Unsubscribe>> = self.registry.clone();
        Subscription {
            id,
            registry: Rc::downgrade(&registry),
        }
    }

    /// Deliver `event` to every live listener in registration order.
    ///
    /// Listeners may subscribe or drop subscriptions while handling the event;
    /// a listener removed mid-delivery is not called. Returns how many
    /// listeners received the event.
    pub fn emit(&self, event: &E) -> usize {
        let ids: Vec<u64> = self.registry.borrow().listeners.iter().map(|l| l.id).collect();

        let mut delivered = 0;
        for id in ids {
            let callback = {
                let mut registry = self.registry.borrow_mut();
                let Some(pos) = registry.listeners.iter().position(|l| l.id == id) else {
                    continue;
                };
                if registry.listeners[pos].once {
                    registry.listeners.remove(pos).callback
                } else {
                    registry.listeners[pos].callback.clone()
                }
            };
            (&mut *callback.borrow_mut())(event);
            delivered += 1;
        }
        delivered
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

trait Unsubscribe {
    fn contains(&self, id: u64) -> bool;
    fn unsubscribe(&mut self, id: u64) -> bool;
}

impl<E> Unsubscribe for Registry<E> {
    fn contains(&self, id: u64) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    fn unsubscribe(&mut self, id: u64) -> bool {
        self.remove(id)
    }
}

/// Handle for a registered listener; dropping it deregisters the listener
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<dyn Unsubscribe>>,
}

impl Subscription {
    /// Whether the listener is still registered (a fired once-listener is not)
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn gesture() -> Gesture {
        Gesture {
            open_probability: 0.99,
            at_ms: 0.0,
        }
    }

    #[test]
    fn test_emit_reaches_all_listeners_in_order() {
        let bus = GestureBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = order.clone();
        let _a = bus.subscribe(move |_| o1.borrow_mut().push(1));
        let o2 = order.clone();
        let _b = bus.subscribe(move |_| o2.borrow_mut().push(2));

        assert_eq!(bus.emit(&gesture()), 2);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_dropping_subscription_stops_delivery() {
        let bus = GestureBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = bus.subscribe(move |_| h.set(h.get() + 1));

        bus.emit(&gesture());
        drop(sub);
        bus.emit(&gesture());

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_once_listener_fires_once() {
        let bus = GestureBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = bus.subscribe_once(move |_| h.set(h.get() + 1));
        assert!(sub.is_active());

        bus.emit(&gesture());
        bus.emit(&gesture());

        assert_eq!(hits.get(), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_event_without_listeners_is_dropped() {
        let bus = GestureBus::new();
        assert_eq!(bus.emit(&gesture()), 0);

        // A listener registered afterwards never sees the earlier event
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = bus.subscribe(move |_| h.set(h.get() + 1));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_listener_can_drop_a_later_listener_mid_emit() {
        let bus = GestureBus::new();
        let later_hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let s = slot.clone();
        let _first = bus.subscribe(move |_| {
            s.borrow_mut().take();
        });
        let h = later_hits.clone();
        *slot.borrow_mut() = Some(bus.subscribe(move |_| h.set(h.get() + 1)));

        assert_eq!(bus.emit(&gesture()), 1);
        assert_eq!(later_hits.get(), 0);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = GestureBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        assert!(!sub.is_active());
        drop(sub);
    }
}

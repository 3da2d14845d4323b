//! Broadcast signals
//!
//! A [`Broadcast`] holds one value and an arena of subscriber callbacks keyed
//! by [`SubscriptionId`]. Setting a different value notifies every live
//! subscriber exactly once; setting an equal value notifies nobody.
//!
//! Subscribing returns a [`Subscription`] guard. Calling
//! [`Subscription::unsubscribe`] (or dropping the guard) removes the callback.
//! Unsubscribing twice, or after the broadcast itself is gone, is a no-op.
//!
//! Signals are single-threaded (`Rc`/`RefCell`). Callbacks run after the
//! internal borrow is released, so a callback may read the signal, subscribe,
//! or unsubscribe without panicking.

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a registered subscriber
    pub struct SubscriptionId;
}

type Callback<T> = Rc<dyn Fn(&T)>;

struct BroadcastInner<T> {
    value: T,
    subscribers: SlotMap<SubscriptionId, Callback<T>>,
}

/// A read-mostly value with change notification
pub struct Broadcast<T> {
    inner: Rc<RefCell<BroadcastInner<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BroadcastInner {
                value,
                subscribers: SlotMap::with_key(),
            })),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value
    ///
    /// Returns `true` (and notifies subscribers) only if the value changed.
    pub fn set(&self, value: T) -> bool {
        let callbacks: Vec<(SubscriptionId, Callback<T>)> = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value.clone();
            inner
                .subscribers
                .iter()
                .map(|(id, cb)| (id, Rc::clone(cb)))
                .collect()
        };

        for (id, callback) in callbacks {
            // An earlier callback may have removed this subscriber
            if !self.inner.borrow().subscribers.contains_key(id) {
                continue;
            }
            callback(&value);
        }
        true
    }

    /// Register a change callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self
            .inner
            .borrow_mut()
            .subscribers
            .insert(Rc::new(callback));

        let weak: Weak<RefCell<BroadcastInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            release: Cell::new(Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.remove(id);
                }
            }))),
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// Guard for a broadcast subscription
///
/// Dropping the guard unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    release: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the callback. Idempotent.
    pub fn unsubscribe(&self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_active(&self) -> bool {
        let release = self.release.take();
        let active = release.is_some();
        self.release.set(release);
        active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifies_once_per_change() {
        let signal = Broadcast::new(false);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = signal.subscribe(move |_| c.set(c.get() + 1));

        assert!(signal.set(true));
        assert!(!signal.set(true));
        assert!(signal.set(false));

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let signal = Broadcast::new(0);
        let sub = signal.subscribe(|_| {});
        assert_eq!(signal.subscriber_count(), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(signal.subscriber_count(), 0);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let signal = Broadcast::new(0);
        {
            let _sub = signal.subscribe(|_| {});
            assert_eq!(signal.subscriber_count(), 1);
        }
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_after_signal_dropped() {
        let sub = {
            let signal = Broadcast::new(0);
            signal.subscribe(|_| {})
        };
        sub.unsubscribe();
    }

    #[test]
    fn test_callback_can_read_signal() {
        let signal = Broadcast::new(1);
        let seen = Rc::new(Cell::new(0));
        let s = signal.clone();
        let seen_in = Rc::clone(&seen);
        let _sub = signal.subscribe(move |_| seen_in.set(s.get()));

        signal.set(7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn test_callback_removed_mid_notify_is_skipped() {
        let signal = Broadcast::new(0);
        let second_calls = Rc::new(Cell::new(0));

        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let v = Rc::clone(&victim);
        let _first = signal.subscribe(move |_| {
            if let Some(sub) = v.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let c = Rc::clone(&second_calls);
        *victim.borrow_mut() = Some(signal.subscribe(move |_| c.set(c.get() + 1)));

        signal.set(1);
        assert_eq!(second_calls.get(), 0);
    }
}

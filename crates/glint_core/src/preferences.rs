//! Platform accessibility preferences
//!
//! The reduced-motion flag is process-wide. It is read from the platform the
//! first time anyone asks for it, then kept current by the host forwarding
//! preference-change events through [`ReducedMotion::platform_changed`].

use crate::signal::{Broadcast, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// Where the initial reduced-motion preference comes from
pub trait PreferenceSource {
    fn prefers_reduced_motion(&self) -> bool;
}

/// A fixed preference, for hosts without a platform query and for tests
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPreference(pub bool);

impl PreferenceSource for StaticPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

impl<F> PreferenceSource for F
where
    F: Fn() -> bool,
{
    fn prefers_reduced_motion(&self) -> bool {
        self()
    }
}

struct ReducedMotionInner {
    signal: Broadcast<bool>,
    /// Taken on first read
    source: RefCell<Option<Box<dyn PreferenceSource>>>,
}

/// Process-wide "prefers reduced motion" signal
#[derive(Clone)]
pub struct ReducedMotion {
    inner: Rc<ReducedMotionInner>,
}

impl ReducedMotion {
    pub fn new(source: impl PreferenceSource + 'static) -> Self {
        Self {
            inner: Rc::new(ReducedMotionInner {
                signal: Broadcast::new(false),
                source: RefCell::new(Some(Box::new(source))),
            }),
        }
    }

    fn ensure_initialized(&self) {
        let source = self.inner.source.borrow_mut().take();
        if let Some(source) = source {
            let value = source.prefers_reduced_motion();
            tracing::debug!("ReducedMotion: initial platform preference = {}", value);
            // Nobody can be subscribed before the first read
            self.inner.signal.set(value);
        }
    }

    /// Current value of the global flag
    pub fn current(&self) -> bool {
        self.ensure_initialized();
        self.inner.signal.get()
    }

    /// Forward a platform preference-change event
    ///
    /// Subscribers hear about it only if the value actually changed.
    pub fn platform_changed(&self, reduced: bool) {
        self.ensure_initialized();
        if self.inner.signal.set(reduced) {
            tracing::debug!("ReducedMotion: preference changed to {}", reduced);
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.ensure_initialized();
        self.inner.signal.subscribe(move |value| callback(*value))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.signal.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_initialized_lazily_from_source() {
        let reads = Rc::new(Cell::new(0));
        let r = Rc::clone(&reads);
        let reduced = ReducedMotion::new(move || {
            r.set(r.get() + 1);
            true
        });

        assert_eq!(reads.get(), 0);
        assert!(reduced.current());
        assert!(reduced.current());
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_exactly_one_notification_per_change() {
        let reduced = ReducedMotion::new(StaticPreference(false));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = reduced.subscribe(move |v| s.borrow_mut().push(v));

        reduced.platform_changed(false);
        reduced.platform_changed(true);
        reduced.platform_changed(true);
        reduced.platform_changed(false);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_initial_read_does_not_notify() {
        let reduced = ReducedMotion::new(StaticPreference(true));
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let _sub = reduced.subscribe(move |_| c.set(c.get() + 1));

        assert!(reduced.current());
        assert_eq!(calls.get(), 0);
    }
}

//! Viewport observer
//!
//! Tracks one [`VisibilityState`] per observed element. The host feeds
//! intersection-ratio samples in; listeners hear about state transitions.
//!
//! Every observation is held by an [`Observation`] guard. Dropping the guard
//! (or calling [`Observation::release`]) removes the registration, so an
//! unmounted element can never be called back.

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to an observed element
    pub struct ObservationId;
}

/// Visibility of one observed element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisibilityState {
    #[default]
    NotYetSeen,
    Visible,
    /// Was visible, then dropped below the threshold (repeat mode only)
    Exited,
}

impl VisibilityState {
    /// Next state after a sample; pure so it can be tested on its own
    pub fn advance(self, ratio: f32, threshold: f32, once: bool) -> VisibilityState {
        // Threshold 0 means "any overlap at all"
        let visible = if threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= threshold
        };
        match self {
            VisibilityState::NotYetSeen | VisibilityState::Exited if visible => {
                VisibilityState::Visible
            }
            VisibilityState::Visible if !visible && !once => VisibilityState::Exited,
            state => state,
        }
    }
}

type Listener = Rc<dyn Fn(VisibilityState)>;

struct ObservationEntry {
    threshold: f32,
    once: bool,
    state: VisibilityState,
    listener: Listener,
}

#[derive(Default)]
struct ObserverInner {
    observations: SlotMap<ObservationId, ObservationEntry>,
}

/// Registry of observed elements
#[derive(Clone, Default)]
pub struct ViewportObserver {
    inner: Rc<RefCell<ObserverInner>>,
}

impl ViewportObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing an element
    ///
    /// `on_change` runs after every state transition, never for samples that
    /// leave the state unchanged.
    pub fn observe<F>(&self, threshold: f32, once: bool, on_change: F) -> Observation
    where
        F: Fn(VisibilityState) + 'static,
    {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let id = self.inner.borrow_mut().observations.insert(ObservationEntry {
            threshold,
            once,
            state: VisibilityState::NotYetSeen,
            listener: Rc::new(on_change),
        });
        tracing::debug!(
            "ViewportObserver: observing {:?} (threshold {}, once {})",
            id,
            threshold,
            once
        );

        Observation {
            id,
            observer: Rc::downgrade(&self.inner),
            released: Cell::new(false),
        }
    }

    /// Feed an intersection-ratio sample
    ///
    /// Returns the new state if the sample caused a transition. Samples for
    /// released observations and non-finite ratios are ignored.
    pub fn sample(&self, id: ObservationId, ratio: f32) -> Option<VisibilityState> {
        if !ratio.is_finite() {
            return None;
        }
        let (state, listener) = {
            let mut inner = self.inner.borrow_mut();
            let entry = inner.observations.get_mut(id)?;
            let next = entry.state.advance(ratio, entry.threshold, entry.once);
            if next == entry.state {
                return None;
            }
            tracing::debug!(
                "ViewportObserver: {:?} {:?} -> {:?} (ratio {:.2})",
                id,
                entry.state,
                next,
                ratio
            );
            entry.state = next;
            (next, Rc::clone(&entry.listener))
        };

        // Listener may release or add observations
        listener(state);
        Some(state)
    }

    pub fn state(&self, id: ObservationId) -> Option<VisibilityState> {
        self.inner
            .borrow()
            .observations
            .get(id)
            .map(|entry| entry.state)
    }

    pub fn is_observing(&self, id: ObservationId) -> bool {
        self.inner.borrow().observations.contains_key(id)
    }

    /// Ids of every live observation
    pub fn ids(&self) -> Vec<ObservationId> {
        self.inner.borrow().observations.keys().collect()
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().observations.len()
    }
}

/// Guard for one registration in a [`ViewportObserver`]
pub struct Observation {
    id: ObservationId,
    observer: Weak<RefCell<ObserverInner>>,
    released: Cell<bool>,
}

impl Observation {
    pub fn id(&self) -> ObservationId {
        self.id
    }

    pub fn state(&self) -> VisibilityState {
        self.observer
            .upgrade()
            .and_then(|inner| inner.borrow().observations.get(self.id).map(|e| e.state))
            .unwrap_or_default()
    }

    /// Stop observing. Idempotent.
    pub fn release(&self) {
        if self.released.replace(true) {
            return;
        }
        if let Some(inner) = self.observer.upgrade() {
            // Dropping the listener may drop effect state; do it outside the borrow
            let removed = inner.borrow_mut().observations.remove(self.id);
            drop(removed);
            tracing::debug!("ViewportObserver: released {:?}", self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.released.get()
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

//! Motion engine and context
//!
//! [`MotionEngine`] is what a host owns: the frame scheduler, the two
//! process-wide signals (reduced motion, scroll), the viewport observer and
//! a registry of mounted effects. Effects are mounted against a
//! [`MotionContext`], a cheap clone of the engine's shared parts.
//!
//! # Example
//!
//! ```rust
//! use glint_core::{Rect, ScrollSnapshot, Size, StaticPreference};
//! use glint_motion::{EffectConfig, MotionEffect, MotionEngine};
//!
//! let engine = MotionEngine::new(StaticPreference(false));
//! engine.set_scroll(ScrollSnapshot::new(0.0, 0.0, Size::new(800.0, 600.0)));
//!
//! let fade = MotionEffect::fade_in(&engine.context(), EffectConfig::new().duration(0.3));
//! let id = fade.observation_id().unwrap();
//!
//! engine.report_bounds(id, Rect::new(0.0, 100.0, 400.0, 200.0));
//! engine.tick(16.0);
//! engine.tick(400.0);
//! assert_eq!(fade.style().opacity(), Some(1.0));
//! ```

use crate::observer::{ObservationId, ViewportObserver, VisibilityState};
use glint_animation::{FrameScheduler, SchedulerHandle};
use glint_core::{PreferenceSource, Rect, ReducedMotion, ScrollSignal, ScrollSnapshot};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a mounted effect in the engine registry
    pub struct EffectId;
}

/// Page-level imperative control over a mounted effect
pub trait EffectControl {
    /// Freeze at the current style and drop pending frames
    fn cancel(&self);

    /// Jump to the settled final style and drop pending frames
    fn force_final_state(&self);
}

struct MotionShared {
    scheduler: SchedulerHandle,
    reduced_motion: ReducedMotion,
    scroll: ScrollSignal,
    observer: ViewportObserver,
    effects: RefCell<SlotMap<EffectId, Weak<dyn EffectControl>>>,
}

/// Shared handles effects are mounted against
#[derive(Clone)]
pub struct MotionContext {
    shared: Rc<MotionShared>,
}

impl MotionContext {
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.shared.scheduler
    }

    /// Current frame time in milliseconds
    pub fn now(&self) -> f64 {
        self.shared.scheduler.now()
    }

    pub fn reduced_motion(&self) -> &ReducedMotion {
        &self.shared.reduced_motion
    }

    pub fn scroll(&self) -> &ScrollSignal {
        &self.shared.scroll
    }

    pub fn observer(&self) -> &ViewportObserver {
        &self.shared.observer
    }

    /// Effective reduced-motion flag for an instance with an optional override
    pub fn resolve_reduced_motion(&self, instance_override: Option<bool>) -> bool {
        instance_override.unwrap_or_else(|| self.shared.reduced_motion.current())
    }

    pub(crate) fn register_effect(&self, effect: Weak<dyn EffectControl>) -> EffectId {
        self.shared.effects.borrow_mut().insert(effect)
    }

    pub(crate) fn unregister_effect(&self, id: EffectId) {
        self.shared.effects.borrow_mut().remove(id);
    }

    fn live_effects(&self) -> Vec<Rc<dyn EffectControl>> {
        self.shared
            .effects
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    }

    fn registered_effects(&self) -> usize {
        self.shared.effects.borrow().len()
    }
}

/// Owner of the scheduler and every shared signal
pub struct MotionEngine {
    scheduler: FrameScheduler,
    context: MotionContext,
}

impl MotionEngine {
    /// Create an engine whose reduced-motion flag is read lazily from `preferences`
    pub fn new(preferences: impl PreferenceSource + 'static) -> Self {
        let scheduler = FrameScheduler::new();
        let context = MotionContext {
            shared: Rc::new(MotionShared {
                scheduler: scheduler.handle(),
                reduced_motion: ReducedMotion::new(preferences),
                scroll: ScrollSignal::new(ScrollSnapshot::default()),
                observer: ViewportObserver::new(),
                effects: RefCell::new(SlotMap::with_key()),
            }),
        };
        tracing::debug!("MotionEngine: created");
        Self { scheduler, context }
    }

    pub fn context(&self) -> MotionContext {
        self.context.clone()
    }

    /// Run one display frame at host time `now_ms`
    pub fn tick(&self, now_ms: f64) -> usize {
        self.scheduler.tick(now_ms)
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Publish a scroll/resize sample to every subscriber
    pub fn set_scroll(&self, snapshot: ScrollSnapshot) -> bool {
        self.context.scroll().update(snapshot)
    }

    pub fn scroll(&self) -> ScrollSnapshot {
        self.context.scroll().current()
    }

    /// Forward a platform reduced-motion preference change
    pub fn set_reduced_motion(&self, reduced: bool) {
        self.context.reduced_motion().platform_changed(reduced);
    }

    pub fn reduced_motion(&self) -> bool {
        self.context.reduced_motion().current()
    }

    /// Feed an intersection ratio for one observed element
    pub fn report_intersection(&self, id: ObservationId, ratio: f32) -> Option<VisibilityState> {
        self.context.observer().sample(id, ratio)
    }

    /// Feed an element's document-space bounds
    ///
    /// The ratio is computed against the current scroll snapshot. Bounds that
    /// cannot be measured leave the element in its current state.
    pub fn report_bounds(&self, id: ObservationId, bounds: Rect) -> Option<VisibilityState> {
        let viewport = self.scroll().viewport_rect();
        match bounds.visible_ratio(&viewport) {
            Ok(ratio) => self.report_intersection(id, ratio),
            Err(err) => {
                tracing::debug!("MotionEngine: skipping sample for {:?}: {}", id, err);
                None
            }
        }
    }

    /// Freeze every mounted effect
    pub fn cancel_all(&self) {
        let effects = self.context.live_effects();
        tracing::debug!("MotionEngine: cancelling {} effect(s)", effects.len());
        for effect in effects {
            effect.cancel();
        }
    }

    /// Settle every mounted effect at its final style (e.g. before printing)
    pub fn force_final_state_all(&self) {
        let effects = self.context.live_effects();
        tracing::debug!("MotionEngine: forcing {} effect(s) to final state", effects.len());
        for effect in effects {
            effect.force_final_state();
        }
    }

    // Diagnostics

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn active_observations(&self) -> usize {
        self.context.observer().active_count()
    }

    pub fn registered_effects(&self) -> usize {
        self.context.registered_effects()
    }

    pub fn scroll_subscribers(&self) -> usize {
        self.context.scroll().subscriber_count()
    }

    pub fn reduced_motion_subscribers(&self) -> usize {
        self.context.reduced_motion().subscriber_count()
    }
}

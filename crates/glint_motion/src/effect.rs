//! Trigger-driven effects: fade-in, reveal and blur
//!
//! A [`MotionEffect`] combines one [`EffectVariant`] policy with one
//! [`Trigger`]:
//!
//! - `Scroll`: observed by the viewport observer; plays when visible and,
//!   in repeat mode, reverses when it exits
//! - `Hover`: plays on pointer enter, reverses on pointer leave
//! - `Always`: plays once on mount
//!
//! Frames are only requested while a transition is running.

use crate::config::{EffectConfig, Trigger};
use crate::context::MotionContext;
use crate::interaction::PointerEvent;
use crate::lifecycle::{with_state, EffectState, Mounted};
use crate::observer::{Observation, ObservationId, VisibilityState};
use crate::resolver::{EffectVariant, DEFAULT_BLUR};
use glint_animation::{
    FrameLoop, LoopControl, SchedulerHandle, StylePair, Transition,
};
use glint_core::StyleSnapshot;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct EffectInner {
    this: Weak<RefCell<EffectInner>>,
    scheduler: SchedulerHandle,
    variant: EffectVariant,
    trigger: Trigger,
    reduced: bool,
    transition: Transition,
    visibility: VisibilityState,
    hovered: bool,
    observation: Option<Observation>,
    frame_loop: Option<FrameLoop>,
}

impl EffectInner {
    /// True when the trigger currently asks for the `to` style
    fn trigger_met(&self) -> bool {
        match self.trigger {
            Trigger::Scroll => self.visibility == VisibilityState::Visible,
            Trigger::Hover => self.hovered,
            Trigger::Always => true,
        }
    }

    fn animate(&mut self, forward: bool) {
        if self.reduced {
            self.transition.force_to();
            return;
        }
        let now = self.scheduler.now();
        if forward {
            self.transition.play(now);
        } else {
            self.transition.reverse(now);
        }
        self.ensure_frames();
    }

    fn ensure_frames(&mut self) {
        if !self.transition.is_active() {
            return;
        }
        if self.frame_loop.as_ref().is_some_and(FrameLoop::is_running) {
            return;
        }
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut EffectInner| {
                state.transition.sample(frame.now_ms);
                if state.transition.is_active() {
                    LoopControl::Continue
                } else {
                    LoopControl::Stop
                }
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn on_visibility(&mut self, visibility: VisibilityState) {
        self.visibility = visibility;
        match visibility {
            VisibilityState::Visible => self.animate(true),
            VisibilityState::Exited => self.animate(false),
            VisibilityState::NotYetSeen => {}
        }
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        if self.trigger != Trigger::Hover {
            return;
        }
        match event {
            PointerEvent::Enter if !self.hovered => {
                self.hovered = true;
                self.animate(true);
            }
            PointerEvent::Leave if self.hovered => {
                self.hovered = false;
                self.animate(false);
            }
            _ => {}
        }
    }
}

impl EffectState for EffectInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("MotionEffect: reduced motion -> {}", reduced);
        self.reduced = reduced;
        self.frame_loop = None;
        self.transition
            .reset_pair(self.variant.resolve(self.trigger, reduced));
        if reduced || self.trigger_met() {
            self.transition.force_to();
        } else {
            self.transition.force_from();
        }
    }

    fn cancel(&mut self) {
        self.frame_loop = None;
        self.transition.cancel();
    }

    fn force_final_state(&mut self) {
        self.frame_loop = None;
        self.transition.force_to();
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
        self.observation = None;
    }
}

/// A fade-in, reveal or blur wrapper around one element
pub struct MotionEffect {
    inner: Mounted<EffectInner>,
}

impl MotionEffect {
    /// Mount an effect with an explicit variant
    pub fn new(context: &MotionContext, variant: EffectVariant, config: EffectConfig) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let trigger = config.trigger;

        let once = if variant.forces_once(trigger) {
            if !config.once {
                tracing::debug!("MotionEffect: scroll-triggered blur ignores once = false");
            }
            true
        } else {
            config.once
        };

        let state = Rc::new_cyclic(|this: &Weak<RefCell<EffectInner>>| {
            let observation = (trigger == Trigger::Scroll).then(|| {
                let weak = this.clone();
                context
                    .observer()
                    .observe(config.threshold, once, move |visibility| {
                        with_state(&weak, |state: &mut EffectInner| {
                            state.on_visibility(visibility)
                        });
                    })
            });

            RefCell::new(EffectInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                variant,
                trigger,
                reduced,
                transition: Transition::new(
                    variant.resolve(trigger, reduced),
                    config.transition_spec(),
                ),
                visibility: VisibilityState::NotYetSeen,
                hovered: false,
                observation,
                frame_loop: None,
            })
        });

        tracing::debug!(
            "MotionEffect: mounted {:?} ({:?}, once {}, reduced {})",
            variant,
            trigger,
            once,
            reduced
        );

        if trigger == Trigger::Always {
            state.borrow_mut().animate(true);
        }

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    /// Opacity plus a translation along `config.direction`
    pub fn fade_in(context: &MotionContext, config: EffectConfig) -> Self {
        Self::new(context, EffectVariant::fade(&config), config)
    }

    /// One of the five reveal styles, chosen by `config.reveal_style`
    pub fn reveal(context: &MotionContext, config: EffectConfig) -> Self {
        Self::new(context, EffectVariant::reveal(&config), config)
    }

    pub fn blur(context: &MotionContext, config: EffectConfig) -> Self {
        Self::new(context, EffectVariant::blur(DEFAULT_BLUR), config)
    }

    /// Style to paint this frame
    pub fn style(&self) -> StyleSnapshot {
        self.inner.borrow().transition.current().clone()
    }

    pub fn style_pair(&self) -> StylePair {
        self.inner.borrow().transition.pair().clone()
    }

    pub fn variant(&self) -> EffectVariant {
        self.inner.borrow().variant
    }

    pub fn visibility(&self) -> VisibilityState {
        self.inner.borrow().visibility
    }

    /// Id to report intersections against (scroll trigger only)
    pub fn observation_id(&self) -> Option<ObservationId> {
        self.inner
            .borrow()
            .observation
            .as_ref()
            .map(Observation::id)
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().transition.is_active()
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.inner.borrow().reduced
    }

    /// Forward a pointer event (hover trigger only)
    pub fn pointer(&self, event: PointerEvent) {
        self.inner.borrow_mut().on_pointer(event);
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn force_final_state(&self) {
        self.inner.force_final_state();
    }

    /// Tear down now; dropping the effect does the same
    pub fn unmount(self) {
        drop(self);
    }
}

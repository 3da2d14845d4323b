//! Pulsing badge
//!
//! The one effect that loops on purpose: scale and opacity breathe with a
//! fixed period for as long as the badge is mounted. Reduced motion paints
//! the resting style and schedules nothing.

use crate::config::EffectConfig;
use crate::context::MotionContext;
use crate::lifecycle::{with_state, EffectState, Mounted};
use glint_animation::{FrameLoop, LoopControl, SchedulerHandle};
use glint_core::{StyleProperty, StyleSnapshot};
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

/// Extra scale at the peak of a pulse
pub const PULSE_SCALE_AMPLITUDE: f32 = 0.05;

/// Opacity lost at the peak of a pulse
pub const PULSE_OPACITY_DIP: f32 = 0.3;

/// Period used when the configured duration is zero
pub const DEFAULT_PULSE_PERIOD_MS: f64 = 2000.0;

/// Style at `phase` (0.0 to 1.0) of one pulse
pub fn pulse_style(phase: f64) -> StyleSnapshot {
    // 0 at rest, 1 at the peak, smooth at both ends
    let intensity = ((1.0 - (TAU * phase).cos()) / 2.0) as f32;
    StyleSnapshot::new()
        .with(StyleProperty::Opacity, 1.0 - PULSE_OPACITY_DIP * intensity)
        .with(StyleProperty::Scale, 1.0 + PULSE_SCALE_AMPLITUDE * intensity)
}

struct PulseInner {
    this: Weak<RefCell<PulseInner>>,
    scheduler: SchedulerHandle,
    period_ms: f64,
    delay_ms: f64,
    reduced: bool,
    started_at: f64,
    style: StyleSnapshot,
    frame_loop: Option<FrameLoop>,
}

impl PulseInner {
    fn start(&mut self) {
        self.style = pulse_style(0.0);
        if self.reduced {
            return;
        }
        self.started_at = self.scheduler.now() + self.delay_ms;
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut PulseInner| {
                let elapsed = frame.now_ms - state.started_at;
                if elapsed > 0.0 {
                    let phase = (elapsed % state.period_ms) / state.period_ms;
                    state.style = pulse_style(phase);
                }
                LoopControl::Continue
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn stop(&mut self) {
        self.frame_loop = None;
    }
}

impl EffectState for PulseInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("Pulse: reduced motion -> {}", reduced);
        self.reduced = reduced;
        self.stop();
        self.start();
    }

    fn cancel(&mut self) {
        self.stop();
    }

    fn force_final_state(&mut self) {
        self.stop();
        self.style = pulse_style(0.0);
    }

    fn teardown(&mut self) {
        self.stop();
    }
}

/// A badge that pulses until unmounted
pub struct Pulse {
    inner: Mounted<PulseInner>,
}

impl Pulse {
    /// `config.duration` is the period of one pulse, `config.delay` the wait before the first
    pub fn new(context: &MotionContext, config: EffectConfig) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let period_ms = if config.duration_ms() > 0.0 {
            config.duration_ms()
        } else {
            DEFAULT_PULSE_PERIOD_MS
        };

        let state = Rc::new_cyclic(|this| {
            RefCell::new(PulseInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                period_ms,
                delay_ms: config.delay_ms(),
                reduced,
                started_at: 0.0,
                style: pulse_style(0.0),
                frame_loop: None,
            })
        });
        state.borrow_mut().start();
        tracing::debug!("Pulse: mounted ({:.0}ms period, reduced {})", period_ms, reduced);

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    pub fn style(&self) -> StyleSnapshot {
        self.inner.borrow().style.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .borrow()
            .frame_loop
            .as_ref()
            .is_some_and(FrameLoop::is_running)
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn force_final_state(&self) {
        self.inner.force_final_state();
    }

    pub fn unmount(self) {
        drop(self);
    }
}

//! Animated numeric counters
//!
//! A [`Counter`] counts from zero to its target with a cubic ease-out the
//! first time its element becomes visible. The last frame pins the display
//! value to the target exactly and requests no further frames.

use crate::config::{EffectConfig, Trigger};
use crate::context::MotionContext;
use crate::lifecycle::{with_state, EffectState, Mounted};
use crate::observer::{Observation, ObservationId, VisibilityState};
use glint_animation::{FrameLoop, LoopControl, SchedulerHandle};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// How a counter's value is rendered as text
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterFormat {
    pub decimals: usize,
    pub prefix: String,
    pub suffix: String,
    /// Thousands separator
    pub separator: Option<char>,
}

impl CounterFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn format(&self, value: f64) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let fixed = format!("{:.*}", self.decimals, value.abs());
        let (integer, fraction) = match fixed.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::with_capacity(fixed.len() + self.prefix.len() + self.suffix.len() + 4);
        // "-0" is not a number anyone wants to see
        if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }
        out.push_str(&self.prefix);
        match self.separator {
            Some(separator) => {
                for (i, digit) in integer.chars().enumerate() {
                    if i > 0 && (integer.len() - i) % 3 == 0 {
                        out.push(separator);
                    }
                    out.push(digit);
                }
            }
            None => out.push_str(integer),
        }
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Eased counter value at `elapsed_ms` into a run of `duration_ms`
///
/// Returns `target` exactly once the run is complete.
pub fn counter_value(target: f64, elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return target;
    }
    let progress = (elapsed_ms / duration_ms).clamp(0.0, 1.0);
    if progress >= 1.0 {
        return target;
    }
    let eased = 1.0 - (1.0 - progress).powi(3);
    eased * target
}

#[derive(Clone, Copy, Debug)]
struct CounterRun {
    started_at: f64,
}

struct CounterInner {
    this: Weak<RefCell<CounterInner>>,
    scheduler: SchedulerHandle,
    target: f64,
    duration_ms: f64,
    reduced: bool,
    display: f64,
    /// One-shot: set when the counter first starts
    started: bool,
    run: Option<CounterRun>,
    observation: Option<Observation>,
    frame_loop: Option<FrameLoop>,
}

impl CounterInner {
    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        // Visibility is the only trigger a counter needs from here on
        self.observation = None;

        if self.reduced || self.duration_ms <= 0.0 {
            self.display = self.target;
            return;
        }

        let started_at = self.scheduler.now();
        self.run = Some(CounterRun { started_at });
        tracing::debug!(
            "Counter: counting to {} over {:.0}ms from {:.1}ms",
            self.target,
            self.duration_ms,
            started_at
        );

        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut CounterInner| state.step(frame.now_ms))
                .unwrap_or(LoopControl::Stop)
        }));
    }

    fn step(&mut self, now_ms: f64) -> LoopControl {
        let Some(run) = self.run else {
            return LoopControl::Stop;
        };
        self.display = counter_value(self.target, now_ms - run.started_at, self.duration_ms);
        if now_ms - run.started_at >= self.duration_ms {
            self.display = self.target;
            self.run = None;
            tracing::trace!("Counter: reached {}", self.target);
            LoopControl::Stop
        } else {
            LoopControl::Continue
        }
    }
}

impl EffectState for CounterInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("Counter: reduced motion -> {}", reduced);
        self.reduced = reduced;
        if reduced {
            self.frame_loop = None;
            self.run = None;
            self.display = self.target;
        } else if !self.started {
            self.display = 0.0;
        }
    }

    fn cancel(&mut self) {
        self.frame_loop = None;
        self.run = None;
    }

    fn force_final_state(&mut self) {
        self.frame_loop = None;
        self.run = None;
        self.started = true;
        self.observation = None;
        self.display = self.target;
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
        self.observation = None;
    }
}

/// A number that counts up when it first scrolls into view
pub struct Counter {
    inner: Mounted<CounterInner>,
    format: CounterFormat,
}

impl Counter {
    /// Count to `target` over `config.duration` seconds
    ///
    /// Scroll triggers start on first visibility; `Always` starts on mount.
    /// Counters are one-shot whatever `config.once` says.
    pub fn new(context: &MotionContext, target: f64, config: EffectConfig) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let target = if target.is_finite() { target } else { 0.0 };

        let state = Rc::new_cyclic(|this: &Weak<RefCell<CounterInner>>| {
            let observation = (config.trigger == Trigger::Scroll).then(|| {
                let weak = this.clone();
                context
                    .observer()
                    .observe(config.threshold, true, move |visibility| {
                        if visibility == VisibilityState::Visible {
                            with_state(&weak, |state: &mut CounterInner| state.start());
                        }
                    })
            });

            RefCell::new(CounterInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                target,
                duration_ms: config.duration_ms(),
                reduced,
                display: 0.0,
                started: false,
                run: None,
                observation,
                frame_loop: None,
            })
        });

        {
            let mut inner = state.borrow_mut();
            if reduced {
                // Nothing to count: show the result straight away
                inner.display = target;
            }
            if config.trigger != Trigger::Scroll {
                inner.start();
            }
        }

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
            format: CounterFormat::default(),
        }
    }

    pub fn with_format(mut self, format: CounterFormat) -> Self {
        self.format = format;
        self
    }

    /// Current value, exact at the target once finished
    pub fn display_value(&self) -> f64 {
        self.inner.borrow().display
    }

    pub fn formatted(&self) -> String {
        self.format.format(self.display_value())
    }

    pub fn target(&self) -> f64 {
        self.inner.borrow().target
    }

    pub fn has_started(&self) -> bool {
        self.inner.borrow().started
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().run.is_some()
    }

    pub fn observation_id(&self) -> Option<ObservationId> {
        self.inner
            .borrow()
            .observation
            .as_ref()
            .map(Observation::id)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MotionEngine;
    use glint_core::StaticPreference;

    #[test]
    fn test_counter_value_curve() {
        assert_eq!(counter_value(1000.0, 0.0, 2000.0), 0.0);
        assert!((counter_value(1000.0, 1000.0, 2000.0) - 875.0).abs() < 1e-9);
        assert_eq!(counter_value(1000.0, 2000.0, 2000.0), 1000.0);
        assert_eq!(counter_value(1000.0, 5000.0, 2000.0), 1000.0);
        assert_eq!(counter_value(42.0, 10.0, 0.0), 42.0);
    }

    #[test]
    fn test_format() {
        let format = CounterFormat::new().prefix("$").suffix("+").separator(',');
        assert_eq!(format.format(1000.0), "$1,000+");
        assert_eq!(format.format(999.4), "$999+");
        assert_eq!(format.format(1234567.0), "$1,234,567+");

        let decimals = CounterFormat::new().decimals(1).suffix("%");
        assert_eq!(decimals.format(99.96), "100.0%");
        assert_eq!(decimals.format(12.34), "12.3%");
        assert_eq!(CounterFormat::new().format(-0.2), "0");
        assert_eq!(CounterFormat::new().separator(',').format(-1500.0), "-1,500");
    }

    #[test]
    fn test_always_trigger_counts_on_mount() {
        let engine = MotionEngine::new(StaticPreference(false));
        let counter = Counter::new(
            &engine.context(),
            50.0,
            EffectConfig::new().trigger(Trigger::Always).duration(0.5),
        );
        assert!(counter.is_running());
        assert_eq!(counter.observation_id(), None);

        engine.tick(250.0);
        assert!(counter.display_value() > 0.0 && counter.display_value() < 50.0);
        engine.tick(500.0);
        assert_eq!(counter.display_value(), 50.0);
        assert!(!counter.is_running());
    }

    #[test]
    fn test_force_final_state_skips_animation() {
        let engine = MotionEngine::new(StaticPreference(false));
        let counter = Counter::new(&engine.context(), 7.0, EffectConfig::new());
        counter.force_final_state();
        assert_eq!(counter.display_value(), 7.0);
        assert_eq!(engine.active_observations(), 0);
        assert_eq!(engine.pending_frames(), 0);
    }
}

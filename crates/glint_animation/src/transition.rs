//! Transition core
//!
//! A [`Transition`] turns a [`StylePair`] plus timing into a time-varying
//! style. It knows nothing about which effect produced the pair; it only
//! blends the attributes it is given.
//!
//! Interrupting a running transition (e.g. pointer leave during a hover-in)
//! starts the new run from the currently displayed style, so there is never
//! a jump. A finished transition reports its target exactly and stays there.

use crate::easing::Easing;
use crate::values::{Interpolate, StylePair};
use glint_core::StyleSnapshot;

/// Timing of a transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: Easing,
}

impl TransitionSpec {
    pub fn new(duration_ms: f64, delay_ms: f64, easing: Easing) -> Self {
        let sane = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            duration_ms: sane(duration_ms),
            delay_ms: sane(delay_ms),
            easing,
        }
    }

    /// Zero duration, zero delay
    pub fn instant() -> Self {
        Self::new(0.0, 0.0, Easing::Linear)
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        self
    }

    pub fn total_ms(&self) -> f64 {
        self.duration_ms + self.delay_ms
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::new(600.0, 0.0, Easing::Standard)
    }
}

/// Where a transition is at a given instant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Not animating
    Idle,
    /// Started, waiting out the delay
    Delayed,
    Running,
}

#[derive(Clone, Copy, Debug)]
struct Run {
    started_at: f64,
    delay_ms: f64,
}

/// Interpolates between the two ends of a [`StylePair`]
#[derive(Clone, Debug)]
pub struct Transition {
    pair: StylePair,
    spec: TransitionSpec,
    /// Style when the current run started
    origin: StyleSnapshot,
    /// End of the current run
    target: StyleSnapshot,
    /// Last sampled style
    current: StyleSnapshot,
    run: Option<Run>,
    towards_to: bool,
}

impl Transition {
    /// A transition resting at `pair.from`
    pub fn new(pair: StylePair, spec: TransitionSpec) -> Self {
        let from = pair.from.clone();
        Self {
            pair,
            spec,
            origin: from.clone(),
            target: from.clone(),
            current: from,
            run: None,
            towards_to: false,
        }
    }

    pub fn pair(&self) -> &StylePair {
        &self.pair
    }

    pub fn spec(&self) -> TransitionSpec {
        self.spec
    }

    pub fn set_spec(&mut self, spec: TransitionSpec) {
        self.spec = spec;
    }

    /// Animate from the current style to `pair.to`, honoring the delay
    pub fn play(&mut self, now_ms: f64) {
        self.towards_to = true;
        let target = self.pair.to.clone();
        self.start(target, now_ms, self.spec.delay_ms);
    }

    /// Animate from the current style back to `pair.from` (no delay)
    pub fn reverse(&mut self, now_ms: f64) {
        self.towards_to = false;
        let target = self.pair.from.clone();
        self.start(target, now_ms, 0.0);
    }

    /// Retarget: the current style becomes `from`, `target` becomes `to`
    ///
    /// Used by pointer-driven effects whose target changes on every event.
    pub fn animate_to(&mut self, target: StyleSnapshot, now_ms: f64) {
        self.pair = StylePair::new(self.current.clone(), target.clone());
        self.towards_to = true;
        self.start(target, now_ms, 0.0);
    }

    fn start(&mut self, target: StyleSnapshot, now_ms: f64, delay_ms: f64) {
        self.origin = self.current.clone();
        self.target = target;
        if self.spec.duration_ms <= 0.0 && delay_ms <= 0.0 {
            self.current = self.target.clone();
            self.run = None;
            return;
        }
        self.run = Some(Run {
            started_at: now_ms,
            delay_ms,
        });
    }

    /// Advance to `now_ms` and return the style to paint
    pub fn sample(&mut self, now_ms: f64) -> &StyleSnapshot {
        if let Some(run) = self.run {
            let elapsed = now_ms - run.started_at - run.delay_ms;
            if elapsed < 0.0 {
                self.current = self.origin.clone();
            } else if self.spec.duration_ms <= 0.0 || elapsed >= self.spec.duration_ms {
                self.current = self.target.clone();
                self.run = None;
            } else {
                let t = (elapsed / self.spec.duration_ms) as f32;
                let eased = self.spec.easing.apply(t);
                self.current = self.origin.lerp(&self.target, eased);
            }
        }
        &self.current
    }

    /// Last sampled style
    pub fn current(&self) -> &StyleSnapshot {
        &self.current
    }

    pub fn phase(&self, now_ms: f64) -> TransitionPhase {
        match self.run {
            None => TransitionPhase::Idle,
            Some(run) if now_ms < run.started_at + run.delay_ms => TransitionPhase::Delayed,
            Some(_) => TransitionPhase::Running,
        }
    }

    /// True while a run is in progress (including its delay)
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// True if the last run headed toward `pair.to`
    pub fn is_toward_to(&self) -> bool {
        self.towards_to
    }

    /// Jump to the end of the current run
    pub fn finish(&mut self) {
        self.current = self.target.clone();
        self.origin = self.target.clone();
        self.run = None;
    }

    /// Jump to `pair.to` regardless of direction
    pub fn force_to(&mut self) {
        self.towards_to = true;
        self.target = self.pair.to.clone();
        self.finish();
    }

    /// Jump to `pair.from` regardless of direction
    pub fn force_from(&mut self) {
        self.towards_to = false;
        self.target = self.pair.from.clone();
        self.finish();
    }

    /// Freeze at the currently displayed style
    pub fn cancel(&mut self) {
        self.origin = self.current.clone();
        self.target = self.current.clone();
        self.run = None;
    }

    /// Replace both endpoints and snap to the end matching the last direction
    pub fn reset_pair(&mut self, pair: StylePair) {
        self.pair = pair;
        if self.towards_to {
            self.force_to();
        } else {
            self.force_from();
        }
    }
}

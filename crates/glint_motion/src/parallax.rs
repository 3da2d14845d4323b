//! Scroll-coupled parallax
//!
//! On every scroll/resize sample the element's target offset is recomputed
//! from one consistent [`ScrollSnapshot`]:
//!
//! ```text
//! target = (viewport_height / 2 - element_center_y_in_viewport) * speed
//! ```
//!
//! and projected onto the configured axis. The painted offset follows the
//! target through a critically damped [`Spring`], so fast scrolling never
//! snaps and never overshoots.
//!
//! Under reduced motion the element is not moved at all and no spring
//! exists.

use crate::config::{Direction, EffectConfig};
use crate::context::MotionContext;
use crate::lifecycle::{with_state, EffectState, Mounted};
use glint_animation::{FrameLoop, LoopControl, SchedulerHandle, Spring, SpringConfig};
use glint_core::{
    MeasureResult, Rect, ScrollSnapshot, StyleProperty, StyleSnapshot, Subscription,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Longest step fed to the spring; hides stalls after the page was hidden
const MAX_STEP_SECONDS: f32 = 0.1;

/// Unprojected parallax offset for an element at `bounds` (document space)
pub fn parallax_target(snapshot: &ScrollSnapshot, bounds: Rect, speed: f32) -> MeasureResult<f32> {
    let bounds = bounds.measured()?;
    let viewport_center = snapshot.viewport.height / 2.0;
    let element_center = bounds.center().y - snapshot.scroll_y;
    let offset = (viewport_center - element_center) * speed;
    Ok(if offset.is_finite() { offset } else { 0.0 })
}

/// Signed offset along the configured axis; `None` direction does not move
fn project(direction: Direction, offset: f32) -> f32 {
    match direction {
        Direction::Up | Direction::Left => offset,
        Direction::Down | Direction::Right => -offset,
        Direction::None => 0.0,
    }
}

struct ParallaxInner {
    this: Weak<RefCell<ParallaxInner>>,
    scheduler: SchedulerHandle,
    direction: Direction,
    speed: f32,
    spring_config: SpringConfig,
    reduced: bool,
    bounds: Option<Rect>,
    snapshot: ScrollSnapshot,
    target: f32,
    /// Only exists while motion is allowed
    spring: Option<Spring>,
    scroll: Option<Subscription>,
    frame_loop: Option<FrameLoop>,
}

impl ParallaxInner {
    fn recompute(&mut self) {
        if self.reduced {
            self.target = 0.0;
            return;
        }
        let raw = match self.bounds {
            Some(bounds) => parallax_target(&self.snapshot, bounds, self.speed).unwrap_or_else(|err| {
                tracing::trace!("Parallax: unmeasurable bounds ({}), neutral offset", err);
                0.0
            }),
            None => 0.0,
        };
        self.target = project(self.direction, raw);

        match self.spring.as_mut() {
            Some(spring) => spring.set_target(self.target),
            None => {
                // First measurement lands in place instead of sliding in
                self.spring = Some(Spring::new(self.spring_config, self.target));
            }
        }
        self.ensure_frames();
    }

    fn ensure_frames(&mut self) {
        let settled = self.spring.as_ref().map_or(true, Spring::is_settled);
        if settled || self.frame_loop.as_ref().is_some_and(FrameLoop::is_running) {
            return;
        }
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut ParallaxInner| {
                let Some(spring) = state.spring.as_mut() else {
                    return LoopControl::Stop;
                };
                let dt = (frame.delta_ms / 1000.0) as f32;
                spring.step(dt.clamp(0.0, MAX_STEP_SECONDS));
                if spring.is_settled() {
                    spring.step(0.0);
                    LoopControl::Stop
                } else {
                    LoopControl::Continue
                }
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn offset(&self) -> f32 {
        match (&self.spring, self.reduced) {
            (Some(spring), false) => spring.value(),
            _ => 0.0,
        }
    }

    fn property(&self) -> StyleProperty {
        if self.direction.is_horizontal() {
            StyleProperty::TranslateX
        } else {
            StyleProperty::TranslateY
        }
    }
}

impl EffectState for ParallaxInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("Parallax: reduced motion -> {}", reduced);
        self.reduced = reduced;
        self.frame_loop = None;
        self.spring = None;
        self.recompute();
    }

    fn cancel(&mut self) {
        self.frame_loop = None;
        let current = self.offset();
        if let Some(spring) = self.spring.as_mut() {
            spring.snap(current);
        }
    }

    fn force_final_state(&mut self) {
        self.frame_loop = None;
        let target = self.target;
        if let Some(spring) = self.spring.as_mut() {
            spring.snap(target);
        }
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
        self.scroll = None;
    }
}

/// Parallax offset for one element
pub struct Parallax {
    inner: Mounted<ParallaxInner>,
}

impl Parallax {
    /// `config.speed` is the speed factor and `config.direction` the axis
    pub fn new(context: &MotionContext, config: EffectConfig) -> Self {
        Self::with_spring(context, config, SpringConfig::parallax())
    }

    pub fn with_spring(context: &MotionContext, config: EffectConfig, spring: SpringConfig) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);

        let state = Rc::new_cyclic(|this: &Weak<RefCell<ParallaxInner>>| {
            let weak = this.clone();
            let scroll = context.scroll().subscribe(move |snapshot| {
                let snapshot = *snapshot;
                with_state(&weak, |state: &mut ParallaxInner| {
                    state.snapshot = snapshot;
                    state.recompute();
                });
            });

            RefCell::new(ParallaxInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                direction: config.direction,
                speed: config.speed,
                spring_config: spring,
                reduced,
                bounds: None,
                snapshot: context.scroll().current(),
                target: 0.0,
                spring: None,
                scroll: Some(scroll),
                frame_loop: None,
            })
        });
        tracing::debug!(
            "Parallax: mounted ({:?}, speed {}, reduced {})",
            config.direction,
            config.speed,
            reduced
        );

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    /// Report the element's layout bounds in document space
    pub fn set_bounds(&self, bounds: Rect) {
        let mut state = self.inner.borrow_mut();
        state.bounds = Some(bounds);
        state.recompute();
    }

    /// Offset to paint this frame
    pub fn offset(&self) -> f32 {
        self.inner.borrow().offset()
    }

    /// Where the offset is heading
    pub fn target_offset(&self) -> f32 {
        self.inner.borrow().target
    }

    pub fn style(&self) -> StyleSnapshot {
        let state = self.inner.borrow();
        StyleSnapshot::new().with(state.property(), state.offset())
    }

    /// True when a spring has been created (never under reduced motion)
    pub fn has_spring(&self) -> bool {
        self.inner.borrow().spring.is_some()
    }

    pub fn is_animating(&self) -> bool {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MotionEngine;
    use glint_core::{Size, StaticPreference};

    fn snapshot(scroll_y: f32) -> ScrollSnapshot {
        ScrollSnapshot::new(0.0, scroll_y, Size::new(800.0, 600.0))
    }

    #[test]
    fn test_target_formula() {
        // Element center at y = 500, viewport center at 300
        let bounds = Rect::new(0.0, 400.0, 100.0, 200.0);
        let target = parallax_target(&snapshot(0.0), bounds, 0.5).unwrap();
        assert!((target + 100.0).abs() < 1e-4);

        let centered = parallax_target(&snapshot(200.0), bounds, 0.5).unwrap();
        assert!(centered.abs() < 1e-4);
    }

    #[test]
    fn test_zero_height_is_an_error() {
        assert!(parallax_target(&snapshot(0.0), Rect::new(0.0, 0.0, 100.0, 0.0), 0.5).is_err());
    }

    #[test]
    fn test_projection() {
        assert_eq!(project(Direction::Up, 10.0), 10.0);
        assert_eq!(project(Direction::Down, 10.0), -10.0);
        assert_eq!(project(Direction::Left, 10.0), 10.0);
        assert_eq!(project(Direction::Right, 10.0), -10.0);
        assert_eq!(project(Direction::None, 10.0), 0.0);
    }

    #[test]
    fn test_spring_follows_scroll_without_overshoot() {
        let engine = MotionEngine::new(StaticPreference(false));
        engine.set_scroll(snapshot(0.0));
        let parallax = Parallax::new(&engine.context(), EffectConfig::new().speed(0.5));
        parallax.set_bounds(Rect::new(0.0, 200.0, 100.0, 200.0));
        assert!(parallax.offset().abs() < 1e-4);

        engine.set_scroll(snapshot(400.0));
        let target = parallax.target_offset();
        assert!((target - 200.0).abs() < 1e-3);

        let mut now = 0.0;
        let mut last = parallax.offset();
        for _ in 0..120 {
            now += 16.0;
            engine.tick(now);
            let offset = parallax.offset();
            assert!(offset >= last - 1e-3);
            assert!(offset <= target + 1e-3);
            last = offset;
        }
        assert_eq!(parallax.offset(), target);
        assert_eq!(engine.pending_frames(), 0);
    }

    #[test]
    fn test_unmeasured_element_is_neutral() {
        let engine = MotionEngine::new(StaticPreference(false));
        let parallax = Parallax::new(&engine.context(), EffectConfig::new());
        parallax.set_bounds(Rect::new(0.0, 100.0, 0.0, 0.0));
        engine.set_scroll(snapshot(300.0));
        assert_eq!(parallax.target_offset(), 0.0);
        assert_eq!(parallax.offset(), 0.0);
    }

    #[test]
    fn test_horizontal_axis() {
        let engine = MotionEngine::new(StaticPreference(false));
        engine.set_scroll(snapshot(0.0));
        let parallax = Parallax::new(
            &engine.context(),
            EffectConfig::new().direction(Direction::Right),
        );
        parallax.set_bounds(Rect::new(0.0, 400.0, 100.0, 200.0));
        let style = parallax.style();
        assert!(style.translate_x().is_some());
        assert!(style.translate_y().is_none());
        assert!(parallax.target_offset() > 0.0);
    }
}

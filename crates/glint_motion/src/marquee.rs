//! Continuous scroller for marquees and carousels
//!
//! The caller renders its content twice in a row; the marquee only moves an
//! offset. Each frame adds `speed` pixels, and when the offset reaches half
//! the (doubled) content width it wraps to exactly zero, which looks like an
//! endless strip.

use crate::config::{Direction, EffectConfig};
use crate::context::MotionContext;
use crate::interaction::PointerEvent;
use crate::lifecycle::{with_state, EffectState, Mounted};
use glint_animation::{FrameLoop, LoopControl, SchedulerHandle};
use glint_core::{StyleProperty, StyleSnapshot};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Which way the strip travels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarqueeDirection {
    #[default]
    Left,
    Right,
}

/// Marquee settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarqueeConfig {
    /// Pixels per frame
    pub speed: f32,
    pub direction: MarqueeDirection,
    pub pause_on_hover: bool,
    pub reduced_motion: Option<bool>,
}

impl MarqueeConfig {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    pub fn direction(mut self, direction: MarqueeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn pause_on_hover(mut self, pause: bool) -> Self {
        self.pause_on_hover = pause;
        self
    }
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            direction: MarqueeDirection::Left,
            pause_on_hover: true,
            reduced_motion: None,
        }
    }
}

impl From<&EffectConfig> for MarqueeConfig {
    /// `speed` carries over; only `right` reverses the strip
    fn from(config: &EffectConfig) -> Self {
        let config = config.sanitized();
        Self {
            speed: config.speed,
            direction: match config.direction {
                Direction::Right => MarqueeDirection::Right,
                _ => MarqueeDirection::Left,
            },
            pause_on_hover: true,
            reduced_motion: config.reduced_motion,
        }
    }
}

/// Offset after one frame
///
/// Content without width has nothing to scroll and stays at zero.
pub fn advance_offset(offset: f32, speed: f32, content_width: f32) -> f32 {
    let half = content_width / 2.0;
    if !(half.is_finite() && half > 0.0) {
        return 0.0;
    }
    let next = offset + speed;
    if !next.is_finite() || next >= half {
        0.0
    } else {
        next.max(0.0)
    }
}

struct MarqueeInner {
    this: Weak<RefCell<MarqueeInner>>,
    scheduler: SchedulerHandle,
    config: MarqueeConfig,
    content_width: f32,
    offset: f32,
    hovered: bool,
    /// Stopped by cancel/force; only an explicit resume restarts it
    halted: bool,
    reduced: bool,
    frame_loop: Option<FrameLoop>,
}

impl MarqueeInner {
    fn should_run(&self) -> bool {
        !self.reduced && !self.halted && !(self.hovered && self.config.pause_on_hover)
    }

    fn sync_loop(&mut self) {
        if !self.should_run() {
            if let Some(frame_loop) = self.frame_loop.take() {
                frame_loop.cancel();
                tracing::trace!("Marquee: paused at {}", self.offset);
            }
            return;
        }
        if self.frame_loop.as_ref().is_some_and(FrameLoop::is_running) {
            return;
        }
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |_frame| {
            with_state(&weak, |state: &mut MarqueeInner| {
                state.offset =
                    advance_offset(state.offset, state.config.speed, state.content_width);
                LoopControl::Continue
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn translate_x(&self) -> f32 {
        if self.reduced {
            return 0.0;
        }
        match self.config.direction {
            MarqueeDirection::Left => -self.offset,
            MarqueeDirection::Right => {
                let half = self.content_width / 2.0;
                if half.is_finite() && half > 0.0 {
                    self.offset - half
                } else {
                    0.0
                }
            }
        }
    }
}

impl EffectState for MarqueeInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("Marquee: reduced motion -> {}", reduced);
        self.reduced = reduced;
        if reduced {
            self.offset = 0.0;
        }
        self.sync_loop();
    }

    fn cancel(&mut self) {
        self.halted = true;
        self.sync_loop();
    }

    fn force_final_state(&mut self) {
        self.halted = true;
        self.offset = 0.0;
        self.sync_loop();
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
    }
}

/// An endlessly scrolling strip
pub struct Marquee {
    inner: Mounted<MarqueeInner>,
}

impl Marquee {
    /// Start scrolling content whose doubled width is `content_width`
    pub fn new(context: &MotionContext, config: MarqueeConfig, content_width: f32) -> Self {
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let speed = if config.speed.is_finite() {
            config.speed.max(0.0)
        } else {
            0.0
        };
        let config = MarqueeConfig { speed, ..config };

        let state = Rc::new_cyclic(|this| {
            RefCell::new(MarqueeInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                config,
                content_width,
                offset: 0.0,
                hovered: false,
                halted: false,
                reduced,
                frame_loop: None,
            })
        });
        state.borrow_mut().sync_loop();
        tracing::debug!(
            "Marquee: mounted ({:?}, {}px/frame, width {})",
            config.direction,
            speed,
            content_width
        );

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    pub fn from_effect_config(context: &MotionContext, config: &EffectConfig, content_width: f32) -> Self {
        Self::new(context, MarqueeConfig::from(config), content_width)
    }

    /// Content was re-measured; the offset is kept if still in range
    pub fn set_content_width(&self, content_width: f32) {
        let mut state = self.inner.borrow_mut();
        state.content_width = content_width;
        state.offset = advance_offset(state.offset, 0.0, content_width);
    }

    pub fn pointer(&self, event: PointerEvent) {
        let mut state = self.inner.borrow_mut();
        match event {
            PointerEvent::Enter => state.hovered = true,
            PointerEvent::Leave => state.hovered = false,
            _ => return,
        }
        state.sync_loop();
    }

    /// Restart after [`cancel`](Self::cancel) or [`force_final_state`](Self::force_final_state)
    pub fn resume(&self) {
        let mut state = self.inner.borrow_mut();
        state.halted = false;
        state.sync_loop();
    }

    pub fn offset(&self) -> f32 {
        self.inner.borrow().offset
    }

    pub fn translate_x(&self) -> f32 {
        self.inner.borrow().translate_x()
    }

    pub fn style(&self) -> StyleSnapshot {
        StyleSnapshot::new().with(StyleProperty::TranslateX, self.translate_x())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MotionEngine;
    use glint_core::StaticPreference;

    #[test]
    fn test_advance_wraps_to_zero() {
        assert_eq!(advance_offset(0.0, 2.0, 10.0), 2.0);
        assert_eq!(advance_offset(3.0, 2.0, 10.0), 0.0);
        assert_eq!(advance_offset(2.0, 2.0, 10.0), 4.0);
        assert_eq!(advance_offset(5.0, 1.0, 0.0), 0.0);
        assert_eq!(advance_offset(5.0, 1.0, f32::NAN), 0.0);
    }

    #[test]
    fn test_direction_mapping() {
        let engine = MotionEngine::new(StaticPreference(false));
        let right = Marquee::new(
            &engine.context(),
            MarqueeConfig::new(10.0).direction(MarqueeDirection::Right),
            100.0,
        );
        let left = Marquee::new(&engine.context(), MarqueeConfig::new(10.0), 100.0);
        engine.tick(16.0);

        assert_eq!(left.translate_x(), -10.0);
        assert_eq!(right.translate_x(), -40.0);
    }

    #[test]
    fn test_from_effect_config() {
        let config = EffectConfig::new().speed(3.0).direction(Direction::Right);
        let marquee = MarqueeConfig::from(&config);
        assert_eq!(marquee.speed, 3.0);
        assert_eq!(marquee.direction, MarqueeDirection::Right);

        let unknown = MarqueeConfig::from(&EffectConfig::new().direction(Direction::None));
        assert_eq!(unknown.direction, MarqueeDirection::Left);
    }

    #[test]
    fn test_hover_does_not_pause_when_disabled() {
        let engine = MotionEngine::new(StaticPreference(false));
        let marquee = Marquee::new(
            &engine.context(),
            MarqueeConfig::new(1.0).pause_on_hover(false),
            100.0,
        );
        marquee.pointer(PointerEvent::Enter);
        engine.tick(16.0);
        assert_eq!(marquee.offset(), 1.0);
    }

    #[test]
    fn test_cancel_then_resume() {
        let engine = MotionEngine::new(StaticPreference(false));
        let marquee = Marquee::new(&engine.context(), MarqueeConfig::new(1.0), 100.0);
        engine.tick(16.0);
        marquee.cancel();
        engine.tick(32.0);
        assert_eq!(marquee.offset(), 1.0);
        assert_eq!(engine.pending_frames(), 0);

        marquee.resume();
        engine.tick(48.0);
        assert_eq!(marquee.offset(), 2.0);
    }
}

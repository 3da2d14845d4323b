//! Interaction states for cards, buttons and icons
//!
//! Pointer events move an [`Interactive`] between rest, hover and press
//! targets. Each change retargets a short transition from whatever is on
//! screen, so rapid enter/leave never jumps. The ripple variant also spawns
//! a [`RippleParticle`](crate::ripple::RippleParticle) on every press.

use crate::config::{EffectConfig, InteractionVariant};
use crate::context::MotionContext;
use crate::lifecycle::{with_state, EffectState, Mounted};
use crate::ripple::{RippleField, RippleSample, DEFAULT_RIPPLE_DIAMETER};
use glint_animation::{
    Easing, FrameLoop, LoopControl, SchedulerHandle, StylePair, Transition, TransitionSpec,
};
use glint_core::{Color, Point, Shadow, Size, StyleProperty, StyleSnapshot, Vec2};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Pointer input in element-local coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Down { x: f32, y: f32 },
    Up,
    Move { x: f32, y: f32 },
}

/// Duration of every hover/press transition
pub const INTERACTION_DURATION_MS: f64 = 200.0;

/// Fraction of the pointer's distance from center that a magnetic element follows
pub const MAGNETIC_STRENGTH: f32 = 0.3;

pub const MAGNETIC_HOVER_SCALE: f32 = 1.05;

const HOVER_SCALE: f32 = 1.02;
const PRESS_SCALE: f32 = 0.98;
const HOVER_LIFT: f32 = -4.0;
/// Degrees of tilt per pixel of magnetic pull
const MAGNETIC_TILT: f32 = 0.1;
const GLOW_COLOR: u32 = 0x7C5CFF;

/// Pointer-derived inputs of the interaction target
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub hovered: bool,
    pub pressed: bool,
    /// Magnetic translation toward the pointer
    pub pull: Vec2,
}

/// Target style for a variant in a given pointer state
///
/// Every target carries the same attributes so the transition can blend
/// any two of them.
pub fn interaction_style(variant: InteractionVariant, pointer: &PointerState) -> StyleSnapshot {
    let rest_shadow = Shadow::new(2.0, 8.0, Color::BLACK.with_alpha(0.08));
    let hover_shadow = Shadow::new(12.0, 24.0, Color::BLACK.with_alpha(0.16));
    let press_shadow = Shadow::new(1.0, 4.0, Color::BLACK.with_alpha(0.12));
    let glow = Color::from_hex(GLOW_COLOR);

    let mut scale = 1.0;
    let mut lift = 0.0;
    let mut pull = Vec2::ZERO;
    let mut shadow = rest_shadow;
    let mut glow_alpha = 0.0;

    if pointer.hovered {
        shadow = hover_shadow;
        match variant {
            InteractionVariant::Default => {
                scale = HOVER_SCALE;
                lift = HOVER_LIFT;
            }
            InteractionVariant::Glow => {
                scale = HOVER_SCALE;
                glow_alpha = 0.45;
            }
            InteractionVariant::Ripple => scale = HOVER_SCALE,
            InteractionVariant::Magnetic => {
                scale = MAGNETIC_HOVER_SCALE;
                pull = pointer.pull;
            }
        }
    }
    if pointer.pressed {
        scale = PRESS_SCALE;
        lift = 0.0;
        shadow = press_shadow;
        if variant == InteractionVariant::Glow {
            glow_alpha = 0.6;
        }
    }

    StyleSnapshot::new()
        .with(StyleProperty::TranslateX, pull.x)
        .with(StyleProperty::TranslateY, lift + pull.y)
        .with(StyleProperty::Scale, scale)
        .with(StyleProperty::Rotate, pull.x * MAGNETIC_TILT)
        .with(StyleProperty::Shadow, shadow)
        .with(StyleProperty::Glow, glow.with_alpha(glow_alpha))
}

/// Magnetic pull for a pointer at `pointer` over an element of `size`
///
/// Unmeasured elements have no center and get no pull.
pub fn magnetic_pull(pointer: Point, size: Size, max_distance: f32) -> Vec2 {
    if !size.is_measurable() || !(pointer.x.is_finite() && pointer.y.is_finite()) {
        return Vec2::ZERO;
    }
    Vec2::new(
        pointer.x - size.width / 2.0,
        pointer.y - size.height / 2.0,
    )
    .scale(MAGNETIC_STRENGTH)
    .clamp_components(max_distance)
}

struct InteractiveInner {
    this: Weak<RefCell<InteractiveInner>>,
    scheduler: SchedulerHandle,
    variant: InteractionVariant,
    reduced: bool,
    pointer: PointerState,
    size: Size,
    max_pull: f32,
    transition: Transition,
    ripples: RippleField,
    frame_loop: Option<FrameLoop>,
}

impl InteractiveInner {
    fn target(&self) -> StyleSnapshot {
        interaction_style(self.variant, &self.pointer)
    }

    fn rest(&self) -> StyleSnapshot {
        interaction_style(self.variant, &PointerState::default())
    }

    fn retarget(&mut self) {
        if self.reduced {
            return;
        }
        let target = self.target();
        if self.transition.pair().to != target || self.transition.is_active() {
            self.transition.animate_to(target, self.scheduler.now());
        }
        self.ensure_frames();
    }

    fn needs_frames(&self) -> bool {
        self.transition.is_active() || !self.ripples.is_empty()
    }

    fn ensure_frames(&mut self) {
        if !self.needs_frames() || self.frame_loop.as_ref().is_some_and(FrameLoop::is_running) {
            return;
        }
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut InteractiveInner| {
                state.transition.sample(frame.now_ms);
                state.ripples.sweep(frame.now_ms);
                if state.needs_frames() {
                    LoopControl::Continue
                } else {
                    LoopControl::Stop
                }
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter => self.pointer.hovered = true,
            PointerEvent::Leave => self.pointer = PointerState::default(),
            PointerEvent::Down { x, y } => {
                self.pointer.pressed = true;
                if self.variant == InteractionVariant::Ripple && !self.reduced {
                    let now = self.scheduler.now();
                    self.ripples.spawn(x, y, now, self.scheduler.frame());
                }
            }
            PointerEvent::Up => self.pointer.pressed = false,
            PointerEvent::Move { x, y } => {
                if self.variant != InteractionVariant::Magnetic || !self.pointer.hovered {
                    return;
                }
                self.pointer.pull = magnetic_pull(Point::new(x, y), self.size, self.max_pull);
            }
        }
        self.retarget();
    }
}

impl EffectState for InteractiveInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("Interactive: reduced motion -> {}", reduced);
        self.reduced = reduced;
        self.frame_loop = None;
        self.ripples.clear();
        let settled = if reduced { self.rest() } else { self.target() };
        self.transition.reset_pair(StylePair::settled(settled));
    }

    fn cancel(&mut self) {
        self.frame_loop = None;
        self.transition.cancel();
        self.ripples.clear();
    }

    fn force_final_state(&mut self) {
        self.frame_loop = None;
        self.transition.finish();
        self.ripples.clear();
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
        self.ripples.clear();
    }
}

/// Hover/press states for one card, button or icon
pub struct Interactive {
    inner: Mounted<InteractiveInner>,
}

impl Interactive {
    /// `config.variant` picks the look; `config.distance` caps the magnetic pull
    pub fn new(context: &MotionContext, config: EffectConfig) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let variant = config.variant;
        let rest = interaction_style(variant, &PointerState::default());

        let state = Rc::new_cyclic(|this| {
            RefCell::new(InteractiveInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                variant,
                reduced,
                pointer: PointerState::default(),
                size: Size::ZERO,
                max_pull: config.distance,
                transition: Transition::new(
                    StylePair::settled(rest),
                    TransitionSpec::new(INTERACTION_DURATION_MS, 0.0, Easing::EaseOut),
                ),
                ripples: RippleField::default(),
                frame_loop: None,
            })
        });
        tracing::debug!("Interactive: mounted {:?} (reduced {})", variant, reduced);

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    /// Element size, used for the magnetic center and the ripple diameter
    pub fn set_size(&self, size: Size) {
        let mut state = self.inner.borrow_mut();
        state.size = size;
        let diameter = if size.is_measurable() {
            2.0 * size.width.max(size.height)
        } else {
            DEFAULT_RIPPLE_DIAMETER
        };
        state.ripples.set_max_diameter(diameter);
    }

    pub fn pointer(&self, event: PointerEvent) {
        self.inner.borrow_mut().on_pointer(event);
    }

    pub fn style(&self) -> StyleSnapshot {
        self.inner.borrow().transition.current().clone()
    }

    /// Ripples to paint this frame
    pub fn ripples(&self) -> Vec<RippleSample> {
        let state = self.inner.borrow();
        state.ripples.samples(state.scheduler.now())
    }

    /// Ripples still retained (not yet past their lifetime)
    pub fn ripple_count(&self) -> usize {
        self.inner.borrow().ripples.len()
    }

    pub fn pointer_state(&self) -> PointerState {
        self.inner.borrow().pointer
    }

    pub fn variant(&self) -> InteractionVariant {
        self.inner.borrow().variant
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().needs_frames()
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

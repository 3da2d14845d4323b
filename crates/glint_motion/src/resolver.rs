//! Trigger-to-state resolver
//!
//! Each visual wrapper is a policy that maps its configuration and the
//! reduced-motion flag to a [`StylePair`]. The transition core never learns
//! which policy produced the pair.
//!
//! Under reduced motion every policy collapses to `to`/`to`: the element is
//! painted in its settled state and nothing animates.

use crate::config::{Direction, EffectConfig, RevealStyle, Trigger};
use glint_animation::StylePair;
use glint_core::{ClipInset, StyleProperty, StyleSnapshot};

/// Translation used by the slide reveal, regardless of the configured distance
pub const REVEAL_SLIDE_DISTANCE: f32 = 60.0;

/// Starting scale of the scale reveal
pub const REVEAL_SCALE_FROM: f32 = 0.8;

/// Blur radius of an unsharpened element, in pixels
pub const DEFAULT_BLUR: f32 = 10.0;

/// Opacity of a hover-blur element while at rest
pub const HOVER_BLUR_REST_OPACITY: f32 = 0.7;

/// Visual policy of a trigger-driven wrapper
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectVariant {
    /// Opacity plus an optional entrance translation
    Fade { direction: Direction, distance: f32 },
    Reveal { style: RevealStyle, direction: Direction },
    Blur { amount: f32 },
}

impl EffectVariant {
    pub fn fade(config: &EffectConfig) -> Self {
        EffectVariant::Fade {
            direction: config.direction,
            distance: config.distance,
        }
    }

    pub fn reveal(config: &EffectConfig) -> Self {
        EffectVariant::Reveal {
            style: config.reveal_style,
            direction: config.direction,
        }
    }

    pub fn blur(amount: f32) -> Self {
        let amount = if amount.is_finite() { amount.max(0.0) } else { DEFAULT_BLUR };
        EffectVariant::Blur { amount }
    }

    /// Resolve the pair to animate between
    pub fn resolve(&self, trigger: Trigger, reduced_motion: bool) -> StylePair {
        let pair = self.motion_pair(trigger);
        if reduced_motion {
            StylePair::settled(pair.to)
        } else {
            pair
        }
    }

    /// Whether this variant ignores a caller's `once = false`
    ///
    /// The scroll-triggered blur only ever sharpens once.
    pub fn forces_once(&self, trigger: Trigger) -> bool {
        matches!(self, EffectVariant::Blur { .. }) && trigger == Trigger::Scroll
    }

    fn motion_pair(&self, trigger: Trigger) -> StylePair {
        match *self {
            EffectVariant::Fade {
                direction,
                distance,
            } => fade_pair(direction, distance),
            EffectVariant::Reveal { style, direction } => reveal_pair(style, direction),
            EffectVariant::Blur { amount } => blur_pair(amount, trigger),
        }
    }
}

fn fade_pair(direction: Direction, distance: f32) -> StylePair {
    let mut from = StyleSnapshot::new().with(StyleProperty::Opacity, 0.0);
    let mut to = StyleSnapshot::new().with(StyleProperty::Opacity, 1.0);
    if let Some((x, y)) = direction.entrance_offset(distance) {
        let property = if direction.is_horizontal() {
            StyleProperty::TranslateX
        } else {
            StyleProperty::TranslateY
        };
        from.set(property, if direction.is_horizontal() { x } else { y });
        to.set(property, 0.0);
    }
    StylePair::new(from, to)
}

fn reveal_pair(style: RevealStyle, direction: Direction) -> StylePair {
    match style {
        RevealStyle::Slide => fade_pair(direction, REVEAL_SLIDE_DISTANCE),
        RevealStyle::Fade => fade_pair(Direction::None, 0.0),
        RevealStyle::Scale => StylePair::new(
            StyleSnapshot::new()
                .with(StyleProperty::Opacity, 0.0)
                .with(StyleProperty::Scale, REVEAL_SCALE_FROM),
            StyleSnapshot::new()
                .with(StyleProperty::Opacity, 1.0)
                .with(StyleProperty::Scale, 1.0),
        ),
        RevealStyle::Clip => StylePair::new(
            StyleSnapshot::new().with(StyleProperty::Clip, hidden_clip(direction)),
            StyleSnapshot::new().with(StyleProperty::Clip, ClipInset::empty()),
        ),
        RevealStyle::Mask => StylePair::new(
            StyleSnapshot::new().with(StyleProperty::Mask, 0.0),
            StyleSnapshot::new().with(StyleProperty::Mask, 1.0),
        ),
    }
}

/// Fully clipped inset; the open edge is the one the content travels toward
fn hidden_clip(direction: Direction) -> ClipInset {
    match direction {
        Direction::Up => ClipInset::new(100.0, 0.0, 0.0, 0.0),
        Direction::Down => ClipInset::new(0.0, 0.0, 100.0, 0.0),
        Direction::Left => ClipInset::new(0.0, 0.0, 0.0, 100.0),
        Direction::Right => ClipInset::new(0.0, 100.0, 0.0, 0.0),
        // Closes from both edges toward the middle
        Direction::None => ClipInset::new(50.0, 0.0, 50.0, 0.0),
    }
}

fn blur_pair(amount: f32, trigger: Trigger) -> StylePair {
    let sharp = StyleSnapshot::new()
        .with(StyleProperty::Blur, 0.0)
        .with(StyleProperty::Opacity, 1.0);
    match trigger {
        Trigger::Scroll => StylePair::new(
            StyleSnapshot::new()
                .with(StyleProperty::Blur, amount)
                .with(StyleProperty::Opacity, 0.0),
            sharp,
        ),
        Trigger::Hover => StylePair::new(
            StyleSnapshot::new()
                .with(StyleProperty::Blur, amount)
                .with(StyleProperty::Opacity, HOVER_BLUR_REST_OPACITY),
            sharp,
        ),
        Trigger::Always => StylePair::settled(sharp),
    }
}

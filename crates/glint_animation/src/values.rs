//! Animatable value types
//!
//! Provides the [`Interpolate`] trait and implementations for every value a
//! [`StyleSnapshot`] can hold, plus [`StylePair`], the (from, to) pair an
//! effect animates between.

use glint_core::{ClipInset, Color, Shadow, StyleSnapshot, StyleValue};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t
    ///
    /// `t` is already eased and may leave 0.0..=1.0 slightly for
    /// overshooting curves.
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// Scalar and composite implementations
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

impl Interpolate for Shadow {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Shadow {
            offset_x: self.offset_x.lerp(&other.offset_x, t),
            offset_y: self.offset_y.lerp(&other.offset_y, t),
            blur: self.blur.lerp(&other.blur, t).max(0.0),
            spread: self.spread.lerp(&other.spread, t),
            color: self.color.lerp(&other.color, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.offset_x.approx_eq(&other.offset_x, epsilon)
            && self.offset_y.approx_eq(&other.offset_y, epsilon)
            && self.blur.approx_eq(&other.blur, epsilon)
            && self.spread.approx_eq(&other.spread, epsilon)
            && Interpolate::approx_eq(&self.color, &other.color, epsilon)
    }
}

impl Interpolate for ClipInset {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // Insets are percentages; overshooting curves must not invert the clip
        let side = |a: f32, b: f32| a.lerp(&b, t).clamp(0.0, 100.0);
        ClipInset {
            top: side(self.top, other.top),
            right: side(self.right, other.right),
            bottom: side(self.bottom, other.bottom),
            left: side(self.left, other.left),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.top.approx_eq(&other.top, epsilon)
            && self.right.approx_eq(&other.right, epsilon)
            && self.bottom.approx_eq(&other.bottom, epsilon)
            && self.left.approx_eq(&other.left, epsilon)
    }
}

impl Interpolate for StyleValue {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (StyleValue::Float(a), StyleValue::Float(b)) => StyleValue::Float(a.lerp(b, t)),
            (StyleValue::Color(a), StyleValue::Color(b)) => StyleValue::Color(a.lerp(b, t)),
            (StyleValue::Shadow(a), StyleValue::Shadow(b)) => StyleValue::Shadow(a.lerp(b, t)),
            (StyleValue::Clip(a), StyleValue::Clip(b)) => StyleValue::Clip(a.lerp(b, t)),
            // Mismatched kinds cannot blend; switch at the end
            _ => {
                if t >= 1.0 {
                    *other
                } else {
                    *self
                }
            }
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (StyleValue::Float(a), StyleValue::Float(b)) => a.approx_eq(b, epsilon),
            (StyleValue::Color(a), StyleValue::Color(b)) => Interpolate::approx_eq(a, b, epsilon),
            (StyleValue::Shadow(a), StyleValue::Shadow(b)) => a.approx_eq(b, epsilon),
            (StyleValue::Clip(a), StyleValue::Clip(b)) => a.approx_eq(b, epsilon),
            _ => false,
        }
    }
}

impl Interpolate for StyleSnapshot {
    /// Attributes present in both snapshots are blended. Attributes only in
    /// `other` are taken as-is; attributes only in `self` are dropped.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        other
            .iter()
            .map(|(property, to)| {
                let value = match self.get(*property) {
                    Some(from) => from.lerp(to, t),
                    None => *to,
                };
                (*property, value)
            })
            .collect()
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.len() == other.len()
            && self.iter().all(|(property, value)| {
                other
                    .get(*property)
                    .map(|o| value.approx_eq(o, epsilon))
                    .unwrap_or(false)
            })
    }
}

// ============================================================================
// Style pairs
// ============================================================================

/// The resting (`from`) and target (`to`) styles of one effect
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePair {
    pub from: StyleSnapshot,
    pub to: StyleSnapshot,
}

impl StylePair {
    pub fn new(from: StyleSnapshot, to: StyleSnapshot) -> Self {
        Self { from, to }
    }

    /// A pair with no visible transition: both ends are `to`
    pub fn settled(to: StyleSnapshot) -> Self {
        Self {
            from: to.clone(),
            to,
        }
    }

    /// True when painting `from` and `to` would look identical
    pub fn is_static(&self) -> bool {
        self.from == self.to
    }

    /// Sample the pair at eased progress `t`
    pub fn sample(&self, t: f32) -> StyleSnapshot {
        if t >= 1.0 {
            return self.to.clone();
        }
        if t <= 0.0 {
            return self.from.clone();
        }
        self.from.lerp(&self.to, t)
    }
}

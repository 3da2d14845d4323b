//! Easing curves
//!
//! A small fixed set of named presets plus arbitrary cubic-bezier curves.
//! Every curve maps 0.0 to 0.0 and 1.0 to exactly 1.0, so a finished
//! transition always lands on its target.

use serde::{Deserialize, Serialize};

/// Easing function applied to normalized progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// `1 - (1 - t)^3`
    EaseOutCubic,
    /// cubic-bezier(0.16, 1, 0.3, 1): fast start, long tail
    ExpoOut,
    /// Damped settle with a small overshoot, pinned to 1 at t = 1
    Spring,
    /// Arbitrary cubic-bezier control points
    #[serde(skip)]
    CubicBezier(f32, f32, f32, f32),
    /// cubic-bezier(0.25, 0.4, 0.25, 1): the default entrance curve
    ///
    /// Also what unrecognized names deserialize to.
    #[default]
    #[serde(other)]
    Standard,
}

impl Easing {
    /// Apply the curve to progress `t` (clamped to 0.0..=1.0)
    pub fn apply(&self, t: f32) -> f32 {
        if !t.is_finite() {
            return 1.0;
        }
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut | Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Standard => cubic_bezier(0.25, 0.4, 0.25, 1.0, t),
            Easing::ExpoOut => cubic_bezier(0.16, 1.0, 0.3, 1.0, t),
            Easing::Spring => {
                // Underdamped response, enveloped so it has settled by t = 1
                let omega = 12.0;
                let zeta = 0.45;
                let decay = (-zeta * omega * t).exp();
                let damped = omega * (1.0 - zeta * zeta).sqrt();
                1.0 - decay * ((damped * t).cos() + (zeta * omega / damped) * (damped * t).sin())
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

/// Evaluate a CSS-style cubic bezier at x = `t`
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    // Control points are clamped to keep x monotonic
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f32| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f32| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f32| (3.0 * ax * s + 2.0 * bx) * s + cx;

    // Newton-Raphson, then bisection if the slope is too flat
    let mut s = t;
    for _ in 0..8 {
        let err = sample_x(s) - t;
        if err.abs() < 1e-6 {
            return sample_y(s);
        }
        let d = slope_x(s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = sample_x(s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    sample_y(s)
}

//! Effect configuration
//!
//! One [`EffectConfig`] describes a single wrapper instance. It is a plain
//! value: effects copy it on mount and never mutate it afterwards. Any field
//! may be omitted in TOML, and unrecognized enum strings fall back to a safe
//! default instead of failing the whole file.
//!
//! # Example
//!
//! ```rust
//! use glint_motion::{Direction, EffectConfig, Trigger};
//!
//! let config = EffectConfig::from_toml_str(
//!     r#"
//!     trigger = "scroll"
//!     direction = "sideways"
//!     duration = 0.3
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.trigger, Trigger::Scroll);
//! assert_eq!(config.direction, Direction::None);
//! ```

use glint_animation::{Easing, TransitionSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// What drives an effect from `from` to `to`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Pointer enter/leave
    Hover,
    /// Plays once on mount
    Always,
    /// Viewport visibility
    #[default]
    #[serde(other)]
    Scroll,
}

/// Direction an element travels while entering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Rises into place from below
    #[default]
    Up,
    Down,
    Left,
    Right,
    /// No translation at all
    #[serde(other)]
    None,
}

impl Direction {
    /// Starting offset `(x, y)` for an element that travels `distance` in this direction
    ///
    /// Returns `None` for [`Direction::None`], meaning the translate axis is
    /// omitted entirely rather than set to zero.
    pub fn entrance_offset(&self, distance: f32) -> Option<(f32, f32)> {
        match self {
            Direction::Up => Some((0.0, distance)),
            Direction::Down => Some((0.0, -distance)),
            Direction::Left => Some((distance, 0.0)),
            Direction::Right => Some((-distance, 0.0)),
            Direction::None => None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Attribute set used by the reveal wrapper
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealStyle {
    Fade,
    Scale,
    Clip,
    Mask,
    #[default]
    #[serde(other)]
    Slide,
}

/// Look of an interactive card/button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionVariant {
    Glow,
    Ripple,
    Magnetic,
    #[default]
    #[serde(other)]
    Default,
}

/// Per-instance effect configuration
///
/// Durations and delays are in seconds, distances in pixels, and `speed` is
/// effect-specific (a factor for parallax, pixels per frame for marquees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub trigger: Trigger,
    pub duration: f32,
    pub delay: f32,
    pub distance: f32,
    pub direction: Direction,
    pub once: bool,
    /// Per-instance override of the global reduced-motion flag
    pub reduced_motion: Option<bool>,
    /// Fraction of the element that must be visible, 0.0 to 1.0
    pub threshold: f32,
    pub easing: Easing,
    pub reveal_style: RevealStyle,
    pub variant: InteractionVariant,
    pub speed: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            trigger: Trigger::Scroll,
            duration: 0.6,
            delay: 0.0,
            distance: 24.0,
            direction: Direction::Up,
            once: true,
            reduced_motion: None,
            threshold: 0.2,
            easing: Easing::Standard,
            reveal_style: RevealStyle::Slide,
            variant: InteractionVariant::Default,
            speed: 0.5,
        }
    }
}

impl EffectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing fields take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EffectConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Duration in seconds
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    /// Delay in seconds
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn distance(mut self, px: f32) -> Self {
        self.distance = px;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = Some(reduced);
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn reveal_style(mut self, style: RevealStyle) -> Self {
        self.reveal_style = style;
        self
    }

    pub fn variant(mut self, variant: InteractionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Clamp out-of-range numbers to usable values
    ///
    /// Negative or non-finite durations, delays, distances and speeds become
    /// their nearest valid value and the threshold is clamped to 0.0..=1.0.
    /// Every adjustment is logged at `warn`.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.duration = clamp_non_negative("duration", self.duration, defaults.duration);
        self.delay = clamp_non_negative("delay", self.delay, 0.0);
        self.distance = clamp_non_negative("distance", self.distance, defaults.distance);
        self.speed = clamp_non_negative("speed", self.speed, defaults.speed);

        let threshold = if self.threshold.is_finite() {
            self.threshold.clamp(0.0, 1.0)
        } else {
            defaults.threshold
        };
        if threshold != self.threshold {
            tracing::warn!(
                "EffectConfig: threshold {} out of range, using {}",
                self.threshold,
                threshold
            );
            self.threshold = threshold;
        }
        self
    }

    pub fn duration_ms(&self) -> f64 {
        f64::from(self.duration) * 1000.0
    }

    pub fn delay_ms(&self) -> f64 {
        f64::from(self.delay) * 1000.0
    }

    /// Timing for the transition core
    pub fn transition_spec(&self) -> TransitionSpec {
        TransitionSpec::new(self.duration_ms(), self.delay_ms(), self.easing)
    }
}

fn clamp_non_negative(field: &str, value: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        tracing::warn!("EffectConfig: {} is not finite, using {}", field, fallback);
        return fallback;
    }
    if value < 0.0 {
        tracing::warn!("EffectConfig: {} {} is negative, using 0", field, value);
        return 0.0;
    }
    value
}

//! Glint Motion
//!
//! Scroll- and pointer-driven motion effects built on `glint_animation`.
//!
//! # Features
//!
//! - **Entrance Effects**: fade-in, five reveal styles and blur, triggered by
//!   viewport visibility, hover, or mount
//! - **Stagger**: cascaded child entrances gated on the container's trigger
//! - **Parallax**: scroll-coupled offsets on a critically damped spring
//! - **Counters**: eased count-up on first visibility
//! - **Interaction States**: hover/press targets, ripples, magnetic pull
//! - **Continuous Motion**: marquees and pulsing badges
//! - **Reduced Motion**: every effect collapses to its settled style
//!
//! Hosts own a [`MotionEngine`], feed it time, scroll samples, intersection
//! samples and pointer events, and read each effect's `style()` per frame.

pub mod config;
pub mod context;
pub mod counter;
pub mod effect;
pub mod interaction;
mod lifecycle;
pub mod marquee;
pub mod observer;
pub mod parallax;
pub mod pulse;
pub mod resolver;
pub mod ripple;
pub mod stagger;

#[cfg(test)]
mod scenarios;

pub use config::{
    ConfigError, Direction, EffectConfig, InteractionVariant, Result, RevealStyle, Trigger,
};
pub use context::{EffectControl, EffectId, MotionContext, MotionEngine};
pub use counter::{counter_value, Counter, CounterFormat};
pub use effect::MotionEffect;
pub use interaction::{
    interaction_style, magnetic_pull, Interactive, PointerEvent, PointerState,
};
pub use marquee::{advance_offset, Marquee, MarqueeConfig, MarqueeDirection};
pub use observer::{Observation, ObservationId, ViewportObserver, VisibilityState};
pub use parallax::{parallax_target, Parallax};
pub use pulse::{pulse_style, Pulse};
pub use resolver::EffectVariant;
pub use ripple::{RippleField, RippleId, RippleParticle, RippleSample, RIPPLE_LIFETIME_MS};
pub use stagger::{StaggerChild, StaggerConfig, StaggerContext, StaggerGroup};

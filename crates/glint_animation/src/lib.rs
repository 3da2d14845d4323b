//! Glint Animation System
//!
//! Easing curves, springs, and frame scheduling shared by every Glint effect.
//!
//! # Features
//!
//! - **Easing Presets**: standard, exponential and spring-like curves, plus cubic-bezier
//! - **Spring Physics**: closed-form critically damped springs, RK4 for everything else
//! - **Interpolation**: blend style snapshots attribute by attribute
//! - **Transitions**: delay/duration/easing over a (from, to) style pair
//! - **Frame Scheduling**: cancellable one-shot frame tasks and self-rescheduling loops

pub mod easing;
pub mod scheduler;
pub mod spring;
pub mod transition;
pub mod values;

pub use easing::Easing;
pub use scheduler::{
    FrameInfo, FrameLoop, FrameScheduler, FrameTaskId, LoopControl, SchedulerHandle,
};
pub use spring::{Spring, SpringConfig};
pub use transition::{Transition, TransitionPhase, TransitionSpec};
pub use values::{Interpolate, StylePair};

//! Glint Core
//!
//! Foundational types shared by the Glint motion crates:
//!
//! - **Geometry**: points, sizes, rects and visibility ratios
//! - **Style Snapshots**: named visual attributes an effect paints each frame
//! - **Broadcast Signals**: subscriber arenas with explicit unsubscribe
//! - **Platform Signals**: the reduced-motion preference and the scroll/viewport position
//!
//! Everything here is single-threaded. Hosts drive the signals from their
//! event loop and effects subscribe through [`Broadcast`].
//!
//! # Example
//!
//! ```rust
//! use glint_core::{ReducedMotion, StaticPreference};
//!
//! let reduced = ReducedMotion::new(StaticPreference(false));
//! let sub = reduced.subscribe(|value| println!("reduced motion: {value}"));
//!
//! reduced.platform_changed(true);
//! assert!(reduced.current());
//!
//! sub.unsubscribe();
//! ```

pub mod error;
pub mod geometry;
pub mod preferences;
pub mod scroll;
pub mod signal;
pub mod style;

pub use error::{MeasureError, MeasureResult};
pub use geometry::{Point, Rect, Size, Vec2};
pub use preferences::{PreferenceSource, ReducedMotion, StaticPreference};
pub use scroll::{ScrollSignal, ScrollSnapshot};
pub use signal::{Broadcast, Subscription, SubscriptionId};
pub use style::{ClipInset, Color, Shadow, StyleProperty, StyleSnapshot, StyleValue};

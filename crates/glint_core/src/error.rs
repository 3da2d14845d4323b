//! Error types for glint_core

use thiserror::Error;

/// Geometry that cannot be used to derive a visual metric.
///
/// These never reach the page. Callers treat the element as "not yet
/// measured" and fall back to the neutral or resting style.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MeasureError {
    /// The element has no area (not laid out yet, or collapsed)
    #[error("element has zero size ({width}x{height})")]
    ZeroSize { width: f32, height: f32 },

    /// A coordinate or extent is NaN or infinite
    #[error("element geometry is not finite")]
    NonFinite,

    /// The viewport itself has no area
    #[error("viewport has zero size")]
    EmptyViewport,
}

/// Result type for measurements
pub type MeasureResult<T> = std::result::Result<T, MeasureError>;

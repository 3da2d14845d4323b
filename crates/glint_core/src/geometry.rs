//! Core geometry types
//!
//! Element bounds are expressed in document coordinates (top-left origin, y
//! grows downward). The viewport is a rect in the same space whose origin is
//! the current scroll position.

use crate::error::{MeasureError, MeasureResult};

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when both extents are finite and strictly positive
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size.height
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            size: self.size,
        }
    }

    /// Check if this rect intersects with another
    pub fn intersects(&self, other: &Rect) -> bool {
        let self_right = self.origin.x + self.size.width;
        let self_bottom = self.origin.y + self.size.height;
        let other_right = other.origin.x + other.size.width;
        let other_bottom = other.origin.y + other.size.height;

        self.origin.x < other_right
            && self_right > other.origin.x
            && self.origin.y < other_bottom
            && self_bottom > other.origin.y
    }

    /// Get the intersection of two rects (if they overlap)
    pub fn intersection(&self, other: &Rect) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.origin.x.max(other.origin.x);
        let y = self.origin.y.max(other.origin.y);
        let right = (self.origin.x + self.size.width).min(other.origin.x + other.size.width);
        let bottom = (self.origin.y + self.size.height).min(other.origin.y + other.size.height);

        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Validate that the rect can be used for derived metrics
    pub fn measured(&self) -> MeasureResult<Rect> {
        if !(self.origin.x.is_finite() && self.origin.y.is_finite()) {
            return Err(MeasureError::NonFinite);
        }
        if !self.size.width.is_finite() || !self.size.height.is_finite() {
            return Err(MeasureError::NonFinite);
        }
        if !self.size.is_measurable() {
            return Err(MeasureError::ZeroSize {
                width: self.size.width,
                height: self.size.height,
            });
        }
        Ok(*self)
    }

    /// Fraction of this rect's area that lies inside `viewport` (0.0 to 1.0)
    ///
    /// Mirrors an intersection observer's `intersectionRatio`.
    pub fn visible_ratio(&self, viewport: &Rect) -> MeasureResult<f32> {
        let element = self.measured()?;
        if !viewport.size.is_measurable() {
            return Err(MeasureError::EmptyViewport);
        }
        let ratio = element
            .intersection(viewport)
            .map(|overlap| overlap.size.area() / element.size.area())
            .unwrap_or(0.0);
        Ok(ratio.clamp(0.0, 1.0))
    }
}

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clamp each component to `[-limit, limit]`
    pub fn clamp_components(self, limit: f32) -> Self {
        let limit = limit.abs();
        Self::new(self.x.clamp(-limit, limit), self.y.clamp(-limit, limit))
    }
}

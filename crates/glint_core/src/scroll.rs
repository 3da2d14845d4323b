//! Scroll and viewport signal
//!
//! One [`ScrollSnapshot`] describes the scroll offset and viewport size at a
//! single instant. Subscribers always receive a whole snapshot, so every
//! effect updated from the same scroll event sees the same numbers.

use crate::geometry::{Point, Rect, Size};
use crate::signal::{Broadcast, Subscription};

/// Scroll position and viewport size at one instant
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub viewport: Size,
}

impl ScrollSnapshot {
    pub fn new(scroll_x: f32, scroll_y: f32, viewport: Size) -> Self {
        Self {
            scroll_x,
            scroll_y,
            viewport,
        }
    }

    /// The visible region in document coordinates
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            self.scroll_x,
            self.scroll_y,
            self.viewport.width,
            self.viewport.height,
        )
    }

    /// Convert a document-space point into viewport space
    pub fn to_viewport(&self, point: Point) -> Point {
        Point::new(point.x - self.scroll_x, point.y - self.scroll_y)
    }
}

/// Process-wide scroll/resize signal
#[derive(Clone)]
pub struct ScrollSignal {
    signal: Broadcast<ScrollSnapshot>,
}

impl ScrollSignal {
    pub fn new(initial: ScrollSnapshot) -> Self {
        Self {
            signal: Broadcast::new(initial),
        }
    }

    pub fn current(&self) -> ScrollSnapshot {
        self.signal.get()
    }

    /// Publish a new scroll/resize sample
    pub fn update(&self, snapshot: ScrollSnapshot) -> bool {
        tracing::trace!(
            "ScrollSignal: scroll=({}, {}) viewport={}x{}",
            snapshot.scroll_x,
            snapshot.scroll_y,
            snapshot.viewport.width,
            snapshot.viewport.height
        );
        self.signal.set(snapshot)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ScrollSnapshot) + 'static,
    {
        self.signal.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.signal.subscriber_count()
    }
}

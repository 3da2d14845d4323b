//! Style snapshots
//!
//! A [`StyleSnapshot`] is the paintable output of an effect: a small, ordered
//! set of named visual attributes. The rendering layer reads one snapshot per
//! element per frame. Effects never paint directly.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// RGBA color (linear space)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Box shadow
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Shadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub spread: f32,
    pub color: Color,
}

impl Shadow {
    pub fn new(offset_y: f32, blur: f32, color: Color) -> Self {
        Self {
            offset_x: 0.0,
            offset_y,
            blur,
            spread: 0.0,
            color,
        }
    }

    /// A shadow that paints nothing but still interpolates cleanly
    pub fn none() -> Self {
        Self::new(0.0, 0.0, Color::TRANSPARENT)
    }
}

/// Inset clip region, each side in percent of the element's extent
///
/// `ClipInset::full()` clips everything away, `ClipInset::empty()` clips nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ClipInset {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl ClipInset {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Named visual attribute
///
/// Declaration order is the canonical order inside a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    Rotate,
    Blur,
    Clip,
    Mask,
    Shadow,
    Glow,
}

impl StyleProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::TranslateX => "translateX",
            StyleProperty::TranslateY => "translateY",
            StyleProperty::Scale => "scale",
            StyleProperty::Rotate => "rotate",
            StyleProperty::Blur => "blur",
            StyleProperty::Clip => "clip",
            StyleProperty::Mask => "mask",
            StyleProperty::Shadow => "shadow",
            StyleProperty::Glow => "glow",
        }
    }
}

/// Value of a visual attribute
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Float(f32),
    Color(Color),
    Shadow(Shadow),
    Clip(ClipInset),
}

impl StyleValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            StyleValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Float(value)
    }
}

impl From<Color> for StyleValue {
    fn from(value: Color) -> Self {
        StyleValue::Color(value)
    }
}

impl From<Shadow> for StyleValue {
    fn from(value: Shadow) -> Self {
        StyleValue::Shadow(value)
    }
}

impl From<ClipInset> for StyleValue {
    fn from(value: ClipInset) -> Self {
        StyleValue::Clip(value)
    }
}

/// A set of visual attributes at one instant
///
/// Entries are kept sorted by [`StyleProperty`], so two snapshots with the
/// same attributes compare equal regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSnapshot {
    entries: SmallVec<[(StyleProperty, StyleValue); 8]>,
}

impl StyleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, property: StyleProperty, value: impl Into<StyleValue>) -> Self {
        self.set(property, value);
        self
    }

    /// Insert or replace an attribute
    pub fn set(&mut self, property: StyleProperty, value: impl Into<StyleValue>) {
        let value = value.into();
        match self.entries.binary_search_by(|(p, _)| p.cmp(&property)) {
            Ok(index) => self.entries[index].1 = value,
            Err(index) => self.entries.insert(index, (property, value)),
        }
    }

    pub fn remove(&mut self, property: StyleProperty) -> Option<StyleValue> {
        self.entries
            .binary_search_by(|(p, _)| p.cmp(&property))
            .ok()
            .map(|index| self.entries.remove(index).1)
    }

    pub fn get(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.entries
            .binary_search_by(|(p, _)| p.cmp(&property))
            .ok()
            .map(|index| &self.entries[index].1)
    }

    pub fn float(&self, property: StyleProperty) -> Option<f32> {
        self.get(property).and_then(StyleValue::as_float)
    }

    pub fn contains(&self, property: StyleProperty) -> bool {
        self.get(property).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StyleProperty, StyleValue)> {
        self.entries.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = StyleProperty> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn opacity(&self) -> Option<f32> {
        self.float(StyleProperty::Opacity)
    }

    pub fn translate_x(&self) -> Option<f32> {
        self.float(StyleProperty::TranslateX)
    }

    pub fn translate_y(&self) -> Option<f32> {
        self.float(StyleProperty::TranslateY)
    }

    pub fn scale(&self) -> Option<f32> {
        self.float(StyleProperty::Scale)
    }

    pub fn blur(&self) -> Option<f32> {
        self.float(StyleProperty::Blur)
    }
}

impl FromIterator<(StyleProperty, StyleValue)> for StyleSnapshot {
    fn from_iter<I: IntoIterator<Item = (StyleProperty, StyleValue)>>(iter: I) -> Self {
        let mut snapshot = StyleSnapshot::new();
        for (property, value) in iter {
            snapshot.set(property, value);
        }
        snapshot
    }
}

impl Serialize for StyleSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (property, value) in &self.entries {
            map.serialize_entry(property.as_str(), value)?;
        }
        map.end()
    }
}

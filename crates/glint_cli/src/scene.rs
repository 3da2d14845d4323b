//! Scene file handling
//!
//! A scene is a TOML file describing a page: the viewport, the elements on
//! it with their effect configuration, and a timeline of host events
//! (scrolls, pointer input, preference changes) keyed by frame number.
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[elements]]
//! name = "hero"
//! kind = "fade"
//! rect = { x = 0, y = 900, width = 600, height = 300 }
//! effect = { direction = "up", distance = 16, duration = 0.3 }
//!
//! [[timeline]]
//! frame = 10
//! action = "scroll"
//! y = 600
//! ```

use anyhow::{Context, Result};
use glint_core::{Rect, ScrollSnapshot, Size};
use glint_motion::{EffectConfig, PointerEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A complete scene file
#[derive(Debug, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Initial reduced-motion preference
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl ViewportConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Element bounds in document coordinates
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct RectConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<RectConfig> for Rect {
    fn from(rect: RectConfig) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Which effect wraps an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Fade,
    Reveal,
    Blur,
    Stagger,
    Parallax,
    Counter,
    Interactive,
    Marquee,
    Pulse,
}

/// One element on the page
#[derive(Debug, Deserialize, Serialize)]
pub struct ElementConfig {
    pub name: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub rect: RectConfig,
    #[serde(default)]
    pub effect: EffectConfig,

    /// Blur radius for `blur`
    #[serde(default)]
    pub blur: Option<f32>,
    /// Child count for `stagger`
    #[serde(default = "default_children")]
    pub children: usize,
    /// Delay between children for `stagger`, in milliseconds
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: f64,
    /// Final value for `counter`
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub decimals: usize,
    /// Doubled content width for `marquee`; defaults to twice the rect width
    #[serde(default)]
    pub content_width: Option<f32>,
}

fn default_children() -> usize {
    3
}

fn default_stagger_ms() -> f64 {
    100.0
}

impl ElementConfig {
    /// Whether the element needs intersection reports
    pub fn is_observed(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Fade
                | ElementKind::Reveal
                | ElementKind::Blur
                | ElementKind::Stagger
                | ElementKind::Counter
        )
    }
}

/// A host event applied at the start of `frame`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimelineEvent {
    pub frame: u64,
    #[serde(flatten)]
    pub action: TimelineAction,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TimelineAction {
    Scroll {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    Resize {
        width: f32,
        height: f32,
    },
    Pointer {
        element: String,
        event: PointerKind,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    ReducedMotion {
        enabled: bool,
    },
    ForceFinal,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Enter,
    Leave,
    Down,
    Up,
    Move,
}

impl PointerKind {
    /// Event with element-local coordinates
    pub fn event(self, x: f32, y: f32) -> PointerEvent {
        match self {
            PointerKind::Enter => PointerEvent::Enter,
            PointerKind::Leave => PointerEvent::Leave,
            PointerKind::Down => PointerEvent::Down { x, y },
            PointerKind::Up => PointerEvent::Up,
            PointerKind::Move => PointerEvent::Move { x, y },
        }
    }
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Parse, sanitize and validate a scene
    pub fn parse(content: &str) -> Result<Self> {
        let mut scene: Scene = toml::from_str(content).context("Failed to parse scene")?;
        for element in &mut scene.elements {
            element.effect = element.effect.sanitized();
        }
        scene.timeline.sort_by_key(|event| event.frame);
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        let size = self.viewport.size();
        if !size.is_measurable() {
            anyhow::bail!(
                "Viewport must have a positive size, got {}x{}",
                self.viewport.width,
                self.viewport.height
            );
        }

        let mut names = HashSet::new();
        for element in &self.elements {
            if !names.insert(element.name.as_str()) {
                anyhow::bail!("Duplicate element name '{}'", element.name);
            }
        }

        for event in &self.timeline {
            if let TimelineAction::Pointer { element, .. } = &event.action {
                if !names.contains(element.as_str()) {
                    anyhow::bail!(
                        "Timeline frame {} targets unknown element '{}'",
                        event.frame,
                        element
                    );
                }
            }
        }
        Ok(())
    }

    pub fn initial_scroll(&self) -> ScrollSnapshot {
        ScrollSnapshot::new(0.0, 0.0, self.viewport.size())
    }

    pub fn events_at(&self, frame: u64) -> impl Iterator<Item = &TimelineEvent> {
        self.timeline.iter().filter(move |event| event.frame == frame)
    }

    pub fn last_event_frame(&self) -> Option<u64> {
        self.timeline.last().map(|event| event.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_motion::{Direction, Trigger};

    const LANDING: &str = include_str!("../scenes/landing.toml");

    #[test]
    fn test_parse_landing_scene() {
        let scene = Scene::parse(LANDING).unwrap();
        assert_eq!(scene.viewport.width, 1280.0);
        assert!(scene.elements.len() >= 5);

        let hero = &scene.elements[0];
        assert_eq!(hero.kind, ElementKind::Fade);
        assert_eq!(hero.effect.direction, Direction::Up);
        assert_eq!(hero.effect.distance, 16.0);
        assert!(hero.is_observed());

        let frames: Vec<u64> = scene.timeline.iter().map(|e| e.frame).collect();
        let mut sorted = frames.clone();
        sorted.sort();
        assert_eq!(frames, sorted);
    }

    #[test]
    fn test_defaults_and_sanitizing() {
        let scene = Scene::parse(
            r#"
            [[elements]]
            name = "card"
            kind = "reveal"
            rect = { width = 100, height = 100 }
            effect = { duration = -2.0, trigger = "wiggle" }
            "#,
        )
        .unwrap();

        assert_eq!(scene.viewport.height, 800.0);
        let card = &scene.elements[0];
        assert_eq!(card.effect.duration, 0.0);
        assert_eq!(card.effect.trigger, Trigger::Scroll);
        assert_eq!(card.children, 3);
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_targets() {
        let duplicate = r#"
            [[elements]]
            name = "a"
            kind = "pulse"

            [[elements]]
            name = "a"
            kind = "fade"
        "#;
        assert!(Scene::parse(duplicate).is_err());

        let unknown = r#"
            [[elements]]
            name = "a"
            kind = "interactive"

            [[timeline]]
            frame = 1
            action = "pointer"
            element = "b"
            event = "enter"
        "#;
        assert!(Scene::parse(unknown).is_err());
    }

    #[test]
    fn test_timeline_actions() {
        let scene = Scene::parse(
            r#"
            [[timeline]]
            frame = 4
            action = "reduced_motion"
            enabled = true

            [[timeline]]
            frame = 2
            action = "scroll"
            y = 300
            "#,
        )
        .unwrap();

        assert!(matches!(
            scene.timeline[0].action,
            TimelineAction::Scroll { y, .. } if y == 300.0
        ));
        assert_eq!(scene.events_at(4).count(), 1);
        assert_eq!(scene.last_event_frame(), Some(4));
    }
}

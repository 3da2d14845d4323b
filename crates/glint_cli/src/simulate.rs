//! Headless scene simulation
//!
//! Mounts every element of a [`Scene`] on a fresh [`MotionEngine`] and plays
//! the timeline at a fixed frame rate, collecting each element's paintable
//! style after every frame.

use crate::scene::{ElementConfig, ElementKind, Scene, TimelineAction};
use glint_core::{Rect, ScrollSnapshot, Size, StaticPreference, StyleSnapshot, StyleValue};
use glint_motion::resolver::DEFAULT_BLUR;
use glint_motion::{
    Counter, CounterFormat, EffectVariant, Interactive, Marquee, MotionEffect, MotionEngine,
    ObservationId, Parallax, PointerEvent, Pulse, StaggerChild, StaggerConfig, StaggerGroup,
};
use serde::Serialize;
use tracing::{debug, info};

/// The effect mounted for one element
enum MountedEffect {
    Effect(MotionEffect),
    Stagger {
        group: StaggerGroup,
        children: Vec<StaggerChild>,
    },
    Parallax(Parallax),
    Counter(Counter),
    Interactive(Interactive),
    Marquee(Marquee),
    Pulse(Pulse),
}

impl MountedEffect {
    fn mount(engine: &MotionEngine, element: &ElementConfig) -> Self {
        let context = engine.context();
        let config = element.effect;
        let rect = Rect::from(element.rect);

        match element.kind {
            ElementKind::Fade => MountedEffect::Effect(MotionEffect::fade_in(&context, config)),
            ElementKind::Reveal => MountedEffect::Effect(MotionEffect::reveal(&context, config)),
            ElementKind::Blur => MountedEffect::Effect(MotionEffect::new(
                &context,
                EffectVariant::blur(element.blur.unwrap_or(DEFAULT_BLUR)),
                config,
            )),
            ElementKind::Stagger => {
                let group = StaggerGroup::new(
                    &context,
                    EffectVariant::fade(&config),
                    config,
                    StaggerConfig::new(element.stagger_ms),
                );
                let children = group.children(element.children);
                MountedEffect::Stagger { group, children }
            }
            ElementKind::Parallax => {
                let parallax = Parallax::new(&context, config);
                parallax.set_bounds(rect);
                MountedEffect::Parallax(parallax)
            }
            ElementKind::Counter => {
                let format = CounterFormat::new()
                    .decimals(element.decimals)
                    .prefix(element.prefix.as_str())
                    .suffix(element.suffix.as_str())
                    .separator(',');
                MountedEffect::Counter(Counter::new(&context, element.target, config).with_format(format))
            }
            ElementKind::Interactive => {
                let interactive = Interactive::new(&context, config);
                interactive.set_size(Size::new(rect.width(), rect.height()));
                MountedEffect::Interactive(interactive)
            }
            ElementKind::Marquee => {
                let width = element.content_width.unwrap_or(rect.width() * 2.0);
                MountedEffect::Marquee(Marquee::from_effect_config(&context, &config, width))
            }
            ElementKind::Pulse => MountedEffect::Pulse(Pulse::new(&context, config)),
        }
    }

    fn observation_id(&self) -> Option<ObservationId> {
        match self {
            MountedEffect::Effect(effect) => effect.observation_id(),
            MountedEffect::Stagger { group, .. } => group.observation_id(),
            MountedEffect::Counter(counter) => counter.observation_id(),
            _ => None,
        }
    }

    /// Returns false when the effect ignores pointer input
    fn pointer(&self, event: PointerEvent) -> bool {
        match self {
            MountedEffect::Effect(effect) => effect.pointer(event),
            MountedEffect::Stagger { group, .. } => group.pointer(event),
            MountedEffect::Interactive(interactive) => interactive.pointer(event),
            MountedEffect::Marquee(marquee) => marquee.pointer(event),
            _ => return false,
        }
        true
    }
}

struct SceneElement {
    name: String,
    rect: Rect,
    effect: MountedEffect,
}

impl SceneElement {
    fn rows(&self, frame: u64, time_ms: f64) -> Vec<ElementFrame> {
        let row = |element: String, style: Option<StyleSnapshot>| ElementFrame {
            frame,
            time_ms,
            element,
            style,
            value: None,
            ripples: 0,
        };

        match &self.effect {
            MountedEffect::Effect(effect) => vec![row(self.name.clone(), Some(effect.style()))],
            MountedEffect::Stagger { children, .. } => children
                .iter()
                .map(|child| row(format!("{}[{}]", self.name, child.index()), Some(child.style())))
                .collect(),
            MountedEffect::Parallax(parallax) => vec![row(self.name.clone(), Some(parallax.style()))],
            MountedEffect::Counter(counter) => vec![ElementFrame {
                value: Some(counter.formatted()),
                ..row(self.name.clone(), None)
            }],
            MountedEffect::Interactive(interactive) => vec![ElementFrame {
                ripples: interactive.ripple_count(),
                ..row(self.name.clone(), Some(interactive.style()))
            }],
            MountedEffect::Marquee(marquee) => vec![row(self.name.clone(), Some(marquee.style()))],
            MountedEffect::Pulse(pulse) => vec![row(self.name.clone(), Some(pulse.style()))],
        }
    }
}

/// One element's output for one frame
#[derive(Clone, Debug, Serialize)]
pub struct ElementFrame {
    pub frame: u64,
    pub time_ms: f64,
    pub element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleSnapshot>,
    /// Formatted counter text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub ripples: usize,
}

fn is_zero(count: &usize) -> bool {
    *count == 0
}

impl ElementFrame {
    /// Single-line text rendering
    pub fn to_text(&self) -> String {
        let mut line = format!("{:>5} {:>9.1}ms  {:<14}", self.frame, self.time_ms, self.element);
        if let Some(style) = &self.style {
            line.push_str(&format_style(style));
        }
        if let Some(value) = &self.value {
            line.push_str(&format!("value={}", value));
        }
        if self.ripples > 0 {
            line.push_str(&format!(" ripples={}", self.ripples));
        }
        line
    }
}

pub fn format_style(style: &StyleSnapshot) -> String {
    style
        .iter()
        .map(|(property, value)| match value {
            StyleValue::Float(v) => format!("{}={:.3}", property.as_str(), v),
            other => format!(
                "{}={}",
                property.as_str(),
                serde_json::to_string(other).unwrap_or_default()
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Engine state after a run
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SimulationSummary {
    pub frames: u64,
    pub pending_frames: usize,
    pub active_observations: usize,
    pub registered_effects: usize,
}

/// A scene mounted on an engine, advanced one frame at a time
pub struct Simulation<'a> {
    scene: &'a Scene,
    engine: MotionEngine,
    elements: Vec<SceneElement>,
    viewport: Size,
    scroll: (f32, f32),
    frame: u64,
    frame_ms: f64,
}

impl<'a> Simulation<'a> {
    /// Mount the scene; `reduced_motion` overrides the scene's own preference
    pub fn new(scene: &'a Scene, fps: f64, reduced_motion: Option<bool>) -> Self {
        let reduced = reduced_motion.unwrap_or(scene.reduced_motion);
        let engine = MotionEngine::new(StaticPreference(reduced));
        engine.set_scroll(scene.initial_scroll());

        let elements = scene
            .elements
            .iter()
            .map(|element| {
                debug!("Mounting {} as {:?}", element.name, element.kind);
                SceneElement {
                    name: element.name.clone(),
                    rect: Rect::from(element.rect),
                    effect: MountedEffect::mount(&engine, element),
                }
            })
            .collect();

        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        let simulation = Self {
            scene,
            engine,
            elements,
            viewport: scene.viewport.size(),
            scroll: (0.0, 0.0),
            frame: 0,
            frame_ms: 1000.0 / fps,
        };
        simulation.report_bounds();
        simulation
    }

    pub fn engine(&self) -> &MotionEngine {
        &self.engine
    }

    /// Apply this frame's timeline events, tick, and collect styles
    pub fn step(&mut self) -> Vec<ElementFrame> {
        let frame = self.frame;
        let now = frame as f64 * self.frame_ms;

        let events: Vec<TimelineAction> = self
            .scene
            .events_at(frame)
            .map(|event| event.action.clone())
            .collect();
        for action in events {
            self.apply(frame, action);
        }

        let ran = self.engine.tick(now);
        tracing::trace!("Frame {} at {:.1}ms ran {} tasks", frame, now, ran);

        self.frame += 1;
        self.elements
            .iter()
            .flat_map(|element| element.rows(frame, now))
            .collect()
    }

    /// Run `frames` frames, handing each frame's rows to `on_frame`
    pub fn run(&mut self, frames: u64, mut on_frame: impl FnMut(&[ElementFrame])) -> SimulationSummary {
        for _ in 0..frames {
            let rows = self.step();
            on_frame(&rows);
        }
        self.summary()
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            frames: self.frame,
            pending_frames: self.engine.pending_frames(),
            active_observations: self.engine.active_observations(),
            registered_effects: self.engine.registered_effects(),
        }
    }

    fn apply(&mut self, frame: u64, action: TimelineAction) {
        match action {
            TimelineAction::Scroll { x, y } => {
                self.scroll = (x, y);
                self.push_scroll();
            }
            TimelineAction::Resize { width, height } => {
                self.viewport = Size::new(width, height);
                self.push_scroll();
            }
            TimelineAction::Pointer {
                element,
                event,
                x,
                y,
            } => {
                let event = event.event(x, y);
                match self.elements.iter().find(|e| e.name == element) {
                    Some(target) if target.effect.pointer(event) => {
                        debug!("Frame {}: {:?} on {}", frame, event, element);
                    }
                    Some(_) => debug!("Frame {}: {} ignores pointer input", frame, element),
                    None => debug!("Frame {}: no element named {}", frame, element),
                }
            }
            TimelineAction::ReducedMotion { enabled } => {
                info!("Frame {}: reduced motion {}", frame, if enabled { "on" } else { "off" });
                self.engine.set_reduced_motion(enabled);
            }
            TimelineAction::ForceFinal => {
                info!("Frame {}: forcing final state", frame);
                self.engine.force_final_state_all();
            }
            TimelineAction::Cancel => {
                info!("Frame {}: cancelling all effects", frame);
                self.engine.cancel_all();
            }
        }
    }

    fn push_scroll(&self) {
        let (x, y) = self.scroll;
        self.engine.set_scroll(ScrollSnapshot::new(x, y, self.viewport));
        self.report_bounds();
    }

    /// Stand-in for the host's intersection observer
    fn report_bounds(&self) {
        for element in &self.elements {
            if let Some(id) = element.effect.observation_id() {
                self.engine.report_bounds(id, element.rect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = include_str!("../scenes/landing.toml");

    fn find<'r>(rows: &'r [ElementFrame], name: &str) -> &'r ElementFrame {
        rows.iter().find(|row| row.element == name).unwrap()
    }

    #[test]
    fn test_landing_scene_plays_through() {
        let scene = Scene::parse(LANDING).unwrap();
        let mut simulation = Simulation::new(&scene, 60.0, None);

        let mut hero_at_19 = None;
        let mut last = Vec::new();
        let summary = simulation.run(260, |rows| {
            if rows[0].frame == 19 {
                hero_at_19 = find(rows, "hero").style.clone();
            }
            last = rows.to_vec();
        });

        // Not yet scrolled into view
        assert_eq!(hero_at_19.unwrap().opacity(), Some(0.0));

        let hero = find(&last, "hero").style.clone().unwrap();
        assert_eq!(hero.opacity(), Some(1.0));
        assert_eq!(hero.translate_y(), Some(0.0));
        assert_eq!(find(&last, "stats").value.as_deref(), Some("1,000+"));
        assert_eq!(find(&last, "features[3]").style.as_ref().unwrap().opacity(), Some(1.0));

        // Reduced motion at frame 140 settles every continuous effect
        assert_eq!(summary.frames, 260);
        assert_eq!(summary.pending_frames, 0);
        assert_eq!(summary.registered_effects, scene.elements.len());
    }

    #[test]
    fn test_reduced_motion_override_settles_on_first_frame() {
        let scene = Scene::parse(LANDING).unwrap();
        let mut simulation = Simulation::new(&scene, 60.0, Some(true));

        let rows = simulation.step();
        assert_eq!(find(&rows, "hero").style.as_ref().unwrap().opacity(), Some(1.0));
        assert_eq!(find(&rows, "stats").value.as_deref(), Some("1,000+"));
        assert_eq!(find(&rows, "logos").style.as_ref().unwrap().translate_x(), Some(0.0));
        assert_eq!(simulation.engine().pending_frames(), 0);
    }

    #[test]
    fn test_frame_timing() {
        let scene = Scene::parse(LANDING).unwrap();
        let mut simulation = Simulation::new(&scene, 50.0, None);
        let mut rows = Vec::new();
        for _ in 0..11 {
            rows = simulation.step();
        }
        assert_eq!(rows[0].frame, 10);
        assert_eq!(rows[0].time_ms, 200.0);
    }

    #[test]
    fn test_text_and_json_rows() {
        let row = ElementFrame {
            frame: 3,
            time_ms: 48.0,
            element: "hero".to_string(),
            style: Some(StyleSnapshot::new().with(glint_core::StyleProperty::Opacity, 0.5)),
            value: None,
            ripples: 0,
        };
        assert!(row.to_text().contains("opacity=0.500"));

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["style"]["opacity"], 0.5);
        assert!(json.get("value").is_none());
        assert!(json.get("ripples").is_none());
    }
}

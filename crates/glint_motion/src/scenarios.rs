//! End-to-end behavior of the engine with several effects mounted
//!
//! Every scenario drives time explicitly through `MotionEngine::tick`.

use crate::config::{Direction, EffectConfig, InteractionVariant, RevealStyle, Trigger};
use crate::context::MotionEngine;
use crate::counter::Counter;
use crate::effect::MotionEffect;
use crate::interaction::{Interactive, PointerEvent};
use crate::marquee::{Marquee, MarqueeConfig};
use crate::observer::VisibilityState;
use crate::parallax::Parallax;
use crate::pulse::Pulse;
use crate::resolver::{EffectVariant, DEFAULT_BLUR};
use crate::ripple::RIPPLE_LIFETIME_MS;
use crate::stagger::{StaggerConfig, StaggerGroup};
use glint_core::{Rect, ScrollSnapshot, Size, StaticPreference, StyleProperty, StyleSnapshot};

const VIEWPORT: Size = Size::new(800.0, 600.0);

fn engine(reduced: bool) -> MotionEngine {
    let engine = MotionEngine::new(StaticPreference(reduced));
    engine.set_scroll(ScrollSnapshot::new(0.0, 0.0, VIEWPORT));
    engine
}

fn scroll_to(engine: &MotionEngine, y: f32) {
    engine.set_scroll(ScrollSnapshot::new(0.0, y, VIEWPORT));
}

/// Tick every `step` ms from just after the current time through `until`
fn run_until(engine: &MotionEngine, until: f64, step: f64) {
    let mut now = engine.now();
    while now < until {
        now = (now + step).min(until);
        engine.tick(now);
    }
}

fn all_variants() -> Vec<EffectVariant> {
    let mut variants = vec![
        EffectVariant::Fade {
            direction: Direction::Up,
            distance: 16.0,
        },
        EffectVariant::Fade {
            direction: Direction::None,
            distance: 16.0,
        },
        EffectVariant::blur(DEFAULT_BLUR),
    ];
    for style in [
        RevealStyle::Slide,
        RevealStyle::Fade,
        RevealStyle::Scale,
        RevealStyle::Clip,
        RevealStyle::Mask,
    ] {
        variants.push(EffectVariant::Reveal {
            style,
            direction: Direction::Left,
        });
    }
    variants
}

#[test]
fn test_fade_in_end_to_end() {
    let engine = engine(false);
    let config = EffectConfig::new()
        .direction(Direction::Up)
        .distance(16.0)
        .duration(0.3)
        .delay(0.0)
        .once(true);
    let fade = MotionEffect::fade_in(&engine.context(), config);
    let id = fade.observation_id().unwrap();
    let bounds = Rect::new(0.0, 1000.0, 400.0, 200.0);

    let hidden = StyleSnapshot::new()
        .with(StyleProperty::Opacity, 0.0)
        .with(StyleProperty::TranslateY, 16.0);
    let shown = StyleSnapshot::new()
        .with(StyleProperty::Opacity, 1.0)
        .with(StyleProperty::TranslateY, 0.0);

    engine.report_bounds(id, bounds);
    run_until(&engine, 100.0, 20.0);
    assert_eq!(fade.style(), hidden);
    assert_eq!(engine.pending_frames(), 0);

    // Half the element enters the viewport: past the 20% threshold
    scroll_to(&engine, 500.0);
    assert_eq!(engine.report_bounds(id, bounds), Some(VisibilityState::Visible));
    let crossed_at = engine.now();

    run_until(&engine, crossed_at + 200.0, 20.0);
    let mid = fade.style();
    assert!(mid.opacity().unwrap() > 0.0 && mid.opacity().unwrap() < 1.0);

    run_until(&engine, crossed_at + 300.0, 20.0);
    assert_eq!(fade.style(), shown);

    scroll_to(&engine, 0.0);
    engine.report_bounds(id, bounds);
    run_until(&engine, crossed_at + 1000.0, 20.0);
    assert_eq!(fade.style(), shown);
    assert_eq!(fade.visibility(), VisibilityState::Visible);
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_once_never_rehides() {
    let engine = engine(false);
    let reveal = MotionEffect::reveal(
        &engine.context(),
        EffectConfig::new()
            .reveal_style(RevealStyle::Scale)
            .duration(0.2)
            .once(true),
    );
    let id = reveal.observation_id().unwrap();
    let to = reveal.style_pair().to;

    engine.report_intersection(id, 1.0);
    run_until(&engine, 400.0, 16.0);
    assert_eq!(reveal.style(), to);

    for ratio in [0.0, 0.5, 0.0, 1.0, 0.0] {
        engine.report_intersection(id, ratio);
        run_until(&engine, engine.now() + 300.0, 16.0);
        assert_eq!(reveal.style(), to);
        assert!(!reveal.is_animating());
    }
}

#[test]
fn test_repeat_tracks_every_crossing() {
    let engine = engine(false);
    let fade = MotionEffect::fade_in(
        &engine.context(),
        EffectConfig::new().duration(0.1).once(false),
    );
    let id = fade.observation_id().unwrap();
    let pair = fade.style_pair();

    for round in 0..3 {
        assert_eq!(
            engine.report_intersection(id, 0.9),
            Some(VisibilityState::Visible),
            "round {}",
            round
        );
        run_until(&engine, engine.now() + 200.0, 16.0);
        assert_eq!(fade.style(), pair.to);

        assert_eq!(
            engine.report_intersection(id, 0.05),
            Some(VisibilityState::Exited)
        );
        run_until(&engine, engine.now() + 200.0, 16.0);
        assert_eq!(fade.style(), pair.from);
    }
}

#[test]
fn test_stagger_waits_for_container_then_cascades() {
    let engine = engine(false);
    let group = StaggerGroup::fade_in(
        &engine.context(),
        EffectConfig::new().duration(0.2).direction(Direction::None),
        StaggerConfig::new(100.0).base_delay(50.0),
    );
    let children = group.children(5);
    let id = group.observation_id().unwrap();

    for (i, child) in children.iter().enumerate() {
        assert_eq!(child.index(), i);
        assert_eq!(child.delay_ms(), 50.0 + 100.0 * i as f64);
    }

    // Nothing moves while the container is out of view
    run_until(&engine, 1000.0, 10.0);
    assert!(children.iter().all(|c| c.style().opacity() == Some(0.0)));
    assert_eq!(engine.pending_frames(), 0);

    engine.report_intersection(id, 1.0);
    let revealed_at = engine.now();
    assert_eq!(group.revealed_at(), Some(revealed_at));

    let mut first_move = vec![None; children.len()];
    let mut now = revealed_at;
    while now < revealed_at + 1000.0 {
        now += 10.0;
        engine.tick(now);
        for (i, child) in children.iter().enumerate() {
            if first_move[i].is_none() && child.style().opacity().unwrap() > 0.0 {
                first_move[i] = Some(now);
            }
        }
    }

    for (i, moved) in first_move.iter().enumerate() {
        let moved = moved.expect("every child animates");
        let starts_at = revealed_at + children[i].delay_ms();
        assert!(moved > starts_at, "child {} moved before its delay", i);
        assert!(moved <= starts_at + 10.0);
    }
    assert!(children.iter().all(|c| c.style().opacity() == Some(1.0)));
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_stagger_late_child_after_reduced_motion_turns_off() {
    let engine = engine(true);
    let group = StaggerGroup::fade_in(
        &engine.context(),
        EffectConfig::new().duration(0.2).direction(Direction::None),
        StaggerConfig::new(100.0),
    );
    let first = group.child();
    engine.report_intersection(group.observation_id().unwrap(), 1.0);
    assert_eq!(first.style().opacity(), Some(1.0));
    assert!(group.revealed_at().is_some());

    engine.set_reduced_motion(false);
    assert_eq!(first.style().opacity(), Some(1.0));

    // The container fired once while reduced; the newcomer must still show up
    let late = group.child();
    run_until(&engine, 5000.0, 16.0);
    assert_eq!(group.visibility(), VisibilityState::Visible);
    assert_eq!(late.style().opacity(), Some(1.0));
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_stagger_trigger_met_while_reduced_sets_reveal_time() {
    let engine = engine(true);
    let group = StaggerGroup::fade_in(
        &engine.context(),
        EffectConfig::new()
            .trigger(Trigger::Always)
            .duration(0.2)
            .direction(Direction::None),
        StaggerConfig::new(100.0),
    );
    engine.set_reduced_motion(false);
    assert!(group.revealed_at().is_some());

    let late = group.child();
    run_until(&engine, 2000.0, 16.0);
    assert_eq!(late.style().opacity(), Some(1.0));
}

#[test]
fn test_counter_lands_exactly_and_stops() {
    let engine = engine(false);
    let counter = Counter::new(&engine.context(), 1000.0, EffectConfig::new().duration(2.0));
    let id = counter.observation_id().unwrap();

    engine.tick(100.0);
    assert_eq!(counter.display_value(), 0.0);
    engine.report_intersection(id, 1.0);
    assert!(counter.is_running());
    let started_at = engine.now();

    let mut last = 0.0;
    let mut now = started_at;
    while now < started_at + 2500.0 {
        now += 16.0;
        engine.tick(now);
        let value = counter.display_value();
        assert!(value >= last && value <= 1000.0);
        if now - started_at >= 2000.0 {
            assert_eq!(value, 1000.0);
        }
        last = value;
    }

    assert_eq!(engine.pending_frames(), 0);
    assert_eq!(engine.tick(10_000.0), 0);
    assert_eq!(counter.display_value(), 1000.0);

    // Second visibility does not restart a one-shot counter
    engine.report_intersection(id, 0.0);
    engine.report_intersection(id, 1.0);
    assert!(!counter.is_running());
}

#[test]
fn test_parallax_bypassed_under_reduced_motion() {
    let engine = engine(true);
    let parallax = Parallax::new(&engine.context(), EffectConfig::new().speed(0.8));
    parallax.set_bounds(Rect::new(0.0, 900.0, 300.0, 300.0));

    for (i, y) in [0.0, 250.0, 900.0, 1400.0, 80.0].into_iter().enumerate() {
        scroll_to(&engine, y);
        engine.tick(16.0 * (i + 1) as f64);
        assert_eq!(parallax.offset(), 0.0);
        assert_eq!(parallax.style().translate_y(), Some(0.0));
        assert!(!parallax.has_spring());
    }
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_ripples_stay_bounded() {
    let engine = engine(false);
    let button = Interactive::new(
        &engine.context(),
        EffectConfig::new().variant(InteractionVariant::Ripple),
    );
    button.set_size(Size::new(120.0, 40.0));
    button.pointer(PointerEvent::Enter);

    let mut spawned_at = Vec::new();
    for i in 0..50 {
        let now = 16.0 * i as f64;
        engine.tick(now);
        button.pointer(PointerEvent::Down { x: 60.0, y: 20.0 });
        button.pointer(PointerEvent::Up);
        spawned_at.push(now);

        let alive = spawned_at
            .iter()
            .filter(|&&t| now - t < RIPPLE_LIFETIME_MS)
            .count();
        assert_eq!(button.ripple_count(), alive);
        assert!(button.ripple_count() <= 38);
    }

    run_until(&engine, 3000.0, 16.0);
    assert_eq!(button.ripple_count(), 0);
    assert!(button.ripples().is_empty());
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_marquee_wraps_and_resumes_in_place() {
    let engine = engine(false);
    let marquee = Marquee::new(&engine.context(), MarqueeConfig::new(1.0), 100.0);

    let mut now = 0.0;
    let mut tick = |engine: &MotionEngine| {
        now += 16.0;
        engine.tick(now);
    };

    for _ in 0..49 {
        tick(&engine);
    }
    assert_eq!(marquee.offset(), 49.0);
    tick(&engine);
    assert_eq!(marquee.offset(), 0.0);

    for _ in 0..7 {
        tick(&engine);
    }
    assert_eq!(marquee.offset(), 7.0);

    marquee.pointer(PointerEvent::Enter);
    assert!(!marquee.is_running());
    assert_eq!(engine.pending_frames(), 0);
    for _ in 0..10 {
        tick(&engine);
    }
    assert_eq!(marquee.offset(), 7.0);

    marquee.pointer(PointerEvent::Leave);
    assert_eq!(marquee.offset(), 7.0);
    tick(&engine);
    assert_eq!(marquee.offset(), 8.0);

    // Removal with a frame pending cancels it
    assert_eq!(engine.pending_frames(), 1);
    marquee.unmount();
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_reduced_motion_paints_final_state_everywhere() {
    let engine = engine(true);
    let ctx = engine.context();

    for variant in all_variants() {
        for trigger in [Trigger::Scroll, Trigger::Hover, Trigger::Always] {
            let effect = MotionEffect::new(
                &ctx,
                variant,
                EffectConfig::new().trigger(trigger).duration(0.5).delay(0.2),
            );
            let to = variant.resolve(trigger, false).to;
            assert_eq!(effect.style(), to, "{:?} / {:?} at mount", variant, trigger);

            if let Some(id) = effect.observation_id() {
                engine.report_intersection(id, 1.0);
                engine.report_intersection(id, 0.0);
            }
            effect.pointer(PointerEvent::Enter);
            effect.pointer(PointerEvent::Leave);
            engine.tick(engine.now() + 16.0);

            assert_eq!(effect.style(), to, "{:?} / {:?} after input", variant, trigger);
            assert_eq!(engine.pending_frames(), 0);
        }
    }

    let group = StaggerGroup::fade_in(&ctx, EffectConfig::new(), StaggerConfig::new(100.0));
    let kids = group.children(3);
    assert!(kids.iter().all(|kid| kid.style().opacity() == Some(1.0)));

    let counter = Counter::new(&ctx, 1000.0, EffectConfig::new());
    assert_eq!(counter.display_value(), 1000.0);

    let pulse = Pulse::new(&ctx, EffectConfig::new());
    let marquee = Marquee::new(&ctx, MarqueeConfig::new(2.0), 400.0);
    engine.tick(engine.now() + 16.0);
    assert_eq!(pulse.style().scale(), Some(1.0));
    assert_eq!(marquee.translate_x(), 0.0);
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_instance_override_beats_global_flag() {
    let engine = engine(true);
    let hover = MotionEffect::fade_in(
        &engine.context(),
        EffectConfig::new()
            .trigger(Trigger::Hover)
            .direction(Direction::None)
            .reduced_motion(false),
    );
    assert_eq!(hover.style().opacity(), Some(0.0));
    assert!(!hover.is_reduced_motion());
    assert_eq!(engine.reduced_motion_subscribers(), 0);

    engine.set_reduced_motion(false);
    engine.set_reduced_motion(true);
    assert_eq!(hover.style().opacity(), Some(0.0));

    let engine = self::engine(false);
    let fade = MotionEffect::fade_in(&engine.context(), EffectConfig::new().reduced_motion(true));
    assert!(fade.is_reduced_motion());
    assert_eq!(fade.style(), fade.style_pair().to);
}

#[test]
fn test_reduced_motion_change_applies_live() {
    let engine = engine(false);
    let ctx = engine.context();
    let config = EffectConfig::new().duration(0.3).direction(Direction::None);

    let waiting = MotionEffect::fade_in(&ctx, config);
    let shown = MotionEffect::fade_in(&ctx, config);
    engine.report_intersection(shown.observation_id().unwrap(), 1.0);
    engine.tick(100.0);
    assert!(shown.is_animating());

    engine.set_reduced_motion(true);
    assert_eq!(waiting.style().opacity(), Some(1.0));
    assert_eq!(shown.style().opacity(), Some(1.0));
    assert_eq!(engine.pending_frames(), 0);

    engine.set_reduced_motion(false);
    assert_eq!(waiting.style().opacity(), Some(0.0));
    assert_eq!(shown.style().opacity(), Some(1.0));

    // The untriggered one still animates normally afterwards
    engine.report_intersection(waiting.observation_id().unwrap(), 1.0);
    assert!(waiting.is_animating());
}

#[test]
fn test_page_level_force_final_state() {
    let engine = engine(false);
    let ctx = engine.context();

    let fade = MotionEffect::fade_in(&ctx, EffectConfig::new().duration(1.0));
    engine.report_intersection(fade.observation_id().unwrap(), 1.0);
    let counter = Counter::new(
        &ctx,
        250.0,
        EffectConfig::new().trigger(Trigger::Always).duration(3.0),
    );
    let marquee = Marquee::new(&ctx, MarqueeConfig::new(3.0), 300.0);
    let pulse = Pulse::new(&ctx, EffectConfig::new());

    run_until(&engine, 200.0, 16.0);
    assert!(engine.pending_frames() > 0);

    engine.force_final_state_all();
    assert_eq!(fade.style(), fade.style_pair().to);
    assert_eq!(counter.display_value(), 250.0);
    assert_eq!(marquee.offset(), 0.0);
    assert_eq!(pulse.style().scale(), Some(1.0));
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_page_level_cancel_freezes() {
    let engine = engine(false);
    let fade = MotionEffect::fade_in(
        &engine.context(),
        EffectConfig::new().duration(1.0).direction(Direction::None),
    );
    engine.report_intersection(fade.observation_id().unwrap(), 1.0);
    run_until(&engine, 400.0, 16.0);

    engine.cancel_all();
    let frozen = fade.style();
    run_until(&engine, 2000.0, 16.0);
    assert_eq!(fade.style(), frozen);
    assert_eq!(engine.pending_frames(), 0);
}

#[test]
fn test_teardown_releases_everything() {
    let engine = engine(false);
    let ctx = engine.context();

    let fade = MotionEffect::fade_in(&ctx, EffectConfig::new().duration(1.0));
    let fade_id = fade.observation_id().unwrap();
    engine.report_intersection(fade_id, 1.0);

    let group = StaggerGroup::fade_in(&ctx, EffectConfig::new(), StaggerConfig::new(80.0));
    let kids = group.children(4);
    engine.report_intersection(group.observation_id().unwrap(), 1.0);

    let parallax = Parallax::new(&ctx, EffectConfig::new());
    parallax.set_bounds(Rect::new(0.0, 300.0, 200.0, 200.0));
    scroll_to(&engine, 400.0);

    let counter = Counter::new(&ctx, 99.0, EffectConfig::new());
    let button = Interactive::new(
        &ctx,
        EffectConfig::new().variant(InteractionVariant::Ripple),
    );
    button.pointer(PointerEvent::Down { x: 1.0, y: 1.0 });
    let marquee = Marquee::new(&ctx, MarqueeConfig::new(1.0), 500.0);
    let pulse = Pulse::new(&ctx, EffectConfig::new());

    engine.tick(16.0);
    assert!(engine.pending_frames() > 0);
    assert_eq!(engine.registered_effects(), 7);
    assert_eq!(engine.active_observations(), 3);
    assert_eq!(engine.scroll_subscribers(), 1);
    assert_eq!(engine.reduced_motion_subscribers(), 7);

    fade.unmount();
    group.unmount();
    drop((parallax, counter, button, marquee, pulse));

    assert_eq!(engine.pending_frames(), 0);
    assert_eq!(engine.active_observations(), 0);
    assert_eq!(engine.registered_effects(), 0);
    assert_eq!(engine.scroll_subscribers(), 0);
    assert_eq!(engine.reduced_motion_subscribers(), 0);

    // Late signals for removed elements go nowhere
    assert_eq!(engine.report_intersection(fade_id, 0.0), None);
    scroll_to(&engine, 0.0);
    engine.set_reduced_motion(true);
    assert_eq!(engine.tick(100.0), 0);

    // Children outliving their group show the settled style
    assert!(kids.iter().all(|kid| kid.style().opacity() == Some(1.0)));
}

#[test]
fn test_remount_cycles_do_not_accumulate() {
    let engine = engine(false);
    let ctx = engine.context();

    for cycle in 0..20 {
        let fade = MotionEffect::fade_in(&ctx, EffectConfig::new());
        let parallax = Parallax::new(&ctx, EffectConfig::new());
        engine.report_intersection(fade.observation_id().unwrap(), 1.0);
        parallax.set_bounds(Rect::new(0.0, 800.0, 100.0, 100.0));
        scroll_to(&engine, 100.0 * cycle as f32);
        engine.tick(16.0 * (cycle + 1) as f64);
    }

    assert_eq!(engine.pending_frames(), 0);
    assert_eq!(engine.active_observations(), 0);
    assert_eq!(engine.registered_effects(), 0);
    assert_eq!(engine.scroll_subscribers(), 0);
}

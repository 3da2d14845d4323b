//! Staggered group entrances
//!
//! A [`StaggerGroup`] is a container with its own trigger. Children join
//! through [`StaggerGroup::child`] in render order and each receives the
//! next index from the group's [`StaggerContext`]; its delay is
//! `base_delay + index * increment`. Children never look at the viewport
//! themselves: they all start when the container's trigger fires, and their
//! delays count from that moment.
//!
//! Re-ordering children between renders is not supported; indices follow
//! insertion order only.

use crate::config::{EffectConfig, Trigger};
use crate::context::MotionContext;
use crate::interaction::PointerEvent;
use crate::lifecycle::{with_state, EffectState, Mounted};
use crate::observer::{Observation, ObservationId, VisibilityState};
use crate::resolver::EffectVariant;
use glint_animation::{FrameLoop, LoopControl, SchedulerHandle, Transition, TransitionSpec};
use glint_core::StyleSnapshot;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Per-child delay schedule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaggerConfig {
    /// Delay of the first child (ms)
    pub base_delay_ms: f64,
    /// Delay added for each following child (ms)
    pub increment_ms: f64,
    /// Optional: children past this index share its delay
    pub limit: Option<usize>,
}

impl StaggerConfig {
    /// Create a stagger config with `increment_ms` between children
    pub fn new(increment_ms: f64) -> Self {
        Self {
            base_delay_ms: 0.0,
            increment_ms: sane_ms(increment_ms),
            limit: None,
        }
    }

    pub fn base_delay(mut self, delay_ms: f64) -> Self {
        self.base_delay_ms = sane_ms(delay_ms);
        self
    }

    /// Limit stagger to first N items
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Delay for a specific child index
    pub fn delay_for_index(&self, index: usize) -> f64 {
        let capped_index = match self.limit {
            Some(limit) => index.min(limit),
            None => index,
        };
        self.base_delay_ms + self.increment_ms * capped_index as f64
    }
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self::new(100.0)
    }
}

fn sane_ms(ms: f64) -> f64 {
    if ms.is_finite() {
        ms.max(0.0)
    } else {
        0.0
    }
}

/// Index allocator for one container's subtree
#[derive(Clone, Copy, Debug)]
pub struct StaggerContext {
    config: StaggerConfig,
    next_index: usize,
}

impl StaggerContext {
    pub fn new(config: StaggerConfig) -> Self {
        Self {
            config,
            next_index: 0,
        }
    }

    /// Consume the next index; returns it with its delay
    pub fn next(&mut self) -> (usize, f64) {
        let index = self.next_index;
        self.next_index += 1;
        (index, self.config.delay_for_index(index))
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

new_key_type! {
    struct ChildKey;
}

struct ChildSlot {
    transition: Transition,
}

struct GroupInner {
    this: Weak<RefCell<GroupInner>>,
    scheduler: SchedulerHandle,
    variant: EffectVariant,
    trigger: Trigger,
    reduced: bool,
    child_spec: TransitionSpec,
    stagger: StaggerContext,
    children: SlotMap<ChildKey, ChildSlot>,
    visibility: VisibilityState,
    hovered: bool,
    /// When the container's trigger last fired
    revealed_at: Option<f64>,
    observation: Option<Observation>,
    frame_loop: Option<FrameLoop>,
}

impl GroupInner {
    fn trigger_met(&self) -> bool {
        match self.trigger {
            Trigger::Scroll => self.visibility == VisibilityState::Visible,
            Trigger::Hover => self.hovered,
            Trigger::Always => true,
        }
    }

    fn reveal(&mut self) {
        let now = self.scheduler.now();
        self.revealed_at = Some(now);
        if self.reduced {
            self.children
                .values_mut()
                .for_each(|child| child.transition.force_to());
            return;
        }
        tracing::debug!(
            "StaggerGroup: revealing {} child(ren) at {:.1}ms",
            self.children.len(),
            now
        );
        for child in self.children.values_mut() {
            child.transition.play(now);
        }
        self.ensure_frames();
    }

    fn hide(&mut self) {
        self.revealed_at = None;
        if self.reduced {
            return;
        }
        let now = self.scheduler.now();
        for child in self.children.values_mut() {
            child.transition.reverse(now);
        }
        self.ensure_frames();
    }

    fn add_child(&mut self) -> (ChildKey, usize, f64) {
        let (index, delay_ms) = self.stagger.next();
        let pair = self.variant.resolve(self.trigger, self.reduced);
        let mut transition = Transition::new(pair, self.child_spec.with_delay(delay_ms));

        if self.reduced {
            transition.force_to();
        } else if let Some(revealed_at) = self.revealed_at {
            // Late joiner: its delay still counts from the container's trigger
            transition.play(revealed_at);
            transition.sample(self.scheduler.now());
        }

        let key = self.children.insert(ChildSlot { transition });
        self.ensure_frames();
        (key, index, delay_ms)
    }

    fn any_active(&self) -> bool {
        self.children
            .values()
            .any(|child| child.transition.is_active())
    }

    fn ensure_frames(&mut self) {
        if !self.any_active() || self.frame_loop.as_ref().is_some_and(FrameLoop::is_running) {
            return;
        }
        let weak = self.this.clone();
        self.frame_loop = Some(FrameLoop::start(&self.scheduler, move |frame| {
            with_state(&weak, |state: &mut GroupInner| {
                for child in state.children.values_mut() {
                    child.transition.sample(frame.now_ms);
                }
                if state.any_active() {
                    LoopControl::Continue
                } else {
                    LoopControl::Stop
                }
            })
            .unwrap_or(LoopControl::Stop)
        }));
    }

    fn on_visibility(&mut self, visibility: VisibilityState) {
        self.visibility = visibility;
        match visibility {
            VisibilityState::Visible => self.reveal(),
            VisibilityState::Exited => self.hide(),
            VisibilityState::NotYetSeen => {}
        }
    }
}

impl EffectState for GroupInner {
    fn reduced_motion_changed(&mut self, reduced: bool) {
        tracing::debug!("StaggerGroup: reduced motion -> {}", reduced);
        self.reduced = reduced;
        self.frame_loop = None;
        let pair = self.variant.resolve(self.trigger, reduced);
        let settle_at_to = reduced || self.trigger_met();
        // Children added later play relative to the last trigger
        if self.trigger_met() && self.revealed_at.is_none() {
            self.revealed_at = Some(self.scheduler.now());
        }
        for child in self.children.values_mut() {
            child.transition.reset_pair(pair.clone());
            if settle_at_to {
                child.transition.force_to();
            } else {
                child.transition.force_from();
            }
        }
    }

    fn cancel(&mut self) {
        self.frame_loop = None;
        for child in self.children.values_mut() {
            child.transition.cancel();
        }
    }

    fn force_final_state(&mut self) {
        self.frame_loop = None;
        for child in self.children.values_mut() {
            child.transition.force_to();
        }
    }

    fn teardown(&mut self) {
        self.frame_loop = None;
        self.observation = None;
    }
}

/// Container that cascades one entrance across its children
pub struct StaggerGroup {
    inner: Mounted<GroupInner>,
}

impl StaggerGroup {
    /// Mount a container
    ///
    /// `config` supplies the container's trigger, threshold and once flag
    /// plus each child's duration and easing. Child delays come from
    /// `stagger` only.
    pub fn new(
        context: &MotionContext,
        variant: EffectVariant,
        config: EffectConfig,
        stagger: StaggerConfig,
    ) -> Self {
        let config = config.sanitized();
        let reduced = context.resolve_reduced_motion(config.reduced_motion);
        let trigger = config.trigger;
        let once = config.once || variant.forces_once(trigger);

        let state = Rc::new_cyclic(|this: &Weak<RefCell<GroupInner>>| {
            let observation = (trigger == Trigger::Scroll).then(|| {
                let weak = this.clone();
                context
                    .observer()
                    .observe(config.threshold, once, move |visibility| {
                        with_state(&weak, |state: &mut GroupInner| {
                            state.on_visibility(visibility)
                        });
                    })
            });

            RefCell::new(GroupInner {
                this: this.clone(),
                scheduler: context.scheduler().clone(),
                variant,
                trigger,
                reduced,
                child_spec: config.transition_spec().with_delay(0.0),
                stagger: StaggerContext::new(stagger),
                children: SlotMap::with_key(),
                visibility: VisibilityState::NotYetSeen,
                hovered: false,
                revealed_at: None,
                observation,
                frame_loop: None,
            })
        });
        tracing::debug!(
            "StaggerGroup: mounted {:?} ({:?}, {:.0}ms + {:.0}ms/child)",
            variant,
            trigger,
            stagger.base_delay_ms,
            stagger.increment_ms
        );

        if trigger == Trigger::Always {
            state.borrow_mut().reveal();
        }

        Self {
            inner: Mounted::new(context, state, config.reduced_motion),
        }
    }

    /// Fade-in children, the common list entrance
    pub fn fade_in(context: &MotionContext, config: EffectConfig, stagger: StaggerConfig) -> Self {
        Self::new(context, EffectVariant::fade(&config), config, stagger)
    }

    /// Register the next child in render order
    pub fn child(&self) -> StaggerChild {
        let (key, index, delay_ms, settled) = {
            let mut state = self.inner.borrow_mut();
            let (key, index, delay_ms) = state.add_child();
            let settled = state.variant.resolve(state.trigger, true).to;
            (key, index, delay_ms, settled)
        };
        let group = {
            let state = self.inner.borrow();
            state.this.clone()
        };
        StaggerChild {
            group,
            key,
            index,
            delay_ms,
            settled,
        }
    }

    /// Register `count` children at once
    pub fn children(&self, count: usize) -> Vec<StaggerChild> {
        (0..count).map(|_| self.child()).collect()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    pub fn visibility(&self) -> VisibilityState {
        self.inner.borrow().visibility
    }

    pub fn observation_id(&self) -> Option<ObservationId> {
        self.inner
            .borrow()
            .observation
            .as_ref()
            .map(Observation::id)
    }

    /// When the container's trigger last fired, if it is currently revealed
    pub fn revealed_at(&self) -> Option<f64> {
        self.inner.borrow().revealed_at
    }

    /// Forward a pointer event (hover trigger only)
    pub fn pointer(&self, event: PointerEvent) {
        let mut state = self.inner.borrow_mut();
        if state.trigger != Trigger::Hover {
            return;
        }
        match event {
            PointerEvent::Enter if !state.hovered => {
                state.hovered = true;
                state.reveal();
            }
            PointerEvent::Leave if state.hovered => {
                state.hovered = false;
                state.hide();
            }
            _ => {}
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn force_final_state(&self) {
        self.inner.force_final_state();
    }

    pub fn unmount(self) {
        drop(self);
    }
}

/// One child of a [`StaggerGroup`]
///
/// Dropping the child removes it from the group. If the group is gone the
/// child reports its settled style.
pub struct StaggerChild {
    group: Weak<RefCell<GroupInner>>,
    key: ChildKey,
    index: usize,
    delay_ms: f64,
    settled: StyleSnapshot,
}

impl StaggerChild {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Delay after the container's trigger before this child starts
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn style(&self) -> StyleSnapshot {
        self.group
            .upgrade()
            .and_then(|group| {
                let state = group.try_borrow().ok()?;
                state
                    .children
                    .get(self.key)
                    .map(|child| child.transition.current().clone())
            })
            .unwrap_or_else(|| self.settled.clone())
    }

    pub fn is_animating(&self) -> bool {
        self.group
            .upgrade()
            .and_then(|group| {
                let state = group.try_borrow().ok()?;
                state
                    .children
                    .get(self.key)
                    .map(|child| child.transition.is_active())
            })
            .unwrap_or(false)
    }
}

impl Drop for StaggerChild {
    fn drop(&mut self) {
        let key = self.key;
        with_state(&self.group, |state: &mut GroupInner| {
            state.children.remove(key);
        });
    }
}

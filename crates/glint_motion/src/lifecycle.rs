//! Mount/teardown plumbing shared by every effect
//!
//! An effect keeps its mutable state in `Rc<RefCell<S>>`. Frame loops,
//! observer listeners and signal subscriptions only ever hold a `Weak` to it,
//! so once the effect handle is dropped every stale callback finds nothing
//! to upgrade and does nothing.

use crate::context::{EffectControl, EffectId, MotionContext};
use glint_core::Subscription;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// Mutable state of one mounted effect
pub trait EffectState: 'static {
    /// The effective reduced-motion flag changed (global signal only)
    fn reduced_motion_changed(&mut self, reduced: bool);

    /// Freeze and drop pending frames
    fn cancel(&mut self);

    /// Settle at the final style and drop pending frames
    fn force_final_state(&mut self);

    /// Release frames, observations and subscriptions owned by the state
    fn teardown(&mut self);
}

// Callbacks can fire while the state is already borrowed (e.g. a page-level
// cancel issued from inside a frame); those are skipped instead of panicking.
impl<S: EffectState> EffectControl for RefCell<S> {
    fn cancel(&self) {
        if let Ok(mut state) = self.try_borrow_mut() {
            state.cancel();
        }
    }

    fn force_final_state(&self) {
        if let Ok(mut state) = self.try_borrow_mut() {
            state.force_final_state();
        }
    }
}

/// Run `f` against the state behind `weak` if it is still alive and free
pub fn with_state<S, R>(weak: &Weak<RefCell<S>>, f: impl FnOnce(&mut S) -> R) -> Option<R> {
    let state = weak.upgrade()?;
    let mut guard = state.try_borrow_mut().ok()?;
    Some(f(&mut guard))
}

/// A mounted effect: its state plus the registrations made on its behalf
pub struct Mounted<S: EffectState> {
    state: Rc<RefCell<S>>,
    context: MotionContext,
    effect_id: Option<EffectId>,
    reduced_motion: Option<Subscription>,
}

impl<S: EffectState> Mounted<S> {
    /// Register `state` with the engine
    ///
    /// Without an instance override the state follows the global
    /// reduced-motion signal; with one it never subscribes.
    pub fn new(context: &MotionContext, state: Rc<RefCell<S>>, reduced_override: Option<bool>) -> Self {
        let control: Weak<dyn EffectControl> = Rc::downgrade(&state) as Weak<dyn EffectControl>;
        let effect_id = context.register_effect(control);

        let reduced_motion = match reduced_override {
            Some(_) => None,
            None => {
                let weak = Rc::downgrade(&state);
                Some(context.reduced_motion().subscribe(move |reduced| {
                    with_state(&weak, |state: &mut S| state.reduced_motion_changed(reduced));
                }))
            }
        };

        Self {
            state,
            context: context.clone(),
            effect_id: Some(effect_id),
            reduced_motion,
        }
    }

    pub fn borrow(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.state.borrow_mut()
    }

    pub fn cancel(&self) {
        EffectControl::cancel(&*self.state);
    }

    pub fn force_final_state(&self) {
        EffectControl::force_final_state(&*self.state);
    }
}

impl<S: EffectState> Drop for Mounted<S> {
    fn drop(&mut self) {
        if let Some(id) = self.effect_id.take() {
            self.context.unregister_effect(id);
        }
        if let Some(subscription) = self.reduced_motion.take() {
            subscription.unsubscribe();
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.teardown();
        }
    }
}

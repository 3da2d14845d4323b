//! Frame scheduler
//!
//! A single-threaded stand-in for the host's per-frame callback queue.
//! Every "wait for the next frame" in Glint is an explicit task registered
//! here and identified by a [`FrameTaskId`]. Owners keep the id next to their
//! state and cancel it on teardown, so a removed element never receives a
//! stale frame.
//!
//! The host drives time: call [`FrameScheduler::tick`] once per display
//! frame with a monotonic timestamp in milliseconds. Each tick runs every
//! task that was requested *before* the tick started, exactly once. Tasks
//! requested while a tick is running wait for the next one.
//!
//! # Example
//!
//! ```rust
//! use glint_animation::{FrameLoop, FrameScheduler, LoopControl};
//!
//! let scheduler = FrameScheduler::new();
//! let mut frames = 0;
//! let _loop = FrameLoop::start(&scheduler.handle(), move |_frame| {
//!     frames += 1;
//!     if frames < 3 { LoopControl::Continue } else { LoopControl::Stop }
//! });
//!
//! scheduler.tick(16.0);
//! scheduler.tick(32.0);
//! scheduler.tick(48.0);
//! assert_eq!(scheduler.pending_count(), 0);
//! ```

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a pending frame callback
    pub struct FrameTaskId;
}

/// Timing information handed to every frame callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    /// Monotonic frame counter (first tick is frame 1)
    pub frame: u64,
    /// Host timestamp for this frame in milliseconds
    pub now_ms: f64,
    /// Milliseconds since the previous tick
    pub delta_ms: f64,
}

type FrameCallback = Box<dyn FnOnce(FrameInfo)>;

struct FrameTask {
    callback: FrameCallback,
    /// Frame number current when the task was requested
    requested_in: u64,
}

/// Internal state of the frame scheduler
struct SchedulerInner {
    tasks: SlotMap<FrameTaskId, FrameTask>,
    frame: u64,
    now_ms: f64,
}

/// Owner of the frame queue
///
/// Dropping the scheduler invalidates every [`SchedulerHandle`]; pending
/// tasks are dropped without running.
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a scheduler whose clock starts at `now_ms`
    pub fn starting_at(now_ms: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tasks: SlotMap::with_key(),
                frame: 0,
                now_ms: if now_ms.is_finite() { now_ms } else { 0.0 },
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run one frame
    ///
    /// Timestamps that go backwards (or are not finite) are clamped to the
    /// previous frame's time. Returns the number of callbacks that ran.
    pub fn tick(&self, now_ms: f64) -> usize {
        let (info, due) = {
            let mut inner = self.inner.borrow_mut();
            let now = if now_ms.is_finite() {
                now_ms.max(inner.now_ms)
            } else {
                inner.now_ms
            };
            let delta_ms = now - inner.now_ms;
            inner.frame += 1;
            inner.now_ms = now;

            let frame = inner.frame;
            let due: Vec<FrameTaskId> = inner
                .tasks
                .iter()
                .filter(|(_, task)| task.requested_in < frame)
                .map(|(id, _)| id)
                .collect();

            (
                FrameInfo {
                    frame,
                    now_ms: now,
                    delta_ms,
                },
                due,
            )
        };

        let mut ran = 0;
        for id in due {
            // Earlier callbacks may have cancelled this one
            let task = self.inner.borrow_mut().tasks.remove(id);
            if let Some(task) = task {
                (task.callback)(info);
                ran += 1;
            }
        }

        tracing::trace!(
            "FrameScheduler: frame {} at {:.1}ms ran {} task(s)",
            info.frame,
            info.now_ms,
            ran
        );
        ran
    }

    /// Current frame time in milliseconds
    pub fn now(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Number of ticks so far
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// Number of frame callbacks waiting for a future tick
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the frame scheduler
///
/// This is passed to components that need to schedule frames.
/// It won't prevent the scheduler from being dropped; every operation on a
/// dead handle is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Run `callback` once on the next tick
    pub fn request_frame<F>(&self, callback: F) -> Option<FrameTaskId>
    where
        F: FnOnce(FrameInfo) + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let mut guard = inner.borrow_mut();
            let requested_in = guard.frame;
            guard.tasks.insert(FrameTask {
                callback: Box::new(callback),
                requested_in,
            })
        })
    }

    /// Cancel a pending frame callback
    ///
    /// Returns `true` if the task was still pending.
    pub fn cancel_frame(&self, id: FrameTaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().tasks.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn is_pending(&self, id: FrameTaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.contains_key(id))
            .unwrap_or(false)
    }

    /// Current frame time, or 0.0 if the scheduler is gone
    pub fn now(&self) -> f64 {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().now_ms)
            .unwrap_or(0.0)
    }

    /// Number of ticks so far, or 0 if the scheduler is gone
    pub fn frame(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().frame)
            .unwrap_or(0)
    }

    pub fn pending_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.len())
            .unwrap_or(0)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Frame Loop
// ============================================================================

/// What a loop step wants to happen next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

type LoopStep = Rc<RefCell<dyn FnMut(FrameInfo) -> LoopControl>>;

/// A repeating frame callback with a cancellation token
///
/// Each step re-requests the next frame when it returns
/// [`LoopControl::Continue`]. At most one frame is pending at a time.
/// Dropping the loop cancels the pending frame.
pub struct FrameLoop {
    handle: SchedulerHandle,
    pending: Rc<Cell<Option<FrameTaskId>>>,
    stopped: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn start<F>(handle: &SchedulerHandle, step: F) -> Self
    where
        F: FnMut(FrameInfo) -> LoopControl + 'static,
    {
        let step: LoopStep = Rc::new(RefCell::new(step));
        let pending = Rc::new(Cell::new(None));
        let stopped = Rc::new(Cell::new(false));
        schedule_step(handle, step, Rc::clone(&pending), Rc::clone(&stopped));

        Self {
            handle: handle.clone(),
            pending,
            stopped,
        }
    }

    /// Stop the loop and drop its pending frame. Idempotent.
    pub fn cancel(&self) {
        self.stopped.set(true);
        if let Some(id) = self.pending.take() {
            self.handle.cancel_frame(id);
        }
    }

    /// True while a next frame is scheduled
    pub fn is_running(&self) -> bool {
        !self.stopped.get() && self.pending.get().is_some()
    }

    pub fn pending_task(&self) -> Option<FrameTaskId> {
        self.pending.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule_step(
    handle: &SchedulerHandle,
    step: LoopStep,
    pending: Rc<Cell<Option<FrameTaskId>>>,
    stopped: Rc<Cell<bool>>,
) {
    if stopped.get() {
        return;
    }
    let next_handle = handle.clone();
    let next_pending = Rc::clone(&pending);
    let id = handle.request_frame(move |frame| {
        next_pending.set(None);
        if stopped.get() {
            return;
        }
        let control = {
            let mut step_fn = step.borrow_mut();
            (&mut *step_fn)(frame)
        };
        match control {
            LoopControl::Continue => schedule_step(&next_handle, step, next_pending, stopped),
            LoopControl::Stop => stopped.set(true),
        }
    });
    pending.set(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_runs_once_on_next_tick() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));

        let r = Rc::clone(&runs);
        handle.request_frame(move |_| r.set(r.get() + 1));

        assert_eq!(scheduler.pending_count(), 1);
        scheduler.tick(16.0);
        scheduler.tick(32.0);
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));

        let r = Rc::clone(&runs);
        let id = handle.request_frame(move |_| r.set(r.get() + 1)).unwrap();
        assert!(handle.cancel_frame(id));
        assert!(!handle.cancel_frame(id));

        scheduler.tick(16.0);
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_request_during_tick_waits_for_next_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let frames = Rc::new(RefCell::new(Vec::new()));

        let h = handle.clone();
        let f = Rc::clone(&frames);
        handle.request_frame(move |info| {
            f.borrow_mut().push(info.frame);
            let f2 = Rc::clone(&f);
            h.request_frame(move |info| f2.borrow_mut().push(info.frame));
        });

        scheduler.tick(16.0);
        assert_eq!(*frames.borrow(), vec![1]);
        scheduler.tick(32.0);
        assert_eq!(*frames.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_callback_may_cancel_sibling() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let sibling_ran = Rc::new(Cell::new(false));

        let slot: Rc<Cell<Option<FrameTaskId>>> = Rc::new(Cell::new(None));
        let h = handle.clone();
        let s = Rc::clone(&slot);
        handle.request_frame(move |_| {
            if let Some(id) = s.get() {
                h.cancel_frame(id);
            }
        });
        let r = Rc::clone(&sibling_ran);
        slot.set(handle.request_frame(move |_| r.set(true)));

        scheduler.tick(16.0);
        assert!(!sibling_ran.get());
    }

    #[test]
    fn test_time_is_monotonic() {
        let scheduler = FrameScheduler::new();
        scheduler.tick(100.0);
        scheduler.tick(50.0);
        scheduler.tick(f64::NAN);
        assert_eq!(scheduler.now(), 100.0);
        assert_eq!(scheduler.frame(), 3);
    }

    #[test]
    fn test_frame_info_delta() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let seen = Rc::new(Cell::new(None));

        scheduler.tick(10.0);
        let s = Rc::clone(&seen);
        handle.request_frame(move |info| s.set(Some(info)));
        scheduler.tick(26.0);

        let info = seen.get().unwrap();
        assert_eq!(info.delta_ms, 16.0);
        assert_eq!(info.now_ms, 26.0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        assert!(handle.request_frame(|_| {}).is_none());
        assert_eq!(handle.now(), 0.0);
    }

    #[test]
    fn test_frame_loop_stops_itself() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let frame_loop = FrameLoop::start(&scheduler.handle(), move |_| {
            c.set(c.get() + 1);
            if c.get() < 3 {
                LoopControl::Continue
            } else {
                LoopControl::Stop
            }
        });

        for i in 1..=10 {
            scheduler.tick(i as f64 * 16.0);
        }
        assert_eq!(count.get(), 3);
        assert!(!frame_loop.is_running());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_frame_loop_cancel_and_drop() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let frame_loop = FrameLoop::start(&scheduler.handle(), move |_| {
            c.set(c.get() + 1);
            LoopControl::Continue
        });
        scheduler.tick(16.0);
        scheduler.tick(32.0);
        assert!(frame_loop.is_running());

        frame_loop.cancel();
        frame_loop.cancel();
        scheduler.tick(48.0);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.pending_count(), 0);

        let c = Rc::clone(&count);
        let dropped = FrameLoop::start(&scheduler.handle(), move |_| {
            c.set(c.get() + 1);
            LoopControl::Continue
        });
        drop(dropped);
        scheduler.tick(64.0);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.pending_count(), 0);
    }
}

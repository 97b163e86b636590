//! Frame-stepped animations.
//!
//! Two loops drive motion on the page: the smooth page scroll (time based,
//! quadratic ease-in-out) and the stat counters (frame based, fixed
//! increment per step). Each start call returns an [`AnimationHandle`] so
//! the owner can cancel the loop explicitly instead of letting stale frame
//! callbacks run out.

use crate::rate_limit::Millis;
use crate::render::{DomPatch, PatchBuffer};

/// Quadratic ease-in-out in the classic `(t, b, c, d)` form: elapsed time,
/// start value, total change, duration.
#[must_use]
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    t -= 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}

/// Identifies one running animation. Only meaningful to the engine that
/// returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Hands out increasing handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleSource {
    next: u64,
}

impl HandleSource {
    pub(crate) fn next(&mut self) -> AnimationHandle {
        self.next += 1;
        AnimationHandle(self.next)
    }
}

/// One frame of a smooth scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    /// Offset to scroll to this frame.
    pub offset: f64,
    /// True on the last frame.
    pub done: bool,
}

/// Eased scroll from one offset to another over a fixed duration.
///
/// The clock starts at the first frame. Elapsed time is clamped to the
/// duration, so the last frame lands exactly on the target.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    from: f64,
    distance: f64,
    duration: Millis,
    started_at: Option<Millis>,
}

impl SmoothScroll {
    /// Creates a quadratic ease-in-out scroll.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Millis) -> Self {
        Self {
            from,
            distance: to - from,
            duration,
            started_at: None,
        }
    }

    /// Returns the destination offset.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.from + self.distance
    }

    /// Computes the frame at time `now`.
    pub fn step(&mut self, now: Millis) -> ScrollStep {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = (now - start).max(0.0);

        if self.duration <= 0.0 || elapsed >= self.duration {
            return ScrollStep {
                offset: self.target(),
                done: true,
            };
        }

        ScrollStep {
            offset: ease_in_out_quad(elapsed, self.from, self.distance, self.duration),
            done: false,
        }
    }
}

/// Owns the single page-scroll animation. Starting a new scroll cancels the
/// running one.
#[derive(Debug, Clone)]
pub struct PageScroller {
    duration: Millis,
    active: Option<(AnimationHandle, SmoothScroll)>,
    handles: HandleSource,
}

impl PageScroller {
    /// Creates an idle scroller.
    #[must_use]
    pub fn new(duration: Millis) -> Self {
        Self {
            duration,
            active: None,
            handles: HandleSource::default(),
        }
    }

    /// Starts scrolling from `from` to `to`.
    pub fn start(&mut self, from: f64, to: f64) -> AnimationHandle {
        let handle = self.handles.next();
        self.active = Some((handle, SmoothScroll::new(from, to, self.duration)));
        handle
    }

    /// Stops the scroll if `handle` is still the running one.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        match self.active {
            Some((running, _)) if running == handle => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Returns true while a scroll is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Advances one frame.
    pub fn tick(&mut self, now: Millis, patches: &mut PatchBuffer) {
        let Some((_, scroll)) = self.active.as_mut() else {
            return;
        };

        let step = scroll.step(now);
        patches.push(DomPatch::ScrollTo { offset: step.offset });
        if step.done {
            self.active = None;
        }
    }
}

/// Result of one counter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStep {
    /// Intermediate value, more frames follow.
    Running(i64),
    /// Final value, the loop is over.
    Finished(i64),
}

impl CounterStep {
    /// Returns the value to render.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Running(v) | Self::Finished(v) => v,
        }
    }
}

/// Counts from zero up to a target in fixed per-frame increments.
///
/// `increment = target / (duration / frame_interval)`. Each step adds the
/// increment and renders its floor. The first step that reaches the target
/// renders the exact target, which also absorbs accumulated float drift.
/// Frame count, not elapsed time, decides the pace.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: i64,
    increment: f64,
    current: f64,
    finished: bool,
}

impl CounterAnimation {
    /// Creates a counter.
    #[must_use]
    pub fn new(target: i64, duration: Millis, frame_interval: Millis) -> Self {
        let frames = duration / frame_interval;
        let increment = if frames > 0.0 {
            target as f64 / frames
        } else {
            target as f64
        };

        Self {
            target,
            increment,
            current: 0.0,
            finished: false,
        }
    }

    /// Returns the target value.
    #[must_use]
    pub const fn target(&self) -> i64 {
        self.target
    }

    /// Returns true once the target has been rendered.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances one frame.
    pub fn step(&mut self) -> CounterStep {
        if self.finished {
            return CounterStep::Finished(self.target);
        }

        self.current += self.increment;
        if self.current < self.target as f64 {
            CounterStep::Running(self.current.floor() as i64)
        } else {
            self.finished = true;
            CounterStep::Finished(self.target)
        }
    }
}

//! Rate limiting for high-frequency events (scroll, resize, keystrokes).
//!
//! Neither limiter reads a clock. The caller passes the current page time in
//! milliseconds, the same timestamp the browser hands to frame callbacks.
//! Neither keeps a backlog: a throttle is a single gate, a debounce holds at
//! most the latest value.

/// Milliseconds on the page clock.
pub type Millis = f64;

/// Leading-edge throttle gate.
///
/// The first call passes. Later calls are rejected until `limit` has elapsed
/// since the last call that passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Window length.
    limit: Millis,
    /// Time at which the gate reopens. `None` while open.
    reopens_at: Option<Millis>,
}

impl Throttle {
    /// Creates an open gate.
    #[must_use]
    pub const fn new(limit: Millis) -> Self {
        Self {
            limit,
            reopens_at: None,
        }
    }

    /// Returns the window length.
    #[must_use]
    pub const fn limit(&self) -> Millis {
        self.limit
    }

    /// Returns true if a call at `now` passes, closing the gate for one window.
    pub fn try_pass(&mut self, now: Millis) -> bool {
        match self.reopens_at {
            Some(reopens_at) if now < reopens_at => false,
            _ => {
                self.reopens_at = Some(now + self.limit);
                true
            }
        }
    }

    /// Reopens the gate immediately.
    pub fn reset(&mut self) {
        self.reopens_at = None;
    }
}

/// A callback behind a [`Throttle`].
pub struct Throttled<F> {
    gate: Throttle,
    callback: F,
}

impl<F> Throttled<F> {
    /// Wraps `callback` so it runs at most once per `limit` window.
    #[must_use]
    pub const fn new(limit: Millis, callback: F) -> Self {
        Self {
            gate: Throttle::new(limit),
            callback,
        }
    }

    /// Invokes the callback if the gate is open. Returns whether it ran.
    pub fn call<A>(&mut self, now: Millis, arg: A) -> bool
    where
        F: FnMut(A),
    {
        if self.gate.try_pass(now) {
            (self.callback)(arg);
            true
        } else {
            false
        }
    }
}

/// Trailing-edge debounce.
///
/// Each call replaces the pending value and pushes the deadline to
/// `now + wait`. [`Debounce::poll`] yields the value once the deadline passes.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    wait: Millis,
    pending: Option<(Millis, T)>,
}

impl<T> Debounce<T> {
    /// Creates an idle debounce.
    #[must_use]
    pub const fn new(wait: Millis) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Records a call at `now`, collapsing any pending one.
    pub fn call(&mut self, now: Millis, value: T) {
        self.pending = Some((now + self.wait, value));
    }

    /// Takes the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        let due = matches!(self.pending, Some((deadline, _)) if now >= deadline);
        if due {
            self.pending.take().map(|(_, value)| value)
        } else {
            None
        }
    }

    /// Returns the time the pending value becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Returns true if a value is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}

/// A callback behind a [`Debounce`].
pub struct Debounced<T, F> {
    inner: Debounce<T>,
    callback: F,
}

impl<T, F: FnMut(T)> Debounced<T, F> {
    /// Wraps `callback` so bursts collapse into one trailing call.
    #[must_use]
    pub const fn new(wait: Millis, callback: F) -> Self {
        Self {
            inner: Debounce::new(wait),
            callback,
        }
    }

    /// Records a call.
    pub fn call(&mut self, now: Millis, value: T) {
        self.inner.call(now, value);
    }

    /// Runs the callback if due. Returns whether it ran.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.inner.poll(now) {
            Some(value) => {
                (self.callback)(value);
                true
            }
            None => false,
        }
    }
}

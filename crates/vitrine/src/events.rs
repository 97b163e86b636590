//! # Site Event Bus
//!
//! Carries events from platform listeners and the public API to the site
//! root.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐
//! │  Listeners  │─────>│             │
//! └─────────────┘      │  Event Bus  │─────> Site::tick (drain)
//! ┌─────────────┐      │  (bounded)  │
//! │   SiteApi   │─────>│             │
//! └─────────────┘      └─────────────┘
//! ```
//!
//! The bus is bounded. A full bus drops the event and counts it, so a burst
//! of scroll events can never grow memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;
use vitrine_ui::{InputEvent, NotificationKind};

/// Default bus capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Events routed by the site root.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteEvent {
    /// A platform event.
    Input(InputEvent),

    /// Smooth-scroll to the first element matching a selector.
    ScrollToElement(String),

    /// Show a transient notification.
    ShowNotification {
        /// Text content.
        message: String,
        /// Visual kind.
        kind: NotificationKind,
    },
}

impl From<InputEvent> for SiteEvent {
    fn from(event: InputEvent) -> Self {
        Self::Input(event)
    }
}

/// Event bus between producers and the site root.
pub struct EventBus {
    sender: Sender<SiteEvent>,
    receiver: Receiver<SiteEvent>,
    dropped: Arc<AtomicUsize>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a paired sender and receiver.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<SiteEvent>,
    dropped: Arc<AtomicUsize>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: impl Into<SiteEvent>) -> bool {
        match self.sender.try_send(event.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Event bus full, dropped {event:?} ({dropped} total)");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<SiteEvent>,
    dropped: Arc<AtomicUsize>,
}

impl EventReceiver {
    /// Receives all pending events without blocking.
    #[inline]
    pub fn drain(&self) -> Vec<SiteEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event, if any.
    #[inline]
    pub fn try_recv(&self) -> Option<SiteEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Returns how many events were dropped because the bus was full.
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

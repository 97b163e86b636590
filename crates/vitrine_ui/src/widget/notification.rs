//! Transient notifications.
//!
//! A notification is created hidden, gains `show` a moment later, hides
//! itself after the dismiss delay (or when its close button is clicked) and
//! is removed once the fade-out has had time to run.

use std::fmt;

use crate::dom::{ElementId, ElementLocator};
use crate::rate_limit::Millis;
use crate::render::{DomPatch, NodeSpec, PatchBuffer};
use crate::style::class;

/// Visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// Something worked.
    Success,
    /// Something failed.
    Error,
    /// Needs attention.
    Warning,
}

impl NotificationKind {
    /// Parses a kind name. Unknown names are `Info`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    /// Returns the kind name used in the class list.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Delay between creation and `show`.
    pub show_delay: Millis,
    /// Time after creation at which a shown notification hides itself.
    pub dismiss_after: Millis,
    /// Time between hiding and removal.
    pub fade_out: Millis,
    /// Accessible label of the close button.
    pub close_label: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            show_delay: 10.0,
            dismiss_after: 5000.0,
            fade_out: 300.0,
            close_label: "Close".to_owned(),
        }
    }
}

/// Lifecycle of one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    /// In the page, not yet shown.
    Pending,
    /// Carries `show`.
    Shown,
    /// Fading out.
    Hiding,
    /// Gone from the page.
    Removed,
}

#[derive(Debug, Clone)]
struct Notification {
    element: ElementId,
    close_button: ElementId,
    message: String,
    kind: NotificationKind,
    phase: NotificationPhase,
    created_at: Millis,
    remove_at: Option<Millis>,
}

/// Owns every notification on screen.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    config: NotificationConfig,
    active: Vec<Notification>,
}

impl NotificationCenter {
    /// Creates an empty center.
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
        }
    }

    /// Queues a notification and returns its element.
    pub fn show(
        &mut self,
        now: Millis,
        message: &str,
        kind: NotificationKind,
        patches: &mut PatchBuffer,
    ) -> ElementId {
        let element = patches.create(
            None,
            NodeSpec::new("div")
                .class("notification")
                .class(format!("notification-{kind}")),
        );
        patches.create(Some(element), NodeSpec::new("span").text(message));
        let close_button = patches.create(
            Some(element),
            NodeSpec::new("button")
                .class("notification-close")
                .attr("aria-label", self.config.close_label.as_str())
                .text("\u{00d7}"),
        );

        self.active.push(Notification {
            element,
            close_button,
            message: message.to_owned(),
            kind,
            phase: NotificationPhase::Pending,
            created_at: now,
            remove_at: None,
        });
        element
    }

    /// Returns the number of notifications still in the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns true if nothing is on screen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Returns the phase of a notification. Removed ones are forgotten and
    /// report `Removed`.
    #[must_use]
    pub fn phase(&self, element: ElementId) -> NotificationPhase {
        self.active
            .iter()
            .find(|n| n.element == element)
            .map_or(NotificationPhase::Removed, |n| n.phase)
    }

    /// Returns the message and kind of every notification in the page.
    pub fn messages(&self) -> impl Iterator<Item = (&str, NotificationKind)> {
        self.active.iter().map(|n| (n.message.as_str(), n.kind))
    }

    /// Handles a click. Returns true if it closed a notification.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        now: Millis,
        patches: &mut PatchBuffer,
    ) -> bool {
        let fade_out = self.config.fade_out;
        let Some(notification) = self.active.iter_mut().find(|n| {
            matches!(n.phase, NotificationPhase::Pending | NotificationPhase::Shown)
                && locator.contains(n.close_button, target)
        }) else {
            return false;
        };

        Self::hide(notification, now, fade_out, patches);
        true
    }

    fn hide(notification: &mut Notification, now: Millis, fade_out: Millis, patches: &mut PatchBuffer) {
        patches.remove_class(notification.element, class::SHOW);
        notification.phase = NotificationPhase::Hiding;
        notification.remove_at = Some(now + fade_out);
    }

    /// Advances every notification's phase.
    pub fn tick(&mut self, now: Millis, patches: &mut PatchBuffer) {
        let NotificationConfig {
            show_delay,
            dismiss_after,
            fade_out,
            ..
        } = self.config;

        for notification in &mut self.active {
            if notification.phase == NotificationPhase::Pending
                && now >= notification.created_at + show_delay
            {
                patches.add_class(notification.element, class::SHOW);
                notification.phase = NotificationPhase::Shown;
            }
            if notification.phase == NotificationPhase::Shown
                && now >= notification.created_at + dismiss_after
            {
                Self::hide(notification, now, fade_out, patches);
            }
            if notification.phase == NotificationPhase::Hiding
                && notification.remove_at.is_some_and(|at| now >= at)
            {
                patches.push(DomPatch::Remove {
                    element: notification.element,
                });
                notification.phase = NotificationPhase::Removed;
            }
        }

        self.active.retain(|n| n.phase != NotificationPhase::Removed);
    }
}

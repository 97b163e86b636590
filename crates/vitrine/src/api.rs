//! Public programmatic surface of the page.

use vitrine_ui::NotificationKind;

use crate::events::{EventSender, SiteEvent};

/// Crate version, reported as `SiteApi::version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handle given to page scripts. Every call is queued on the event bus and
/// takes effect on the next tick.
#[derive(Clone)]
pub struct SiteApi {
    sender: EventSender,
}

impl SiteApi {
    /// Creates a handle sending to `sender`.
    #[must_use]
    pub const fn new(sender: EventSender) -> Self {
        Self { sender }
    }

    /// Returns the version string.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        VERSION
    }

    /// Smooth-scrolls to the first element matching `selector`. Returns
    /// false if the request was dropped.
    pub fn scroll_to_element(&self, selector: &str) -> bool {
        self.sender.send(SiteEvent::ScrollToElement(selector.to_owned()))
    }

    /// Shows a notification. Returns false if the request was dropped.
    pub fn show_notification(&self, message: &str, kind: NotificationKind) -> bool {
        self.sender.send(SiteEvent::ShowNotification {
            message: message.to_owned(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    #[test]
    fn test_calls_are_queued() {
        let (tx, rx) = EventBus::create_pair(4);
        let api = SiteApi::new(tx);
        assert_eq!(api.version(), "1.0.0");

        assert!(api.scroll_to_element("#contact"));
        assert!(api.show_notification("Hi", NotificationKind::Success));
        assert_eq!(
            rx.drain(),
            vec![
                SiteEvent::ScrollToElement("#contact".into()),
                SiteEvent::ShowNotification {
                    message: "Hi".into(),
                    kind: NotificationKind::Success,
                },
            ]
        );
    }
}

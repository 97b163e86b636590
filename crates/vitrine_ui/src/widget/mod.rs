//! Widgets layered on top of the core controllers.
//!
//! Notifications are always available. The rest are optional and only
//! mounted when the site configuration enables them.

mod accordion;
mod consent;
mod modal;
mod notification;
mod search;
mod tabs;

pub use accordion::Accordion;
pub use consent::{ConsentFlag, CookieBanner, CookieBannerText, CONSENT_KEY};
pub use modal::Modal;
pub use notification::{NotificationCenter, NotificationConfig, NotificationKind, NotificationPhase};
pub use search::SearchFilter;
pub use tabs::TabManager;

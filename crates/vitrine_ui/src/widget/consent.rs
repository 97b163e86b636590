//! Cookie consent banner.

use std::fmt;

use crate::dom::{ElementId, ElementLocator};
use crate::render::{DomPatch, NodeSpec, PatchBuffer};
use crate::style::COOKIE_BANNER_STYLE;

/// Storage key of the consent decision.
pub const CONSENT_KEY: &str = "cookie_consent";

/// The visitor's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentFlag {
    /// Cookies accepted.
    Accepted,
    /// Cookies declined.
    Declined,
}

impl ConsentFlag {
    /// Returns the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parses a stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

impl fmt::Display for ConsentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banner wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieBannerText {
    /// Explanation paragraph.
    pub message: String,
    /// Accept button label.
    pub accept: String,
    /// Decline button label.
    pub decline: String,
}

impl Default for CookieBannerText {
    fn default() -> Self {
        Self {
            message: "This site uses cookies to improve your experience. By continuing to \
                      browse, you accept our use of cookies."
                .to_owned(),
            accept: "Accept".to_owned(),
            decline: "Decline".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Banner {
    root: ElementId,
    accept: ElementId,
    decline: ElementId,
}

/// Shows the banner until the visitor decides.
#[derive(Debug, Clone)]
pub struct CookieBanner {
    banner: Option<Banner>,
}

impl CookieBanner {
    /// Queues the banner unless a decision is already stored.
    pub fn mount(stored: Option<&str>, text: &CookieBannerText, patches: &mut PatchBuffer) -> Self {
        if stored.is_some_and(|value| !value.is_empty()) {
            return Self { banner: None };
        }

        let mut spec = NodeSpec::new("div").class("cookie-banner");
        for (property, value) in COOKIE_BANNER_STYLE {
            spec = spec.style(property, value);
        }
        let root = patches.create(None, spec);
        let content = patches.create(Some(root), NodeSpec::new("div").class("cookie-content"));
        patches.create(Some(content), NodeSpec::new("p").text(text.message.as_str()));
        let actions = patches.create(Some(content), NodeSpec::new("div").class("cookie-actions"));
        let accept = patches.create(
            Some(actions),
            NodeSpec::new("button")
                .class("btn")
                .class("btn-primary")
                .class("btn-accept")
                .text(text.accept.as_str()),
        );
        let decline = patches.create(
            Some(actions),
            NodeSpec::new("button")
                .class("btn")
                .class("btn-secondary")
                .class("btn-decline")
                .text(text.decline.as_str()),
        );

        Self {
            banner: Some(Banner {
                root,
                accept,
                decline,
            }),
        }
    }

    /// Returns true while the banner is in the page.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.banner.is_some()
    }

    /// Handles a click. Returns the decision when a button was pressed; the
    /// caller persists it. The banner is removed either way.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        patches: &mut PatchBuffer,
    ) -> Option<ConsentFlag> {
        let banner = self.banner?;
        let flag = if locator.contains(banner.accept, target) {
            ConsentFlag::Accepted
        } else if locator.contains(banner.decline, target) {
            ConsentFlag::Declined
        } else {
            return None;
        };

        patches.push(DomPatch::Remove {
            element: banner.root,
        });
        self.banner = None;
        Some(flag)
    }
}

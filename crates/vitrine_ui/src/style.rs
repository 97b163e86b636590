//! Presentation vocabulary.
//!
//! The class names and inline declarations the page stylesheet expects.
//! Controllers derive these from state in their render step; nothing here
//! is read back as state.

/// Class names shared with the stylesheet.
pub mod class {
    /// Open menu, active link, tab, panel, accordion item or modal.
    pub const ACTIVE: &str = "active";
    /// Nav past the scrolled threshold.
    pub const SCROLLED: &str = "scrolled";
    /// Visible scroll-top button.
    pub const VISIBLE: &str = "visible";
    /// Lazy image whose source was swapped in.
    pub const LOADED: &str = "loaded";
    /// Image replaced by the placeholder.
    pub const ERROR_IMAGE: &str = "error-image";
    /// Invalid form control.
    pub const ERROR: &str = "error";
    /// Inline field error node.
    pub const FIELD_ERROR: &str = "field-error";
    /// Notification on screen.
    pub const SHOW: &str = "show";
    /// Search result that matched.
    pub const FADE_IN: &str = "fade-in";
    /// Scroll-top button.
    pub const SCROLL_TOP_BUTTON: &str = "scroll-top-btn";
    /// Empty-search message.
    pub const NO_RESULTS: &str = "no-results-message";
}

/// One inline style declaration.
pub type Declaration = (&'static str, &'static str);

/// Fade-in start state, applied before observation begins.
pub const FADE_HIDDEN: [Declaration; 3] = [
    ("opacity", "0"),
    ("transform", "translateY(20px)"),
    ("transition", "opacity 0.6s ease, transform 0.6s ease"),
];

/// Fade-in end state. The declared transition interpolates to it.
pub const FADE_REVEALED: [Declaration; 2] = [("opacity", "1"), ("transform", "translateY(0)")];

/// Inline styling for a field error node.
pub const FIELD_ERROR_STYLE: [Declaration; 3] = [
    ("color", "var(--error)"),
    ("font-size", "0.875rem"),
    ("margin-top", "0.25rem"),
];

/// Inline styling for the empty-search message.
pub const NO_RESULTS_STYLE: [Declaration; 3] = [
    ("text-align", "center"),
    ("padding", "2rem"),
    ("color", "var(--gray)"),
];

/// Inline styling for the cookie banner.
pub const COOKIE_BANNER_STYLE: [Declaration; 8] = [
    ("position", "fixed"),
    ("bottom", "0"),
    ("left", "0"),
    ("right", "0"),
    ("background-color", "var(--dark)"),
    ("color", "var(--white)"),
    ("padding", "1.5rem"),
    ("z-index", "var(--z-modal)"),
];

/// Inline SVG shown in place of an image that failed to load.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" \
width=\"400\" height=\"300\"%3E%3Crect fill=\"%23f1f5f9\" width=\"400\" height=\"300\"/%3E%3Ctext \
x=\"50%25\" y=\"50%25\" dominant-baseline=\"middle\" text-anchor=\"middle\" fill=\"%2364748b\" \
font-family=\"Arial\" font-size=\"16\"%3EImage unavailable%3C/text%3E%3C/svg%3E";

/// Formats a pixel length.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

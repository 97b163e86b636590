//! Page geometry.
//!
//! All coordinates are document pixels: `y` grows downwards from the top of
//! the page, independent of the current scroll offset.

use serde::Deserialize;

/// A rectangle in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f64,
    /// Y position (top edge).
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a full-width band starting at `top`.
    #[must_use]
    pub const fn band(top: f64, height: f64) -> Self {
        Self::new(0.0, top, 0.0, height)
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && self.contains_y(y)
    }

    /// Returns true if `y` falls in `[top, bottom)`.
    #[must_use]
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y && y < self.bottom()
    }
}

/// The vertical extent of an identified page section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBounds {
    /// The section's `id` attribute.
    pub id: String,
    /// Measured box.
    pub rect: Rect,
}

impl SectionBounds {
    /// Creates section bounds.
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self { id: id.into(), rect }
    }

    /// Returns true if the probe line lies inside this section.
    #[inline]
    #[must_use]
    pub fn contains(&self, probe: f64) -> bool {
        self.rect.contains_y(probe)
    }
}

/// Responsive layout class derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakpoint {
    /// Below the mobile breakpoint.
    Mobile,
    /// Between mobile and tablet.
    Tablet,
    /// Between tablet and desktop.
    Laptop,
    /// At or above the desktop breakpoint.
    #[default]
    Desktop,
}

/// Responsive breakpoints in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// Upper bound of the mobile class.
    pub mobile: f64,
    /// Upper bound of the tablet class.
    pub tablet: f64,
    /// Lower bound of the desktop class.
    pub desktop: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile: 576.0,
            tablet: 992.0,
            desktop: 1200.0,
        }
    }
}

impl Breakpoints {
    /// Classifies a viewport width.
    #[must_use]
    pub fn classify(&self, width: f64) -> Breakpoint {
        if width < self.mobile {
            Breakpoint::Mobile
        } else if width < self.tablet {
            Breakpoint::Tablet
        } else if width < self.desktop {
            Breakpoint::Laptop
        } else {
            Breakpoint::Desktop
        }
    }

    /// Returns true if the values are strictly increasing.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.mobile > 0.0 && self.mobile < self.tablet && self.tablet < self.desktop
    }
}

//! Viewport scroll tracking.
//!
//! Every consumer of the scroll offset owns its own [`ScrollTracker`], and
//! with it its own throttle window. Consumers never share mutable state, so
//! the order in which they see a scroll tick does not matter.

use crate::dom::{ElementId, ElementLocator};
use crate::rate_limit::{Millis, Throttle};
use crate::render::{NodeSpec, PatchBuffer};
use crate::style::class;

/// Sign of the last scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// No movement recorded yet, or the last delta was zero.
    #[default]
    Still,
    /// Offset increased.
    Down,
    /// Offset decreased.
    Up,
}

impl ScrollDirection {
    fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Down
        } else if delta < 0.0 {
            Self::Up
        } else {
            Self::Still
        }
    }
}

/// Derived scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Vertical offset.
    pub offset: f64,
    /// Direction of the last change.
    pub direction: ScrollDirection,
}

/// Samples the scroll offset at most once per throttle window.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    throttle: Throttle,
    state: ScrollState,
}

impl ScrollTracker {
    /// Creates a tracker with the given throttle window.
    #[must_use]
    pub const fn new(throttle: Millis) -> Self {
        Self {
            throttle: Throttle::new(throttle),
            state: ScrollState {
                offset: 0.0,
                direction: ScrollDirection::Still,
            },
        }
    }

    /// Records `offset` unconditionally.
    pub fn record(&mut self, offset: f64) -> ScrollState {
        self.state = ScrollState {
            offset,
            direction: ScrollDirection::of(offset - self.state.offset),
        };
        self.state
    }

    /// Records `offset` if the throttle window is open. Returns the new state
    /// on a passing tick.
    pub fn sample(&mut self, now: Millis, offset: f64) -> Option<ScrollState> {
        if self.throttle.try_pass(now) {
            Some(self.record(offset))
        } else {
            None
        }
    }

    /// Returns the last recorded state.
    #[must_use]
    pub const fn state(&self) -> ScrollState {
        self.state
    }
}

/// Floating "back to top" button.
///
/// Created at mount. Visible while the offset is above the threshold.
#[derive(Debug, Clone)]
pub struct ScrollTopButton {
    button: ElementId,
    threshold: f64,
    tracker: ScrollTracker,
    visible: bool,
}

impl ScrollTopButton {
    /// Queues the button's creation and returns the controller.
    pub fn mount(
        patches: &mut PatchBuffer,
        threshold: f64,
        throttle: Millis,
        label: &str,
    ) -> Self {
        let button = patches.create(
            None,
            NodeSpec::new("button")
                .class(class::SCROLL_TOP_BUTTON)
                .attr("aria-label", label)
                .text("\u{2191}"),
        );

        Self {
            button,
            threshold,
            tracker: ScrollTracker::new(throttle),
            visible: false,
        }
    }

    /// Returns the button element.
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.button
    }

    /// Returns true while the button is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handles a scroll event.
    pub fn on_scroll(&mut self, now: Millis, offset: f64, patches: &mut PatchBuffer) {
        let Some(state) = self.tracker.sample(now, offset) else {
            return;
        };

        let visible = state.offset > self.threshold;
        if visible != self.visible {
            self.visible = visible;
            patches.toggle_class(self.button, class::VISIBLE, visible);
        }
    }

    /// Returns true if the click landed on the button. The caller scrolls the
    /// page to the top.
    pub fn on_click(&self, locator: &impl ElementLocator, target: ElementId) -> bool {
        locator.contains(self.button, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, MemoryDom};

    #[test]
    fn test_direction_follows_delta() {
        let mut tracker = ScrollTracker::new(100.0);

        assert_eq!(tracker.record(120.0).direction, ScrollDirection::Down);
        assert_eq!(tracker.record(80.0).direction, ScrollDirection::Up);
        assert_eq!(tracker.record(80.0).direction, ScrollDirection::Still);
    }

    #[test]
    fn test_sample_is_throttled() {
        let mut tracker = ScrollTracker::new(100.0);

        assert!(tracker.sample(0.0, 10.0).is_some());
        assert!(tracker.sample(50.0, 20.0).is_none());
        assert_eq!(tracker.state().offset, 10.0);
        assert!(tracker.sample(100.0, 30.0).is_some());
        assert_eq!(tracker.state().offset, 30.0);
    }

    #[test]
    fn test_scroll_top_button_visibility() {
        let mut dom = MemoryDom::new();
        let mut patches = PatchBuffer::new();
        let mut button = ScrollTopButton::mount(&mut patches, 500.0, 100.0, "Back to top");

        button.on_scroll(0.0, 600.0, &mut patches);
        for patch in patches.drain() {
            dom.apply(patch);
        }
        assert!(button.is_visible());
        assert!(dom.has_class(button.element(), class::VISIBLE));

        // Inside the window: ignored.
        button.on_scroll(50.0, 0.0, &mut patches);
        assert!(patches.is_empty());

        button.on_scroll(200.0, 500.0, &mut patches);
        for patch in patches.drain() {
            dom.apply(patch);
        }
        assert!(!dom.has_class(button.element(), class::VISIBLE));
        assert!(button.on_click(&dom, button.element()));
    }
}

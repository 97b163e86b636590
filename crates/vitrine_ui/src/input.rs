//! Platform input events.
//!
//! The browser adapter (or a test) translates DOM events into
//! [`InputEvent`]s; the site root routes them to the controllers.

use crate::dom::ElementId;

/// Keyboard key, reduced to the keys the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Anything else.
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            _ => Self::Other,
        }
    }
}

/// An event delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The page scrolled.
    Scroll {
        /// New vertical offset.
        offset: f64,
    },
    /// The viewport changed size.
    Resize {
        /// Viewport width.
        width: f64,
        /// Viewport height.
        height: f64,
    },
    /// A click landed on `target` (the innermost element).
    Click {
        /// Clicked element.
        target: ElementId,
    },
    /// A key was pressed anywhere on the page.
    KeyDown(Key),
    /// An observed element entered or left the viewport.
    Visibility {
        /// Observed element.
        element: ElementId,
        /// True when intersecting.
        visible: bool,
    },
    /// A form control lost focus.
    Blur {
        /// The control.
        field: ElementId,
        /// Its value at that moment.
        value: String,
    },
    /// A form control's value changed.
    Input {
        /// The control.
        field: ElementId,
        /// The new value.
        value: String,
    },
    /// A form was submitted.
    Submit {
        /// The form.
        form: ElementId,
    },
    /// An image failed to load.
    ImageError {
        /// The image.
        image: ElementId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("a"), Key::Other);
    }
}

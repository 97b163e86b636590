//! Render patches.
//!
//! Controllers never mutate the page. They describe the change as a
//! [`DomPatch`] and push it into a [`PatchBuffer`]; the platform applies the
//! buffer once per event or frame.

use crate::dom::ElementId;

/// A node the platform must create.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeSpec {
    /// Tag name.
    pub tag: String,
    /// Classes.
    pub classes: Vec<String>,
    /// Attributes.
    pub attributes: Vec<(String, String)>,
    /// Inline style declarations.
    pub styles: Vec<(String, String)>,
    /// Text content.
    pub text: String,
}

impl NodeSpec {
    /// Creates a spec for `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Adds a class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Adds an inline style declaration.
    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A single change to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DomPatch {
    /// Add a class.
    AddClass {
        /// Target.
        element: ElementId,
        /// Class name.
        class: String,
    },
    /// Remove a class.
    RemoveClass {
        /// Target.
        element: ElementId,
        /// Class name.
        class: String,
    },
    /// Set an inline style property. An empty value removes it.
    SetStyle {
        /// Target.
        element: ElementId,
        /// CSS property.
        property: String,
        /// CSS value.
        value: String,
    },
    /// Replace text content.
    SetText {
        /// Target.
        element: ElementId,
        /// New text.
        text: String,
    },
    /// Replace inner markup.
    SetHtml {
        /// Target.
        element: ElementId,
        /// Markup.
        html: String,
    },
    /// Set an attribute.
    SetAttribute {
        /// Target.
        element: ElementId,
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// Remove an attribute.
    RemoveAttribute {
        /// Target.
        element: ElementId,
        /// Attribute name.
        name: String,
    },
    /// Create a node and append it to `parent` (the body when `None`).
    Create {
        /// Id reserved for the new node.
        element: ElementId,
        /// Parent node.
        parent: Option<ElementId>,
        /// What to create.
        spec: NodeSpec,
    },
    /// Remove a node and its subtree.
    Remove {
        /// Target.
        element: ElementId,
    },
    /// Lock (`overflow: hidden`) or release page scrolling.
    LockScroll(bool),
    /// Scroll the page to a vertical offset.
    ScrollTo {
        /// Offset in document pixels.
        offset: f64,
    },
    /// Start reporting visibility for an element.
    Observe {
        /// Target.
        element: ElementId,
    },
    /// Stop reporting visibility for an element.
    Unobserve {
        /// Target.
        element: ElementId,
    },
    /// Reset every control of a form to its default value.
    ResetForm {
        /// The form.
        form: ElementId,
    },
}

/// Collects patches between two flushes.
pub struct PatchBuffer {
    /// Pending patches, in emission order.
    patches: Vec<DomPatch>,
    /// Next synthetic id to hand out.
    next_synthetic: u32,
}

impl PatchBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patches: Vec::with_capacity(64),
            next_synthetic: 0,
        }
    }

    /// Adds a patch.
    pub fn push(&mut self, patch: DomPatch) {
        self.patches.push(patch);
    }

    /// Adds multiple patches.
    pub fn extend(&mut self, patches: impl IntoIterator<Item = DomPatch>) {
        self.patches.extend(patches);
    }

    /// Queues the creation of a node and returns its reserved id.
    pub fn create(&mut self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let element = ElementId::synthetic(self.next_synthetic);
        self.next_synthetic += 1;
        self.patches.push(DomPatch::Create {
            element,
            parent,
            spec,
        });
        element
    }

    /// Queues `AddClass`.
    pub fn add_class(&mut self, element: ElementId, class: &str) {
        self.push(DomPatch::AddClass {
            element,
            class: class.to_owned(),
        });
    }

    /// Queues `RemoveClass`.
    pub fn remove_class(&mut self, element: ElementId, class: &str) {
        self.push(DomPatch::RemoveClass {
            element,
            class: class.to_owned(),
        });
    }

    /// Queues `AddClass` or `RemoveClass`.
    pub fn toggle_class(&mut self, element: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }

    /// Queues `SetStyle`.
    pub fn set_style(&mut self, element: ElementId, property: &str, value: impl Into<String>) {
        self.push(DomPatch::SetStyle {
            element,
            property: property.to_owned(),
            value: value.into(),
        });
    }

    /// Queues `SetText`.
    pub fn set_text(&mut self, element: ElementId, text: impl Into<String>) {
        self.push(DomPatch::SetText {
            element,
            text: text.into(),
        });
    }

    /// Queues `SetAttribute`.
    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: impl Into<String>) {
        self.push(DomPatch::SetAttribute {
            element,
            name: name.to_owned(),
            value: value.into(),
        });
    }

    /// Queues `RemoveAttribute`.
    pub fn remove_attribute(&mut self, element: ElementId, name: &str) {
        self.push(DomPatch::RemoveAttribute {
            element,
            name: name.to_owned(),
        });
    }

    /// Takes every pending patch, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<DomPatch> {
        std::mem::take(&mut self.patches)
    }

    /// Returns the pending patches.
    #[must_use]
    pub fn patches(&self) -> &[DomPatch] {
        &self.patches
    }

    /// Returns the pending patch count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl Default for PatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_drain() {
        let mut buffer = PatchBuffer::new();
        buffer.add_class(ElementId::new(3), "active");
        buffer.push(DomPatch::LockScroll(true));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_created_ids_are_unique_and_synthetic() {
        let mut buffer = PatchBuffer::new();
        let a = buffer.create(None, NodeSpec::new("div").class("notification"));
        let b = buffer.create(Some(a), NodeSpec::new("span").text("hi"));

        assert_ne!(a, b);
        assert!(a.is_synthetic());
        assert!(b.is_synthetic());
    }
}

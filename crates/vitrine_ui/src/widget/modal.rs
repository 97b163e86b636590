//! Modal dialog.
//!
//! One dialog per page, created at mount. `[data-modal]` triggers open it
//! with their attribute value as body markup.

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::input::Key;
use crate::render::{DomPatch, NodeSpec, PatchBuffer};
use crate::style::class;

/// The page's modal dialog.
#[derive(Debug, Clone)]
pub struct Modal {
    root: ElementId,
    overlay: ElementId,
    close_button: ElementId,
    body: ElementId,
    triggers: Vec<(ElementId, String)>,
    open: bool,
}

impl Modal {
    /// Queues the dialog's creation and collects the triggers.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(
        locator: &impl ElementLocator,
        close_label: &str,
        patches: &mut PatchBuffer,
    ) -> UiResult<Self> {
        let triggers = locator
            .query_all("[data-modal]")?
            .into_iter()
            .map(|el| (el, locator.attribute(el, "data-modal").unwrap_or_default()))
            .collect();

        let root = patches.create(None, NodeSpec::new("div").class("modal"));
        let overlay = patches.create(Some(root), NodeSpec::new("div").class("modal-overlay"));
        let content = patches.create(Some(root), NodeSpec::new("div").class("modal-content"));
        let close_button = patches.create(
            Some(content),
            NodeSpec::new("button")
                .class("modal-close")
                .attr("aria-label", close_label)
                .text("\u{00d7}"),
        );
        let body = patches.create(Some(content), NodeSpec::new("div").class("modal-body"));

        Ok(Self {
            root,
            overlay,
            close_button,
            body,
            triggers,
            open: false,
        })
    }

    /// Returns true while the dialog is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the dialog element.
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.root
    }

    /// Returns true if `target` is inside one of the dialog's triggers.
    #[must_use]
    pub fn owns_trigger(&self, locator: &impl ElementLocator, target: ElementId) -> bool {
        self.triggers.iter().any(|(el, _)| locator.contains(*el, target))
    }

    /// Shows `content` and locks page scrolling.
    pub fn open(&mut self, content: &str, patches: &mut PatchBuffer) {
        patches.push(DomPatch::SetHtml {
            element: self.body,
            html: content.to_owned(),
        });
        patches.add_class(self.root, class::ACTIVE);
        patches.push(DomPatch::LockScroll(true));
        self.open = true;
    }

    /// Hides the dialog and releases the scroll lock.
    pub fn close(&mut self, patches: &mut PatchBuffer) {
        patches.remove_class(self.root, class::ACTIVE);
        patches.push(DomPatch::LockScroll(false));
        self.open = false;
    }

    /// Handles a click. Returns true if it opened or closed the dialog.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        patches: &mut PatchBuffer,
    ) -> bool {
        let trigger = self
            .triggers
            .iter()
            .find(|(el, _)| locator.contains(*el, target))
            .map(|(_, content)| content.clone());
        if let Some(content) = trigger {
            self.open(&content, patches);
            return true;
        }

        if locator.contains(self.close_button, target) || locator.contains(self.overlay, target) {
            self.close(patches);
            return true;
        }
        false
    }

    /// Handles a key press. Escape closes an open dialog.
    pub fn on_key(&mut self, key: Key, patches: &mut PatchBuffer) -> bool {
        if key == Key::Escape && self.open {
            self.close(patches);
            return true;
        }
        false
    }
}

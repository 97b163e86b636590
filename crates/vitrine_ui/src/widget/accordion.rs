//! Accordions. Items open and close independently.

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::render::PatchBuffer;
use crate::style::{class, px};

#[derive(Debug, Clone)]
struct AccordionItem {
    root: ElementId,
    header: ElementId,
    content: ElementId,
    open: bool,
}

/// Every accordion item on the page.
#[derive(Debug, Clone)]
pub struct Accordion {
    items: Vec<AccordionItem>,
}

impl Accordion {
    /// Collects items matching `selector` that have both a header and a
    /// content element. Returns `None` when the page has no item.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(locator: &impl ElementLocator, selector: &str) -> UiResult<Option<Self>> {
        let roots = locator.query_all(selector)?;
        if roots.is_empty() {
            return Ok(None);
        }

        let mut items = Vec::with_capacity(roots.len());
        for root in roots {
            let header = locator.query_within(root, ".accordion-header")?;
            let content = locator.query_within(root, ".accordion-content")?;
            if let (Some(header), Some(content)) = (header, content) {
                items.push(AccordionItem {
                    root,
                    header,
                    content,
                    open: false,
                });
            }
        }

        Ok(Some(Self { items }))
    }

    /// Handles a click. Returns true if it toggled an item.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        patches: &mut PatchBuffer,
    ) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| locator.contains(item.header, target))
        else {
            return false;
        };

        item.open = !item.open;
        patches.toggle_class(item.root, class::ACTIVE, item.open);
        let max_height = if item.open {
            px(locator.scroll_height(item.content))
        } else {
            "0".to_owned()
        };
        patches.set_style(item.content, "max-height", max_height);
        true
    }

    /// Closes every item.
    pub fn close_all(&mut self, patches: &mut PatchBuffer) {
        for item in &mut self.items {
            item.open = false;
            patches.remove_class(item.root, class::ACTIVE);
            patches.set_style(item.content, "max-height", "0");
        }
    }

    /// Returns true if the `index`th item is open.
    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| item.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, MemoryDom};

    #[test]
    fn test_open_uses_scroll_height() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let item = dom.element(body, "div").class("accordion").build();
        let header = dom.element(item, "button").class("accordion-header").build();
        let content = dom
            .element(item, "div")
            .class("accordion-content")
            .scroll_height(240.0)
            .build();

        let mut accordion = Accordion::mount(&dom, ".accordion").unwrap().unwrap();
        let mut patches = PatchBuffer::new();

        assert!(accordion.on_click(&dom, header, &mut patches));
        for patch in patches.drain() {
            dom.apply(patch);
        }
        assert!(accordion.is_open(0));
        assert!(dom.has_class(item, class::ACTIVE));
        assert_eq!(dom.style(content, "max-height"), Some("240px"));

        accordion.on_click(&dom, header, &mut patches);
        for patch in patches.drain() {
            dom.apply(patch);
        }
        assert!(!accordion.is_open(0));
        assert_eq!(dom.style(content, "max-height"), Some("0"));
    }
}

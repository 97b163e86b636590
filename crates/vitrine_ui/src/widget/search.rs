//! Debounced list filter.

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::rate_limit::{Debounce, Millis};
use crate::render::{DomPatch, NodeSpec, PatchBuffer};
use crate::style::{class, NO_RESULTS_STYLE};

/// Case-insensitive substring filter over a list of items.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    input: ElementId,
    items: Vec<(ElementId, String)>,
    list: Option<ElementId>,
    debounce: Debounce<String>,
    no_results: Option<ElementId>,
    no_results_text: String,
    visible: usize,
}

impl SearchFilter {
    /// Binds the input to the items. Returns `None` unless both exist.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(
        locator: &impl ElementLocator,
        input_selector: &str,
        items_selector: &str,
        wait: Millis,
        no_results_text: &str,
    ) -> UiResult<Option<Self>> {
        let Some(input) = locator.query(input_selector)? else {
            return Ok(None);
        };
        let items: Vec<_> = locator
            .query_all(items_selector)?
            .into_iter()
            .map(|el| (el, locator.text(el).to_lowercase()))
            .collect();
        let Some(&(first, _)) = items.first() else {
            return Ok(None);
        };

        Ok(Some(Self {
            input,
            list: locator.parent(first),
            visible: items.len(),
            items,
            debounce: Debounce::new(wait),
            no_results: None,
            no_results_text: no_results_text.to_owned(),
        }))
    }

    /// Records typing in the search input. Returns false for other fields.
    pub fn on_input(&mut self, field: ElementId, value: &str, now: Millis) -> bool {
        if field != self.input {
            return false;
        }
        self.debounce.call(now, value.to_owned());
        true
    }

    /// Runs the filter once the debounce deadline has passed.
    pub fn tick(&mut self, now: Millis, patches: &mut PatchBuffer) {
        if let Some(term) = self.debounce.poll(now) {
            self.filter(&term, patches);
        }
    }

    /// Returns the number of items currently shown.
    #[must_use]
    pub const fn visible_count(&self) -> usize {
        self.visible
    }

    /// Shows the items containing `term`, hides the rest.
    pub fn filter(&mut self, term: &str, patches: &mut PatchBuffer) {
        let term = term.trim().to_lowercase();

        self.visible = 0;
        for (item, text) in &self.items {
            let matched = text.contains(&term);
            patches.set_style(*item, "display", if matched { "" } else { "none" });
            patches.toggle_class(*item, class::FADE_IN, matched);
            self.visible += usize::from(matched);
        }

        if self.visible == 0 && !term.is_empty() {
            if self.no_results.is_none() {
                let mut spec = NodeSpec::new("div")
                    .class(class::NO_RESULTS)
                    .text(self.no_results_text.as_str());
                for (property, value) in NO_RESULTS_STYLE {
                    spec = spec.style(property, value);
                }
                self.no_results = Some(patches.create(self.list, spec));
            }
        } else if let Some(element) = self.no_results.take() {
            patches.push(DomPatch::Remove { element });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, MemoryDom};

    fn page() -> (MemoryDom, ElementId, Vec<ElementId>) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let input = dom.element(body, "input").class("search-input").build();
        let list = dom.element(body, "ul").build();
        let items = ["Networks", "Databases", "Network security"]
            .into_iter()
            .map(|text| dom.element(list, "li").class("search-item").text(text).build())
            .collect();
        (dom, input, items)
    }

    fn flush(dom: &mut MemoryDom, patches: &mut PatchBuffer) {
        for patch in patches.drain() {
            dom.apply(patch);
        }
    }

    #[test]
    fn test_debounced_filter() {
        let (mut dom, input, items) = page();
        let mut search = SearchFilter::mount(&dom, ".search-input", ".search-item", 300.0, "No results")
            .unwrap()
            .unwrap();
        let mut patches = PatchBuffer::new();

        assert!(search.on_input(input, "net", 0.0));
        assert!(search.on_input(input, "NETWORK", 100.0));
        search.tick(399.0, &mut patches);
        assert!(patches.is_empty());

        search.tick(400.0, &mut patches);
        flush(&mut dom, &mut patches);
        assert_eq!(search.visible_count(), 2);
        assert_eq!(dom.style(items[1], "display"), Some("none"));
        assert_eq!(dom.style(items[0], "display"), None);
        assert!(dom.has_class(items[2], class::FADE_IN));
    }

    #[test]
    fn test_no_results_message() {
        let (mut dom, _, _) = page();
        let mut search = SearchFilter::mount(&dom, ".search-input", ".search-item", 300.0, "No results")
            .unwrap()
            .unwrap();
        let mut patches = PatchBuffer::new();

        search.filter("zzz", &mut patches);
        search.filter("zzzz", &mut patches);
        flush(&mut dom, &mut patches);
        assert_eq!(dom.with_class(class::NO_RESULTS).len(), 1);

        search.filter("", &mut patches);
        flush(&mut dom, &mut patches);
        assert!(dom.with_class(class::NO_RESULTS).is_empty());
        assert_eq!(search.visible_count(), 3);
    }
}

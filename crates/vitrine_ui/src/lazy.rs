//! Deferred images.
//!
//! `img[data-src]` elements get their real source on first visibility. Every
//! image on the page falls back to an inline placeholder when it fails.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::render::{DomPatch, PatchBuffer};
use crate::reveal::ObserverOptions;
use crate::style::{class, PLACEHOLDER_IMAGE};

/// Loads deferred images and handles broken ones.
#[derive(Debug, Clone, Default)]
pub struct LazyImageLoader {
    pending: BTreeSet<ElementId>,
    images: BTreeSet<ElementId>,
    failed: BTreeSet<ElementId>,
}

impl LazyImageLoader {
    /// Visibility options for deferred images: the plain viewport, any
    /// visible pixel. Reveal targets are observed with their own options.
    pub const OBSERVER: ObserverOptions = ObserverOptions {
        threshold: 0.0,
        root_margin_bottom: 0.0,
    };

    /// Collects the page's images.
    ///
    /// With visibility reporting, deferred images are observed. Without it
    /// they all load now.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(
        locator: &impl ElementLocator,
        observe: bool,
        patches: &mut PatchBuffer,
    ) -> UiResult<Self> {
        let mut loader = Self {
            pending: locator.query_all("img[data-src]")?.into_iter().collect(),
            images: locator.query_all("img")?.into_iter().collect(),
            failed: BTreeSet::new(),
        };

        if observe {
            for &element in &loader.pending {
                patches.push(DomPatch::Observe { element });
            }
        } else {
            debug!("No visibility reporting, loading {} images now", loader.pending.len());
            let all: Vec<_> = loader.pending.iter().copied().collect();
            for image in all {
                loader.load(locator, image, patches);
            }
        }

        Ok(loader)
    }

    /// Returns the number of images not loaded yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Handles a visibility report. Returns false for unrelated elements.
    pub fn on_visibility(
        &mut self,
        locator: &impl ElementLocator,
        image: ElementId,
        visible: bool,
        patches: &mut PatchBuffer,
    ) -> bool {
        if !self.pending.contains(&image) {
            return false;
        }
        if visible {
            self.load(locator, image, patches);
            patches.push(DomPatch::Unobserve { element: image });
        }
        true
    }

    /// Swaps `data-src` into `src`. Does nothing without `data-src`.
    pub fn load(&mut self, locator: &impl ElementLocator, image: ElementId, patches: &mut PatchBuffer) {
        self.pending.remove(&image);
        let Some(source) = locator.attribute(image, "data-src") else {
            return;
        };

        patches.set_attribute(image, "src", source);
        patches.remove_attribute(image, "data-src");
        patches.add_class(image, class::LOADED);
    }

    /// Replaces a broken image with the placeholder. Returns false for
    /// elements that are not page images, and for the placeholder failing
    /// in turn.
    pub fn on_error(&mut self, image: ElementId, patches: &mut PatchBuffer) -> bool {
        if !self.images.contains(&image) || !self.failed.insert(image) {
            return false;
        }

        patches.set_attribute(image, "src", PLACEHOLDER_IMAGE);
        patches.add_class(image, class::ERROR_IMAGE);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, MemoryDom};

    fn flush(dom: &mut MemoryDom, patches: &mut PatchBuffer) {
        for patch in patches.drain() {
            dom.apply(patch);
        }
    }

    fn page() -> (MemoryDom, ElementId, ElementId) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let lazy = dom
            .element(body, "img")
            .attr("data-src", "/img/campus.jpg")
            .build();
        let eager = dom.element(body, "img").attr("src", "/img/logo.png").build();
        (dom, lazy, eager)
    }

    #[test]
    fn test_loads_on_first_visibility() {
        let (mut dom, lazy, _) = page();
        let mut patches = PatchBuffer::new();
        let mut loader = LazyImageLoader::mount(&dom, true, &mut patches).unwrap();
        flush(&mut dom, &mut patches);
        assert!(dom.is_observed(lazy));

        assert!(loader.on_visibility(&dom, lazy, true, &mut patches));
        flush(&mut dom, &mut patches);

        assert_eq!(dom.attribute(lazy, "src").as_deref(), Some("/img/campus.jpg"));
        assert!(!dom.has_attribute(lazy, "data-src"));
        assert!(dom.has_class(lazy, class::LOADED));
        assert!(!dom.is_observed(lazy));
        assert_eq!(loader.pending(), 0);

        // Second report is not ours anymore.
        assert!(!loader.on_visibility(&dom, lazy, true, &mut patches));
    }

    #[test]
    fn test_loads_everything_without_observer() {
        let (mut dom, lazy, _) = page();
        dom.set_intersection_supported(false);
        let mut patches = PatchBuffer::new();
        LazyImageLoader::mount(&dom, false, &mut patches).unwrap();
        flush(&mut dom, &mut patches);

        assert!(dom.has_class(lazy, class::LOADED));
    }

    #[test]
    fn test_images_use_the_plain_viewport() {
        let options = LazyImageLoader::OBSERVER;
        assert_eq!(options.threshold, 0.0);
        assert_eq!(options.root_margin(), "0px 0px 0px 0px");
        assert_ne!(options, ObserverOptions::default());
    }

    #[test]
    fn test_load_without_data_src_is_noop() {
        let (dom, _, eager) = page();
        let mut patches = PatchBuffer::new();
        let mut loader = LazyImageLoader::mount(&dom, true, &mut patches).unwrap();
        patches.drain();

        loader.load(&dom, eager, &mut patches);
        assert!(patches.is_empty());
    }

    #[test]
    fn test_error_uses_placeholder_once() {
        let (mut dom, _, eager) = page();
        let mut patches = PatchBuffer::new();
        let mut loader = LazyImageLoader::mount(&dom, true, &mut patches).unwrap();
        patches.drain();

        assert!(loader.on_error(eager, &mut patches));
        flush(&mut dom, &mut patches);
        assert_eq!(dom.attribute(eager, "src").as_deref(), Some(PLACEHOLDER_IMAGE));
        assert!(dom.has_class(eager, class::ERROR_IMAGE));

        assert!(!loader.on_error(eager, &mut patches));
        assert!(!loader.on_error(dom.body(), &mut patches));
    }
}

//! Navigation controller.
//!
//! Owns the mobile menu (open/closed) and the active-section link. State is
//! kept in [`NavState`]; every transition renders the difference as patches.
//!
//! Active section: a section matches when `offset + probe` lies in
//! `[top, top + height)`. The first match in document order wins. When
//! nothing matches, the previous link stays active.

use tracing::debug;

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::input::Key;
use crate::layout::SectionBounds;
use crate::rate_limit::Millis;
use crate::render::{DomPatch, PatchBuffer};
use crate::scroll::ScrollTracker;
use crate::style::class;

/// Navigation tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavConfig {
    /// Distance below the viewport top used to pick the active section.
    pub active_probe_offset: f64,
    /// Fixed header height subtracted from smooth-scroll targets.
    pub header_offset: f64,
    /// Offset past which the nav carries the `scrolled` class.
    pub scrolled_threshold: f64,
    /// Scroll throttle window.
    pub scroll_throttle: Millis,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            active_probe_offset: 100.0,
            header_offset: 70.0,
            scrolled_threshold: 50.0,
            scroll_throttle: 100.0,
        }
    }
}

/// Observable navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    /// True while the mobile menu is open.
    pub menu_open: bool,
    /// Id of the section whose link is active.
    pub active_section: Option<String>,
}

/// What the caller must do after a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavAction {
    /// Not a navigation click.
    Ignored,
    /// Handled entirely by the controller.
    Handled,
    /// A link was followed: smooth-scroll the page to `offset`.
    ScrollTo {
        /// Destination offset.
        offset: f64,
    },
}

#[derive(Debug, Clone)]
struct NavLink {
    element: ElementId,
    href: Option<String>,
}

/// Sticky navigation with a mobile menu and section highlighting.
#[derive(Debug, Clone)]
pub struct NavController {
    config: NavConfig,
    nav: ElementId,
    toggle: Option<ElementId>,
    menu: Option<ElementId>,
    links: Vec<NavLink>,
    section_elements: Vec<ElementId>,
    sections: Vec<SectionBounds>,
    state: NavState,
    tracker: ScrollTracker,
    scrolled: bool,
}

impl NavController {
    /// Finds the navigation on the page. Returns `None` without `#main-nav`.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(locator: &impl ElementLocator, config: NavConfig) -> UiResult<Option<Self>> {
        let Some(nav) = locator.query("#main-nav")? else {
            return Ok(None);
        };

        let links = locator
            .query_all(".nav-link")?
            .into_iter()
            .map(|element| NavLink {
                element,
                href: locator.attribute(element, "href"),
            })
            .collect();

        let mut controller = Self {
            config,
            nav,
            toggle: locator.query(".nav-toggle")?,
            menu: locator.query(".nav-links")?,
            links,
            section_elements: locator.query_all("section[id]")?,
            sections: Vec::new(),
            state: NavState::default(),
            tracker: ScrollTracker::new(config.scroll_throttle),
            scrolled: false,
        };
        controller.refresh_sections(locator);

        debug!(
            "Navigation mounted: {} links, {} sections",
            controller.links.len(),
            controller.sections.len()
        );
        Ok(Some(controller))
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &NavState {
        &self.state
    }

    /// Returns true while the menu is open.
    #[must_use]
    pub const fn is_menu_open(&self) -> bool {
        self.state.menu_open
    }

    /// Returns the active section id.
    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        self.state.active_section.as_deref()
    }

    /// Returns the measured section bounds.
    #[must_use]
    pub fn sections(&self) -> &[SectionBounds] {
        &self.sections
    }

    /// Re-measures every section.
    pub fn refresh_sections(&mut self, locator: &impl ElementLocator) {
        self.sections = self
            .section_elements
            .iter()
            .filter_map(|&section| {
                let id = locator.attribute(section, "id")?;
                Some(SectionBounds::new(id, locator.layout_box(section)))
            })
            .collect();
    }

    /// Returns true if `target` is inside a navigation link.
    #[must_use]
    pub fn owns_link(&self, locator: &impl ElementLocator, target: ElementId) -> bool {
        self.links.iter().any(|l| locator.contains(l.element, target))
    }

    /// Flips the menu.
    pub fn toggle_menu(&mut self, patches: &mut PatchBuffer) {
        self.state.menu_open = !self.state.menu_open;
        self.render_menu(patches);
    }

    /// Closes the menu. Always releases the scroll lock.
    pub fn close_menu(&mut self, patches: &mut PatchBuffer) {
        self.state.menu_open = false;
        self.render_menu(patches);
    }

    fn render_menu(&self, patches: &mut PatchBuffer) {
        let open = self.state.menu_open;
        for element in [self.toggle, self.menu].into_iter().flatten() {
            patches.toggle_class(element, class::ACTIVE, open);
        }
        patches.push(DomPatch::LockScroll(open));
    }

    /// Handles a click anywhere on the page.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        patches: &mut PatchBuffer,
    ) -> NavAction {
        if self.toggle.is_some_and(|toggle| locator.contains(toggle, target)) {
            self.toggle_menu(patches);
            return NavAction::Handled;
        }

        if let Some(link) = self.links.iter().find(|l| locator.contains(l.element, target)) {
            let destination = link.href.as_deref().and_then(|href| match locator.query(href) {
                Ok(found) => found,
                Err(err) => {
                    debug!("Link target not resolvable: {err}");
                    None
                }
            });

            return match destination {
                Some(section) => {
                    self.close_menu(patches);
                    NavAction::ScrollTo {
                        offset: locator.layout_box(section).y - self.config.header_offset,
                    }
                }
                None => NavAction::Handled,
            };
        }

        if self.state.menu_open && !locator.contains(self.nav, target) {
            self.close_menu(patches);
            return NavAction::Handled;
        }

        NavAction::Ignored
    }

    /// Handles a key press. Escape closes an open menu.
    pub fn on_key(&mut self, key: Key, patches: &mut PatchBuffer) -> bool {
        if key == Key::Escape && self.state.menu_open {
            self.close_menu(patches);
            return true;
        }
        false
    }

    /// Handles a scroll event, at most once per throttle window.
    pub fn on_scroll(&mut self, now: Millis, offset: f64, patches: &mut PatchBuffer) {
        let Some(state) = self.tracker.sample(now, offset) else {
            return;
        };

        let scrolled = state.offset > self.config.scrolled_threshold;
        if scrolled != self.scrolled {
            self.scrolled = scrolled;
            patches.toggle_class(self.nav, class::SCROLLED, scrolled);
        }

        self.highlight_active_section(state.offset, patches);
    }

    /// Marks the link of the section under the probe line as active.
    ///
    /// Returns the active section id afterwards.
    pub fn highlight_active_section(&mut self, offset: f64, patches: &mut PatchBuffer) -> Option<&str> {
        let probe = offset + self.config.active_probe_offset;

        if let Some(section) = self.sections.iter().find(|s| s.contains(probe)) {
            if self.state.active_section.as_deref() != Some(section.id.as_str()) {
                let href = format!("#{}", section.id);
                for link in &self.links {
                    let active = link.href.as_deref() == Some(href.as_str());
                    patches.toggle_class(link.element, class::ACTIVE, active);
                }
                self.state.active_section = Some(section.id.clone());
            }
        }

        self.state.active_section.as_deref()
    }
}

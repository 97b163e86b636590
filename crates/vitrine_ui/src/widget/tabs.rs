//! Tab containers.
//!
//! Inside each container, `[data-tab]` buttons select the `[data-panel]`
//! with the same value. One tab and one panel are active per container.

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::render::PatchBuffer;
use crate::style::class;

#[derive(Debug, Clone)]
struct TabGroup {
    tabs: Vec<(ElementId, String)>,
    panels: Vec<(ElementId, String)>,
    active: Option<usize>,
}

/// Every tab container on the page.
#[derive(Debug, Clone)]
pub struct TabManager {
    groups: Vec<TabGroup>,
}

impl TabManager {
    /// Collects the containers matching `selector`. Returns `None` when
    /// there are none.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(locator: &impl ElementLocator, selector: &str) -> UiResult<Option<Self>> {
        let containers = locator.query_all(selector)?;
        if containers.is_empty() {
            return Ok(None);
        }

        let mut groups = Vec::with_capacity(containers.len());
        for container in containers {
            let valued = |name: &str| -> UiResult<Vec<(ElementId, String)>> {
                Ok(locator
                    .query_all_within(container, &format!("[{name}]"))?
                    .into_iter()
                    .map(|el| (el, locator.attribute(el, name).unwrap_or_default()))
                    .collect())
            };
            groups.push(TabGroup {
                tabs: valued("data-tab")?,
                panels: valued("data-panel")?,
                active: None,
            });
        }

        Ok(Some(Self { groups }))
    }

    /// Handles a click. Returns true if it selected a tab.
    pub fn on_click(
        &mut self,
        locator: &impl ElementLocator,
        target: ElementId,
        patches: &mut PatchBuffer,
    ) -> bool {
        for group in &mut self.groups {
            let Some(index) = group
                .tabs
                .iter()
                .position(|(tab, _)| locator.contains(*tab, target))
            else {
                continue;
            };

            let value = &group.tabs[index].1;
            for (tab, _) in &group.tabs {
                patches.remove_class(*tab, class::ACTIVE);
            }
            for (panel, _) in &group.panels {
                patches.remove_class(*panel, class::ACTIVE);
            }
            patches.add_class(group.tabs[index].0, class::ACTIVE);
            if let Some((panel, _)) = group.panels.iter().find(|(_, v)| v == value) {
                patches.add_class(*panel, class::ACTIVE);
            }
            group.active = Some(index);
            return true;
        }
        false
    }

    /// Returns the selected tab value of the `group`th container.
    #[must_use]
    pub fn active_tab(&self, group: usize) -> Option<&str> {
        let group = self.groups.get(group)?;
        group.active.map(|i| group.tabs[i].1.as_str())
    }
}

//! # Site Configuration
//!
//! Every tunable of the page, loadable from TOML. Every field has a default,
//! so an empty document is a valid configuration:
//!
//! ```toml
//! [observer]
//! threshold = 0.15
//! root_margin_bottom = -50.0
//!
//! [timing]
//! scroll_duration_ms = 800.0
//!
//! [widgets]
//! modal = true
//! ```

use std::path::Path;

use serde::Deserialize;
use vitrine_ui::{
    Breakpoints, CookieBannerText, NavConfig, NotificationConfig, ObserverOptions, RevealConfig,
    SelectorList,
};

use crate::error::{SiteError, SiteResult};

/// Visibility observer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObserverSection {
    /// Visible fraction that counts as "in view".
    pub threshold: f64,
    /// Bottom root margin in pixels.
    pub root_margin_bottom: f64,
}

impl Default for ObserverSection {
    fn default() -> Self {
        let options = ObserverOptions::default();
        Self {
            threshold: options.threshold,
            root_margin_bottom: options.root_margin_bottom,
        }
    }
}

/// Durations, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    /// Smooth page scroll.
    pub scroll_duration_ms: f64,
    /// Scroll handler throttle window.
    pub scroll_throttle_ms: f64,
    /// Stat counter animation.
    pub counter_duration_ms: f64,
    /// Frame interval the counter increment assumes.
    pub frame_interval_ms: f64,
    /// Simulated form submission latency.
    pub submit_delay_ms: f64,
    /// Notification lifetime before it hides itself.
    pub notification_dismiss_ms: f64,
    /// Notification fade-out before removal.
    pub notification_fade_ms: f64,
    /// Delay before a new notification is shown.
    pub notification_show_delay_ms: f64,
    /// Search input debounce.
    pub search_debounce_ms: f64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            scroll_duration_ms: 800.0,
            scroll_throttle_ms: 100.0,
            counter_duration_ms: 2000.0,
            frame_interval_ms: 16.0,
            submit_delay_ms: 1000.0,
            notification_dismiss_ms: 5000.0,
            notification_fade_ms: 300.0,
            notification_show_delay_ms: 10.0,
            search_debounce_ms: 300.0,
        }
    }
}

/// Navigation geometry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationSection {
    /// Fixed header height subtracted from link scroll targets.
    pub header_offset: f64,
    /// Probe distance below the viewport top for the active section.
    pub active_probe_offset: f64,
    /// Offset past which the nav is marked `scrolled`.
    pub scrolled_threshold: f64,
    /// Offset past which the scroll-top button shows.
    pub scroll_top_threshold: f64,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            header_offset: 70.0,
            active_probe_offset: 100.0,
            scrolled_threshold: 50.0,
            scroll_top_threshold: 500.0,
        }
    }
}

/// Reveal targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealSection {
    /// Elements that fade in.
    pub fade_in_selectors: Vec<String>,
    /// Animated counters.
    pub counter_selector: String,
}

impl Default for RevealSection {
    fn default() -> Self {
        let reveal = RevealConfig::default();
        Self {
            fade_in_selectors: reveal.fade_in_selectors,
            counter_selector: reveal.counter_selector,
        }
    }
}

/// Optional widgets. All off by default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetsSection {
    /// Modal dialog for `[data-modal]` triggers.
    pub modal: bool,
    /// Tab containers.
    pub tabs: bool,
    /// Accordions.
    pub accordion: bool,
    /// Cookie consent banner.
    pub cookie_consent: bool,
    /// Search filter.
    pub search: bool,
    /// Tab container selector.
    pub tabs_selector: String,
    /// Accordion item selector.
    pub accordion_selector: String,
    /// Search input selector.
    pub search_input_selector: String,
    /// Searchable item selector.
    pub search_items_selector: String,
}

impl Default for WidgetsSection {
    fn default() -> Self {
        Self {
            modal: false,
            tabs: false,
            accordion: false,
            cookie_consent: false,
            search: false,
            tabs_selector: ".tabs-container".to_owned(),
            accordion_selector: ".accordion".to_owned(),
            search_input_selector: ".search-input".to_owned(),
            search_items_selector: ".search-item".to_owned(),
        }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextSection {
    /// Accessible label of the scroll-top button.
    pub scroll_top_label: String,
    /// Accessible label of close buttons.
    pub close_label: String,
    /// Empty-search message.
    pub no_results: String,
    /// Cookie banner paragraph.
    pub cookie_message: String,
    /// Cookie accept button.
    pub cookie_accept: String,
    /// Cookie decline button.
    pub cookie_decline: String,
}

impl Default for TextSection {
    fn default() -> Self {
        let cookie = CookieBannerText::default();
        Self {
            scroll_top_label: "Back to top".to_owned(),
            close_label: "Close".to_owned(),
            no_results: "No results found".to_owned(),
            cookie_message: cookie.message,
            cookie_accept: cookie.accept,
            cookie_decline: cookie.decline,
        }
    }
}

/// Complete site configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// `[observer]`
    pub observer: ObserverSection,
    /// `[timing]`
    pub timing: TimingSection,
    /// `[navigation]`
    pub navigation: NavigationSection,
    /// `[breakpoints]`
    pub breakpoints: Breakpoints,
    /// `[reveal]`
    pub reveal: RevealSection,
    /// `[widgets]`
    pub widgets: WidgetsSection,
    /// `[text]`
    pub text: TextSection,
}

impl SiteConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidConfig`] on malformed TOML or
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> SiteResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SiteError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidConfig`] if the file cannot be read or is
    /// invalid.
    pub fn from_path(path: impl AsRef<Path>) -> SiteResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SiteError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges and selectors.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> SiteResult<()> {
        let invalid = |msg: String| Err(SiteError::InvalidConfig(msg));

        if !(0.0..=1.0).contains(&self.observer.threshold) {
            return invalid(format!(
                "observer.threshold must be within [0, 1], got {}",
                self.observer.threshold
            ));
        }

        let t = &self.timing;
        let positive = [
            ("scroll_duration_ms", t.scroll_duration_ms),
            ("scroll_throttle_ms", t.scroll_throttle_ms),
            ("counter_duration_ms", t.counter_duration_ms),
            ("frame_interval_ms", t.frame_interval_ms),
            ("submit_delay_ms", t.submit_delay_ms),
            ("notification_dismiss_ms", t.notification_dismiss_ms),
            ("notification_fade_ms", t.notification_fade_ms),
            ("search_debounce_ms", t.search_debounce_ms),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return invalid(format!("timing.{name} must be positive, got {value}"));
            }
        }
        if t.notification_show_delay_ms.is_nan() || t.notification_show_delay_ms < 0.0 {
            return invalid(format!(
                "timing.notification_show_delay_ms must not be negative, got {}",
                t.notification_show_delay_ms
            ));
        }

        if !self.breakpoints.is_ordered() {
            return invalid("breakpoints must be positive and increasing".to_owned());
        }

        let w = &self.widgets;
        let selectors = self
            .reveal
            .fade_in_selectors
            .iter()
            .chain([
                &self.reveal.counter_selector,
                &w.tabs_selector,
                &w.accordion_selector,
                &w.search_input_selector,
                &w.search_items_selector,
            ]);
        for selector in selectors {
            SelectorList::parse(selector).map_err(|e| SiteError::InvalidConfig(e.to_string()))?;
        }

        Ok(())
    }

    /// Navigation controller settings.
    #[must_use]
    pub fn nav_config(&self) -> NavConfig {
        NavConfig {
            active_probe_offset: self.navigation.active_probe_offset,
            header_offset: self.navigation.header_offset,
            scrolled_threshold: self.navigation.scrolled_threshold,
            scroll_throttle: self.timing.scroll_throttle_ms,
        }
    }

    /// Reveal engine settings.
    #[must_use]
    pub fn reveal_config(&self) -> RevealConfig {
        RevealConfig {
            fade_in_selectors: self.reveal.fade_in_selectors.clone(),
            counter_selector: self.reveal.counter_selector.clone(),
            counter_duration: self.timing.counter_duration_ms,
            frame_interval: self.timing.frame_interval_ms,
        }
    }

    /// Visibility observer settings.
    #[must_use]
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.observer.threshold,
            root_margin_bottom: self.observer.root_margin_bottom,
        }
    }

    /// Notification settings.
    #[must_use]
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            show_delay: self.timing.notification_show_delay_ms,
            dismiss_after: self.timing.notification_dismiss_ms,
            fade_out: self.timing.notification_fade_ms,
            close_label: self.text.close_label.clone(),
        }
    }

    /// Cookie banner wording.
    #[must_use]
    pub fn cookie_text(&self) -> CookieBannerText {
        CookieBannerText {
            message: self.text.cookie_message.clone(),
            accept: self.text.cookie_accept.clone(),
            decline: self.text.cookie_decline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.observer_options().root_margin(), "0px 0px -50px 0px");
        assert!(!config.widgets.modal);
    }

    #[test]
    fn test_partial_sections() {
        let config = SiteConfig::from_toml_str(
            r#"
            [timing]
            scroll_duration_ms = 600.0

            [widgets]
            modal = true
            tabs_selector = ".tabs"

            [reveal]
            fade_in_selectors = [".card"]
            "#,
        )
        .unwrap();

        assert_eq!(config.timing.scroll_duration_ms, 600.0);
        assert_eq!(config.timing.scroll_throttle_ms, 100.0);
        assert!(config.widgets.modal);
        assert_eq!(config.widgets.tabs_selector, ".tabs");
        assert_eq!(config.reveal_config().fade_in_selectors, vec![".card".to_owned()]);
        assert_eq!(config.reveal_config().counter_selector, ".stat-number");
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            "[observer]\nthreshold = 1.5",
            "[timing]\nscroll_duration_ms = 0.0",
            "[breakpoints]\nmobile = 1000.0",
            "[reveal]\nfade_in_selectors = [\".card >\"]",
            "[timing\n",
        ];
        for source in bad {
            assert!(
                matches!(SiteConfig::from_toml_str(source), Err(SiteError::InvalidConfig(_))),
                "accepted: {source}"
            );
        }
    }

    #[test]
    fn test_accepts_combinator_selectors() {
        let config = SiteConfig::from_toml_str(
            "[reveal]\nfade_in_selectors = [\".grid .card\", \"ul > li\"]",
        )
        .unwrap();
        assert_eq!(config.reveal.fade_in_selectors.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SiteConfig::from_path("/nonexistent/vitrine.toml"),
            Err(SiteError::InvalidConfig(_))
        ));
    }
}

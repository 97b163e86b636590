//! Fire-once reveal animations.
//!
//! Each target moves `Unseen → Animating → Done`. The first visibility report
//! fires it and stops observation; later reports are ignored. Fade-ins go
//! straight to `Done` (the stylesheet transition does the motion). Counters
//! stay `Animating` while [`RevealEngine::tick`] steps them.

use std::collections::HashSet;

use tracing::debug;

use crate::animation::{AnimationHandle, CounterAnimation, CounterStep, HandleSource};
use crate::dom::{ElementId, ElementLocator};
use crate::error::{UiError, UiResult};
use crate::rate_limit::Millis;
use crate::render::{DomPatch, PatchBuffer};
use crate::style::{FADE_HIDDEN, FADE_REVEALED};

/// Visibility observer parameters, handed to the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element that must be visible.
    pub threshold: f64,
    /// Bottom root margin in pixels (negative shrinks the viewport).
    pub root_margin_bottom: f64,
}

impl ObserverOptions {
    /// Formats the CSS root margin.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.root_margin_bottom)
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            root_margin_bottom: -50.0,
        }
    }
}

/// Which elements reveal, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Selectors whose elements fade in.
    pub fade_in_selectors: Vec<String>,
    /// Selector of animated counters.
    pub counter_selector: String,
    /// Nominal counter duration.
    pub counter_duration: Millis,
    /// Nominal frame interval the counter increment is computed for.
    pub frame_interval: Millis,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            fade_in_selectors: [
                ".module-card",
                ".debouche-card",
                ".poursuite-card",
                ".key-point",
                ".specialite",
                ".contact-item",
                ".stat-item",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            counter_selector: ".stat-number".to_owned(),
            counter_duration: 2000.0,
            frame_interval: 16.0,
        }
    }
}

/// Animation a target runs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealKind {
    /// Opacity and translate transition.
    FadeIn,
    /// Count up to the element's target number.
    Counter,
}

/// Lifecycle of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Observed, not yet visible.
    Unseen,
    /// Fired, frames still running.
    Animating,
    /// Finished (or cancelled).
    Done,
}

#[derive(Debug, Clone)]
struct RevealTarget {
    element: ElementId,
    kind: RevealKind,
    phase: RevealPhase,
    counter: Option<(AnimationHandle, CounterAnimation)>,
}

/// Parses an integer prefix, skipping leading whitespace: `"500+"` is 500.
///
/// # Errors
///
/// Returns [`UiError::InvalidCounterTarget`] if no digits lead the text.
pub fn parse_leading_int(text: &str) -> UiResult<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest[..digits_len]
        .parse::<i64>()
        .map(|value| sign * value)
        .map_err(|_| UiError::InvalidCounterTarget(text.to_owned()))
}

/// Copies each counter's text into `data-count` where the attribute is absent.
///
/// # Errors
///
/// Propagates selector errors from the locator.
pub fn seed_counter_targets(
    locator: &impl ElementLocator,
    selector: &str,
    patches: &mut PatchBuffer,
) -> UiResult<usize> {
    let mut seeded = 0;
    for counter in locator.query_all(selector)? {
        if !locator.has_attribute(counter, "data-count") {
            patches.set_attribute(counter, "data-count", locator.text(counter));
            seeded += 1;
        }
    }
    Ok(seeded)
}

/// Drives every reveal target on the page.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    config: RevealConfig,
    targets: Vec<RevealTarget>,
    handles: HandleSource,
}

impl RevealEngine {
    /// Collects targets, hides fade-ins and starts observing.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(
        locator: &impl ElementLocator,
        config: RevealConfig,
        patches: &mut PatchBuffer,
    ) -> UiResult<Self> {
        let mut engine = Self {
            config,
            targets: Vec::new(),
            handles: HandleSource::default(),
        };

        for selector in &engine.config.fade_in_selectors {
            for element in locator.query_all(selector)? {
                for (property, value) in FADE_HIDDEN {
                    patches.set_style(element, property, value);
                }
                engine.targets.push(RevealTarget {
                    element,
                    kind: RevealKind::FadeIn,
                    phase: RevealPhase::Unseen,
                    counter: None,
                });
            }
        }
        for element in locator.query_all(&engine.config.counter_selector)? {
            engine.targets.push(RevealTarget {
                element,
                kind: RevealKind::Counter,
                phase: RevealPhase::Unseen,
                counter: None,
            });
        }

        let mut seen = HashSet::new();
        engine.targets.retain(|t| seen.insert((t.element, t.kind)));
        let mut observed: Vec<ElementId> = engine.targets.iter().map(|t| t.element).collect();
        observed.sort_unstable();
        observed.dedup();
        for element in observed {
            patches.push(DomPatch::Observe { element });
        }

        debug!("Reveal engine mounted: {} targets", engine.targets.len());
        Ok(engine)
    }

    /// Returns the number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if the page has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the phase of `element`'s target of `kind`.
    #[must_use]
    pub fn phase(&self, element: ElementId, kind: RevealKind) -> Option<RevealPhase> {
        self.targets
            .iter()
            .find(|t| t.element == element && t.kind == kind)
            .map(|t| t.phase)
    }

    /// Returns true while a counter is stepping.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.targets.iter().any(|t| t.phase == RevealPhase::Animating)
    }

    /// Handles a visibility report. Fires every unseen target on `element`.
    ///
    /// Returns the handles of counters started by this report.
    pub fn on_visibility(
        &mut self,
        locator: &impl ElementLocator,
        element: ElementId,
        visible: bool,
        patches: &mut PatchBuffer,
    ) -> Vec<AnimationHandle> {
        if !visible {
            return Vec::new();
        }

        let mut fired = false;
        let mut started = Vec::new();
        for index in 0..self.targets.len() {
            let target = &self.targets[index];
            if target.element != element || target.phase != RevealPhase::Unseen {
                continue;
            }
            let kind = target.kind;
            fired = true;
            match kind {
                RevealKind::FadeIn => {
                    for (property, value) in FADE_REVEALED {
                        patches.set_style(element, property, value);
                    }
                    self.targets[index].phase = RevealPhase::Done;
                }
                RevealKind::Counter => {
                    if let Some(handle) = self.start_counter(locator, index, patches) {
                        started.push(handle);
                    }
                }
            }
        }

        if fired {
            patches.push(DomPatch::Unobserve { element });
        }
        started
    }

    fn start_counter(
        &mut self,
        locator: &impl ElementLocator,
        index: usize,
        patches: &mut PatchBuffer,
    ) -> Option<AnimationHandle> {
        let element = self.targets[index].element;
        let source = locator
            .attribute(element, "data-count")
            .filter(|count| !count.is_empty())
            .unwrap_or_else(|| locator.text(element));

        let target_value = match parse_leading_int(&source) {
            Ok(value) => value,
            Err(err) => {
                debug!("Counter {element} skipped: {err}");
                self.targets[index].phase = RevealPhase::Done;
                return None;
            }
        };

        let mut counter = CounterAnimation::new(
            target_value,
            self.config.counter_duration,
            self.config.frame_interval,
        );
        let step = counter.step();
        patches.set_text(element, step.value().to_string());

        if let CounterStep::Finished(_) = step {
            self.targets[index].phase = RevealPhase::Done;
            return None;
        }
        let handle = self.handles.next();
        let target = &mut self.targets[index];
        target.phase = RevealPhase::Animating;
        target.counter = Some((handle, counter));
        Some(handle)
    }

    /// Advances every running counter by one frame.
    pub fn tick(&mut self, patches: &mut PatchBuffer) {
        for target in &mut self.targets {
            if target.phase != RevealPhase::Animating {
                continue;
            }
            let Some((_, counter)) = target.counter.as_mut() else {
                continue;
            };

            let step = counter.step();
            patches.set_text(target.element, step.value().to_string());
            if let CounterStep::Finished(_) = step {
                target.phase = RevealPhase::Done;
                target.counter = None;
            }
        }
    }

    /// Stops a running counter, leaving its last rendered value.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        let running = self.targets.iter_mut().find(|t| {
            t.phase == RevealPhase::Animating
                && t.counter.as_ref().is_some_and(|(h, _)| *h == handle)
        });

        match running {
            Some(target) => {
                target.phase = RevealPhase::Done;
                target.counter = None;
                true
            }
            None => false,
        }
    }
}

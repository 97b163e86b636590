//! # Site Root
//!
//! Mounts every controller against a [`Document`], routes events to them
//! and applies the patches they emit.
//!
//! ```text
//! handle(event) ──┐
//!                 ├──> controllers ──> PatchBuffer ──> Document::apply
//! tick(now) ──────┘        ↑
//!     │                    │
//!     └── drain bus ───────┘
//! ```
//!
//! Controllers never call each other. Cross-component effects (a nav link
//! starting a page scroll, a submit outcome raising a notification, a
//! consent decision being stored) are mediated here.

use std::task::Poll;

use tracing::{debug, error, info, warn};
use vitrine_ui::form::{SUBMIT_BLOCKED_MESSAGE, SUBMIT_FAILURE_MESSAGE, SUBMIT_SUCCESS_MESSAGE};
use vitrine_ui::reveal::seed_counter_targets;
use vitrine_ui::{
    Accordion, Breakpoint, CookieBanner, Document, ElementId, FormValidator, InputEvent, Key,
    LazyImageLoader, Millis, Modal, NavAction, NavController, NotificationCenter,
    NotificationKind, PageScroller, PatchBuffer, RevealEngine, ScrollTopButton, SearchFilter,
    SubmitDecision, TabManager, UiResult, CONSENT_KEY,
};

use crate::api::SiteApi;
use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::events::{EventBus, EventReceiver, SiteEvent, DEFAULT_CAPACITY};
use crate::storage::{ConsentStore, MemoryConsentStore};
use crate::submit::{SimulatedSubmitter, Submitter};

/// Outcome of mounting the page.
#[derive(Debug, Default)]
pub struct MountReport {
    /// Components that found their elements and started.
    pub mounted: Vec<&'static str>,
    /// Components that failed. The rest of the page still runs.
    pub failed: Vec<SiteError>,
}

impl MountReport {
    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns true if `component` mounted.
    #[must_use]
    pub fn has(&self, component: &str) -> bool {
        self.mounted.contains(&component)
    }

    fn record<T>(&mut self, component: &'static str, result: UiResult<Option<T>>) -> Option<T> {
        match result {
            Ok(Some(mounted)) => {
                info!("{component} initialized");
                self.mounted.push(component);
                Some(mounted)
            }
            Ok(None) => {
                debug!("{component} has no elements on this page");
                None
            }
            Err(source) => {
                let err = SiteError::ComponentInit { component, source };
                error!("{err}");
                self.failed.push(err);
                None
            }
        }
    }
}

/// Configures and mounts a [`Site`].
pub struct SiteBuilder {
    config: SiteConfig,
    consent: Box<dyn ConsentStore>,
    submitter: Box<dyn Submitter>,
    bus: EventBus,
}

impl SiteBuilder {
    /// Starts from `config`, an in-memory consent store and the simulated
    /// submitter.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        let delay = config.timing.submit_delay_ms;
        Self {
            config,
            consent: Box::new(MemoryConsentStore::new()),
            submitter: Box::new(SimulatedSubmitter::new(delay)),
            bus: EventBus::new(DEFAULT_CAPACITY),
        }
    }

    /// Uses `store` for the cookie decision.
    #[must_use]
    pub fn consent_store(mut self, store: impl ConsentStore + 'static) -> Self {
        self.consent = Box::new(store);
        self
    }

    /// Uses `submitter` for the contact form.
    #[must_use]
    pub fn submitter(mut self, submitter: impl Submitter + 'static) -> Self {
        self.submitter = Box::new(submitter);
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.bus = EventBus::new(capacity);
        self
    }

    /// Uses an existing bus, for producers that must exist before the page
    /// is mounted.
    #[must_use]
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Mounts every component against `document`.
    ///
    /// Never fails: a component that cannot start is recorded in the
    /// [`MountReport`] and skipped.
    pub fn mount<D: Document>(self, mut document: D) -> Site<D> {
        info!("Initializing site...");
        let Self {
            config,
            consent,
            submitter,
            bus,
        } = self;
        let mut patches = PatchBuffer::new();
        let mut report = MountReport::default();

        let mut nav = report.record("navigation", NavController::mount(&document, config.nav_config()));
        if let Some(nav) = &mut nav {
            nav.highlight_active_section(document.scroll_offset(), &mut patches);
        }

        let scroll_top = ScrollTopButton::mount(
            &mut patches,
            config.navigation.scroll_top_threshold,
            config.timing.scroll_throttle_ms,
            &config.text.scroll_top_label,
        );
        report.mounted.push("scroll-top");

        let observe = document.supports_intersection();
        let reveal = if observe {
            report.record(
                "reveal",
                RevealEngine::mount(&document, config.reveal_config(), &mut patches).map(Some),
            )
        } else {
            warn!("Visibility observation unavailable, reveal animations disabled");
            None
        };

        let form = report.record("contact-form", FormValidator::mount(&document));
        let images = report.record(
            "lazy-images",
            LazyImageLoader::mount(&document, observe, &mut patches).map(Some),
        );

        let widgets = &config.widgets;
        let modal = widgets
            .modal
            .then(|| {
                report.record(
                    "modal",
                    Modal::mount(&document, &config.text.close_label, &mut patches).map(Some),
                )
            })
            .flatten();
        let tabs = widgets
            .tabs
            .then(|| report.record("tabs", TabManager::mount(&document, &widgets.tabs_selector)))
            .flatten();
        let accordion = widgets
            .accordion
            .then(|| {
                report.record(
                    "accordion",
                    Accordion::mount(&document, &widgets.accordion_selector),
                )
            })
            .flatten();
        let search = widgets
            .search
            .then(|| {
                report.record(
                    "search",
                    SearchFilter::mount(
                        &document,
                        &widgets.search_input_selector,
                        &widgets.search_items_selector,
                        config.timing.search_debounce_ms,
                        &config.text.no_results,
                    ),
                )
            })
            .flatten();
        let cookie_banner = widgets.cookie_consent.then(|| {
            let stored = consent.get(CONSENT_KEY).unwrap_or_else(|err| {
                warn!("Consent unreadable, asking again: {err}");
                None
            });
            let banner = CookieBanner::mount(stored.as_deref(), &config.cookie_text(), &mut patches);
            report.mounted.push("cookie-consent");
            banner
        });

        match seed_counter_targets(&document, &config.reveal.counter_selector, &mut patches) {
            Ok(seeded) => debug!("Seeded {seeded} counter targets"),
            Err(source) => {
                let err = SiteError::ComponentInit {
                    component: "stats",
                    source,
                };
                error!("{err}");
                report.failed.push(err);
            }
        }

        for patch in patches.drain() {
            document.apply(patch);
        }

        if report.is_complete() {
            info!("Site initialized ({} components)", report.mounted.len());
        } else {
            error!(
                "Site initialized with {} failed components",
                report.failed.len()
            );
        }

        Site {
            breakpoint: Breakpoint::default(),
            scroller: PageScroller::new(config.timing.scroll_duration_ms),
            notifications: NotificationCenter::new(config.notification_config()),
            api: SiteApi::new(bus.sender()),
            receiver: bus.receiver(),
            document,
            config,
            patches,
            nav,
            scroll_top,
            reveal,
            form,
            images,
            modal,
            tabs,
            accordion,
            search,
            cookie_banner,
            consent,
            submitter,
            report,
        }
    }
}

/// The running page.
pub struct Site<D: Document> {
    document: D,
    config: SiteConfig,
    patches: PatchBuffer,
    report: MountReport,
    breakpoint: Breakpoint,

    nav: Option<NavController>,
    scroll_top: ScrollTopButton,
    reveal: Option<RevealEngine>,
    form: Option<FormValidator>,
    images: Option<LazyImageLoader>,
    modal: Option<Modal>,
    tabs: Option<TabManager>,
    accordion: Option<Accordion>,
    search: Option<SearchFilter>,
    cookie_banner: Option<CookieBanner>,
    notifications: NotificationCenter,
    scroller: PageScroller,

    consent: Box<dyn ConsentStore>,
    submitter: Box<dyn Submitter>,
    receiver: EventReceiver,
    api: SiteApi,
}

impl<D: Document> Site<D> {
    /// Mounts with the default collaborators.
    pub fn mount(document: D, config: SiteConfig) -> Self {
        SiteBuilder::new(config).mount(document)
    }

    /// Handles one event and applies the resulting patches.
    pub fn handle(&mut self, event: impl Into<SiteEvent>, now: Millis) {
        self.route(event.into(), now);
        self.flush();
    }

    /// Advances time: drains queued events, steps every animation, timer and
    /// pending submission, then applies the patches.
    pub fn tick(&mut self, now: Millis) {
        for event in self.receiver.drain() {
            self.route(event, now);
        }

        self.scroller.tick(now, &mut self.patches);
        if let Some(reveal) = &mut self.reveal {
            reveal.tick(&mut self.patches);
        }
        if let Some(search) = &mut self.search {
            search.tick(now, &mut self.patches);
        }
        self.poll_submission(now);
        self.notifications.tick(now, &mut self.patches);

        self.flush();
    }

    /// Returns a handle for page scripts.
    #[must_use]
    pub fn api(&self) -> SiteApi {
        self.api.clone()
    }

    /// Returns the page.
    pub const fn document(&self) -> &D {
        &self.document
    }

    /// Returns the page for direct manipulation (typing, layout changes).
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Returns what mounted and what failed.
    pub const fn report(&self) -> &MountReport {
        &self.report
    }

    /// Returns the viewport class of the last resize. Desktop until the
    /// first one.
    pub const fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    /// Returns the navigation controller, if mounted.
    pub const fn nav(&self) -> Option<&NavController> {
        self.nav.as_ref()
    }

    /// Returns the form validator, if mounted.
    pub const fn form(&self) -> Option<&FormValidator> {
        self.form.as_ref()
    }

    /// Returns the reveal engine, if mounted.
    pub const fn reveal(&self) -> Option<&RevealEngine> {
        self.reveal.as_ref()
    }

    /// Returns the scroll-top button.
    pub const fn scroll_top(&self) -> &ScrollTopButton {
        &self.scroll_top
    }

    /// Returns the notification center.
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Returns the cookie banner, if enabled.
    pub const fn cookie_banner(&self) -> Option<&CookieBanner> {
        self.cookie_banner.as_ref()
    }

    /// Returns the search filter, if mounted.
    pub const fn search(&self) -> Option<&SearchFilter> {
        self.search.as_ref()
    }

    /// Returns the tab manager, if mounted.
    pub const fn tabs(&self) -> Option<&TabManager> {
        self.tabs.as_ref()
    }

    /// Returns the accordion, if mounted.
    pub const fn accordion(&self) -> Option<&Accordion> {
        self.accordion.as_ref()
    }

    /// Returns the modal, if mounted.
    pub const fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Returns true while a smooth page scroll runs.
    pub fn is_scrolling(&self) -> bool {
        self.scroller.is_running()
    }

    /// Returns true if a mounted component takes over the browser's default
    /// action for `event`: a navigation link, a modal trigger, or the
    /// contact form's submit. Every other click and form keeps its default.
    pub fn claims_default_action(&self, event: &InputEvent) -> bool {
        let document = &self.document;
        match *event {
            InputEvent::Click { target } => {
                self.nav.as_ref().is_some_and(|nav| nav.owns_link(document, target))
                    || self
                        .modal
                        .as_ref()
                        .is_some_and(|modal| modal.owns_trigger(document, target))
            }
            InputEvent::Submit { form } => self.form.as_ref().is_some_and(|v| v.form() == form),
            _ => false,
        }
    }

    fn flush(&mut self) {
        for patch in self.patches.drain() {
            self.document.apply(patch);
        }
    }

    fn route(&mut self, event: SiteEvent, now: Millis) {
        match event {
            SiteEvent::Input(input) => self.on_input(input, now),
            SiteEvent::ScrollToElement(selector) => self.scroll_to_element(&selector),
            SiteEvent::ShowNotification { message, kind } => {
                self.notifications.show(now, &message, kind, &mut self.patches);
            }
        }
    }

    fn on_input(&mut self, event: InputEvent, now: Millis) {
        match event {
            InputEvent::Scroll { offset } => {
                if let Some(nav) = &mut self.nav {
                    nav.on_scroll(now, offset, &mut self.patches);
                }
                self.scroll_top.on_scroll(now, offset, &mut self.patches);
            }
            InputEvent::Resize { width, .. } => self.on_resize(width),
            InputEvent::Click { target } => self.on_click(target, now),
            InputEvent::KeyDown(key) => self.on_key(key),
            InputEvent::Visibility { element, visible } => {
                if let Some(reveal) = &mut self.reveal {
                    let started = reveal.on_visibility(&self.document, element, visible, &mut self.patches);
                    if !started.is_empty() {
                        debug!("{} counters started on {element}", started.len());
                    }
                }
                if let Some(images) = &mut self.images {
                    images.on_visibility(&self.document, element, visible, &mut self.patches);
                }
            }
            InputEvent::Blur { field, value } => {
                if let Some(form) = &mut self.form {
                    form.on_blur(field, &value, &mut self.patches);
                }
            }
            InputEvent::Input { field, value } => {
                if let Some(form) = &mut self.form {
                    form.on_input(field, &mut self.patches);
                }
                if let Some(search) = &mut self.search {
                    search.on_input(field, &value, now);
                }
            }
            InputEvent::Submit { form } => self.on_submit(form, now),
            InputEvent::ImageError { image } => {
                if let Some(images) = &mut self.images {
                    images.on_error(image, &mut self.patches);
                }
            }
        }
    }

    fn on_resize(&mut self, width: f64) {
        let breakpoint = self.config.breakpoints.classify(width);
        if breakpoint != self.breakpoint {
            debug!("Viewport is now {breakpoint:?}");
            self.breakpoint = breakpoint;
        }
        if let Some(nav) = &mut self.nav {
            nav.refresh_sections(&self.document);
        }
    }

    fn on_click(&mut self, target: ElementId, now: Millis) {
        let document = &self.document;
        let patches = &mut self.patches;

        if let Some(banner) = &mut self.cookie_banner {
            if let Some(flag) = banner.on_click(document, target, patches) {
                info!("Cookie consent {flag}");
                if let Err(err) = self.consent.set(CONSENT_KEY, flag.as_str()) {
                    warn!("Consent not persisted: {err}");
                }
            }
        }
        self.notifications.on_click(document, target, now, patches);
        if let Some(modal) = &mut self.modal {
            modal.on_click(document, target, patches);
        }
        if let Some(nav) = &mut self.nav {
            if let NavAction::ScrollTo { offset } = nav.on_click(document, target, patches) {
                self.scroller.start(document.scroll_offset(), offset);
            }
        }
        if self.scroll_top.on_click(document, target) {
            self.scroller.start(document.scroll_offset(), 0.0);
        }
        if let Some(tabs) = &mut self.tabs {
            tabs.on_click(document, target, patches);
        }
        if let Some(accordion) = &mut self.accordion {
            accordion.on_click(document, target, patches);
        }
    }

    fn on_key(&mut self, key: Key) {
        if let Some(modal) = &mut self.modal {
            modal.on_key(key, &mut self.patches);
        }
        if let Some(nav) = &mut self.nav {
            nav.on_key(key, &mut self.patches);
        }
    }

    fn on_submit(&mut self, form: ElementId, now: Millis) {
        let Some(validator) = &mut self.form else {
            return;
        };

        match validator.submit(&self.document, form, &mut self.patches) {
            SubmitDecision::Ready(data) => {
                if let Err(err) = self.submitter.begin(&data, now) {
                    error!("{err}");
                    validator.finish_submission(false, &mut self.patches);
                    self.notifications.show(
                        now,
                        SUBMIT_FAILURE_MESSAGE,
                        NotificationKind::Error,
                        &mut self.patches,
                    );
                }
            }
            SubmitDecision::Blocked => {
                self.notifications.show(
                    now,
                    SUBMIT_BLOCKED_MESSAGE,
                    NotificationKind::Error,
                    &mut self.patches,
                );
            }
            SubmitDecision::Ignored => {}
        }
    }

    fn poll_submission(&mut self, now: Millis) {
        let Some(validator) = &mut self.form else {
            return;
        };
        if !validator.is_submitting() {
            return;
        }
        let Poll::Ready(outcome) = self.submitter.poll(now) else {
            return;
        };

        let (message, kind) = match &outcome {
            Ok(()) => {
                info!("Contact form delivered");
                (SUBMIT_SUCCESS_MESSAGE, NotificationKind::Success)
            }
            Err(err) => {
                error!("{err}");
                (SUBMIT_FAILURE_MESSAGE, NotificationKind::Error)
            }
        };
        validator.finish_submission(outcome.is_ok(), &mut self.patches);
        self.notifications.show(now, message, kind, &mut self.patches);
    }

    fn scroll_to_element(&mut self, selector: &str) {
        match self.document.query(selector) {
            Ok(Some(element)) => {
                let target = self.document.layout_box(element).y;
                self.scroller.start(self.document.scroll_offset(), target);
            }
            Ok(None) => debug!("scroll_to_element: nothing matches {selector}"),
            Err(err) => warn!("scroll_to_element: {err}"),
        }
    }
}

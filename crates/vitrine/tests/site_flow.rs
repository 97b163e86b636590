//! End-to-end flows through the site root over an in-memory page.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::Poll;

use vitrine::{
    ConsentStore, InputEvent, Key, MemoryConsentStore, NotificationKind, SimulatedSubmitter,
    Site, SiteBuilder, SiteConfig, SiteError, SiteResult, Submitter,
};
use vitrine_ui::form::{SUBMIT_BLOCKED_MESSAGE, SUBMIT_SUCCESS_MESSAGE};
use vitrine_ui::style::{class, PLACEHOLDER_IMAGE};
use vitrine_ui::{
    ElementId, ElementLocator, FormData, Millis, MemoryDom, Rect, RevealKind, RevealPhase,
    CONSENT_KEY,
};

struct Page {
    dom: MemoryDom,
    toggle: ElementId,
    links: Vec<ElementId>,
    outside: ElementId,
    form: ElementId,
    name: ElementId,
    email: ElementId,
    message: ElementId,
    card: ElementId,
    stat: ElementId,
    image: ElementId,
}

const SECTIONS: [&str; 4] = ["home", "about", "pricing", "contact"];

fn landing_page() -> Page {
    let mut dom = MemoryDom::new();
    let body = dom.body();

    let nav = dom.element(body, "nav").id("main-nav").build();
    let toggle = dom.element(nav, "button").class("nav-toggle").build();
    let menu = dom.element(nav, "ul").class("nav-links").build();
    let links: Vec<ElementId> = SECTIONS
        .iter()
        .map(|id| {
            dom.element(menu, "a")
                .class("nav-link")
                .attr("href", &format!("#{id}"))
                .build()
        })
        .collect();

    let mut sections = Vec::new();
    for (i, id) in SECTIONS.iter().enumerate() {
        let section = dom
            .element(body, "section")
            .id(id)
            .rect(Rect::band(i as f64 * 1000.0, 1000.0))
            .build();
        sections.push(section);
    }

    let card = dom.element(sections[1], "div").class("module-card").build();
    let stat_item = dom.element(sections[1], "div").class("stat-item").build();
    let stat = dom
        .element(stat_item, "span")
        .class("stat-number")
        .text("500+")
        .build();
    let image = dom
        .element(sections[1], "img")
        .attr("data-src", "campus.jpg")
        .build();

    let form = dom.element(sections[3], "form").class("contact-form").build();
    let mut control = |tag: &str, kind: &str, name: &str| {
        let group = dom.element(form, "div").class("form-group").build();
        dom.element(group, tag)
            .attr("type", kind)
            .attr("name", name)
            .attr("required", "")
            .build()
    };
    let name = control("input", "text", "name");
    let email = control("input", "email", "email");
    let message = control("textarea", "text", "message");

    let outside = dom.element(body, "footer").build();

    Page {
        dom,
        toggle,
        links,
        outside,
        form,
        name,
        email,
        message,
        card,
        stat,
        image,
    }
}

fn active_links(site: &Site<MemoryDom>, links: &[ElementId]) -> Vec<ElementId> {
    links
        .iter()
        .copied()
        .filter(|&link| site.document().has_class(link, class::ACTIVE))
        .collect()
}

fn run_frames(site: &mut Site<MemoryDom>, from: Millis, until: Millis) {
    let mut now = from;
    while now <= until {
        site.tick(now);
        now += 16.0;
    }
}

/// Counts `begin` calls, delegates the rest.
struct CountingSubmitter {
    inner: SimulatedSubmitter,
    begun: Arc<AtomicUsize>,
}

impl Submitter for CountingSubmitter {
    fn begin(&mut self, data: &FormData, now: Millis) -> SiteResult<()> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        self.inner.begin(data, now)
    }

    fn poll(&mut self, now: Millis) -> Poll<SiteResult<()>> {
        self.inner.poll(now)
    }
}

struct BrokenStore;

impl ConsentStore for BrokenStore {
    fn get(&self, _key: &str) -> SiteResult<Option<String>> {
        Err(SiteError::Storage("denied".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> SiteResult<()> {
        Err(SiteError::Storage("denied".into()))
    }
}

#[test]
fn test_core_components_mount() {
    let page = landing_page();
    let site = Site::mount(page.dom, SiteConfig::default());

    let report = site.report();
    assert!(report.is_complete());
    for component in ["navigation", "scroll-top", "reveal", "contact-form", "lazy-images"] {
        assert!(report.has(component), "{component} missing");
    }
    assert!(!report.has("modal"));

    // Counter target seeded from text.
    assert_eq!(site.document().attribute(page.stat, "data-count").as_deref(), Some("500+"));
    // Offset 0 highlights the first section.
    assert_eq!(active_links(&site, &page.links), vec![page.links[0]]);
}

#[test]
fn test_pricing_link_is_the_only_active_one() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());

    site.handle(InputEvent::Scroll { offset: 1930.0 }, 0.0);

    assert_eq!(active_links(&site, &page.links), vec![page.links[2]]);
    assert_eq!(site.nav().unwrap().active_section(), Some("pricing"));
}

#[test]
fn test_scroll_effects_are_throttled() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());
    let button = site.scroll_top().element();

    site.handle(InputEvent::Scroll { offset: 600.0 }, 0.0);
    assert!(site.document().has_class(button, class::VISIBLE));

    // Inside the throttle window: ignored.
    site.handle(InputEvent::Scroll { offset: 0.0 }, 50.0);
    assert!(site.document().has_class(button, class::VISIBLE));

    site.handle(InputEvent::Scroll { offset: 0.0 }, 150.0);
    assert!(!site.document().has_class(button, class::VISIBLE));
}

#[test]
fn test_menu_lock_released_three_ways() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());

    // Outside click.
    site.handle(InputEvent::Click { target: page.toggle }, 0.0);
    assert!(site.document().is_scroll_locked());
    site.handle(InputEvent::Click { target: page.outside }, 10.0);
    assert!(!site.document().is_scroll_locked());
    assert!(!site.nav().unwrap().is_menu_open());

    // Link click also starts the smooth scroll.
    site.handle(InputEvent::Click { target: page.toggle }, 20.0);
    site.handle(InputEvent::Click { target: page.links[2] }, 30.0);
    assert!(!site.document().is_scroll_locked());
    assert!(site.is_scrolling());
    run_frames(&mut site, 40.0, 900.0);
    assert!(!site.is_scrolling());
    assert_eq!(site.document().scroll_offset(), 2000.0 - 70.0);

    // Escape.
    site.handle(InputEvent::Click { target: page.toggle }, 1000.0);
    assert!(site.document().is_scroll_locked());
    site.handle(InputEvent::KeyDown(Key::Escape), 1010.0);
    assert!(!site.document().is_scroll_locked());
    assert!(!site.document().has_class(page.toggle, class::ACTIVE));
}

#[test]
fn test_invalid_form_never_reaches_submitter() {
    let page = landing_page();
    let begun = Arc::new(AtomicUsize::new(0));
    let mut site = SiteBuilder::new(SiteConfig::default())
        .submitter(CountingSubmitter {
            inner: SimulatedSubmitter::new(1000.0),
            begun: Arc::clone(&begun),
        })
        .mount(page.dom);

    site.handle(InputEvent::Submit { form: page.form }, 0.0);
    assert_eq!(begun.load(Ordering::SeqCst), 0);
    assert_eq!(site.document().with_class(class::FIELD_ERROR).len(), 3);
    assert!(site
        .notifications()
        .messages()
        .any(|(m, k)| m == SUBMIT_BLOCKED_MESSAGE && k == NotificationKind::Error));

    // Filled in, but the address is wrong: exactly one inline error.
    let dom = site.document_mut();
    dom.set_value(page.name, "Ada Lovelace");
    dom.set_value(page.email, "not-an-email");
    dom.set_value(page.message, "Hello");
    site.handle(InputEvent::Submit { form: page.form }, 100.0);

    assert_eq!(begun.load(Ordering::SeqCst), 0);
    let errors = site.document().with_class(class::FIELD_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(site.document().text(errors[0]), "Invalid email");
    assert_eq!(site.document().parent(errors[0]), site.document().parent(page.email));
}

#[test]
fn test_valid_form_is_sent_and_reset() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());

    let dom = site.document_mut();
    dom.set_value(page.name, "Ada Lovelace");
    dom.set_value(page.email, "a@b.c");
    dom.set_value(page.message, "Hello");

    site.handle(InputEvent::Submit { form: page.form }, 0.0);
    assert!(site.form().unwrap().is_submitting());
    assert!(site.document().with_class(class::FIELD_ERROR).is_empty());

    // Second submit while in flight is ignored.
    site.handle(InputEvent::Submit { form: page.form }, 10.0);

    site.tick(999.0);
    assert!(site.form().unwrap().is_submitting());
    assert_eq!(site.document().value(page.email), "a@b.c");

    site.tick(1000.0);
    assert!(!site.form().unwrap().is_submitting());
    assert_eq!(site.document().value(page.email), "");
    assert!(site
        .notifications()
        .messages()
        .any(|(m, k)| m == SUBMIT_SUCCESS_MESSAGE && k == NotificationKind::Success));

    let toast = site.document().with_class("notification-success")[0];
    site.tick(1010.0);
    assert!(site.document().has_class(toast, class::SHOW));
    site.tick(6000.0);
    assert!(!site.document().has_class(toast, class::SHOW));
    site.tick(6300.0);
    assert!(!site.document().exists(toast));
}

#[test]
fn test_failed_delivery_keeps_values() {
    let page = landing_page();
    let mut site = SiteBuilder::new(SiteConfig::default())
        .submitter(SimulatedSubmitter::failing(500.0))
        .mount(page.dom);

    let dom = site.document_mut();
    dom.set_value(page.name, "Ada Lovelace");
    dom.set_value(page.email, "a@b.c");
    dom.set_value(page.message, "Hello");

    site.handle(InputEvent::Submit { form: page.form }, 0.0);
    site.tick(500.0);

    assert!(!site.form().unwrap().is_submitting());
    assert_eq!(site.document().value(page.email), "a@b.c");
    assert!(site
        .notifications()
        .messages()
        .any(|(_, k)| k == NotificationKind::Error));
}

#[test]
fn test_blur_and_input_drive_inline_errors() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());

    site.handle(
        InputEvent::Blur {
            field: page.email,
            value: "nope".into(),
        },
        0.0,
    );
    assert_eq!(site.document().with_class(class::FIELD_ERROR).len(), 1);
    assert!(site.document().has_class(page.email, class::ERROR));

    site.handle(
        InputEvent::Input {
            field: page.email,
            value: "a@b".into(),
        },
        10.0,
    );
    assert!(site.document().with_class(class::FIELD_ERROR).is_empty());
    assert!(!site.document().has_class(page.email, class::ERROR));
}

#[test]
fn test_reveal_fires_once() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());
    assert_eq!(site.document().style(page.card, "opacity"), Some("0"));
    assert!(site.document().is_observed(page.card));

    site.handle(InputEvent::Visibility { element: page.card, visible: true }, 0.0);
    assert_eq!(site.document().style(page.card, "opacity"), Some("1"));
    assert!(!site.document().is_observed(page.card));

    site.handle(InputEvent::Visibility { element: page.stat, visible: true }, 0.0);
    assert_eq!(
        site.reveal().unwrap().phase(page.stat, RevealKind::Counter),
        Some(RevealPhase::Animating)
    );
    run_frames(&mut site, 16.0, 16.0 * 200.0);
    assert_eq!(site.document().text(page.stat), "500");
    assert_eq!(
        site.reveal().unwrap().phase(page.stat, RevealKind::Counter),
        Some(RevealPhase::Done)
    );

    // Leaving and re-entering the viewport changes nothing.
    let applied = site.document().applied_count();
    for visible in [false, true, false, true] {
        site.handle(InputEvent::Visibility { element: page.card, visible }, 5000.0);
        site.handle(InputEvent::Visibility { element: page.stat, visible }, 5000.0);
    }
    assert_eq!(site.document().applied_count(), applied);
    assert_eq!(site.document().text(page.stat), "500");
}

#[test]
fn test_lazy_image_and_error_fallback() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());
    assert!(site.document().is_observed(page.image));

    site.handle(InputEvent::Visibility { element: page.image, visible: true }, 0.0);
    let dom = site.document();
    assert_eq!(dom.attribute(page.image, "src").as_deref(), Some("campus.jpg"));
    assert!(!dom.has_attribute(page.image, "data-src"));
    assert!(dom.has_class(page.image, class::LOADED));

    site.handle(InputEvent::ImageError { image: page.image }, 10.0);
    let dom = site.document();
    assert_eq!(dom.attribute(page.image, "src").as_deref(), Some(PLACEHOLDER_IMAGE));
    assert!(dom.has_class(page.image, class::ERROR_IMAGE));
}

#[test]
fn test_consent_is_persisted_and_respected() {
    let mut config = SiteConfig::default();
    config.widgets.cookie_consent = true;
    let store = MemoryConsentStore::new();

    let mut site = SiteBuilder::new(config.clone())
        .consent_store(store.clone())
        .mount(landing_page().dom);
    assert!(site.cookie_banner().unwrap().is_visible());

    let decline = site.document().query(".btn-decline").unwrap().unwrap();
    site.handle(InputEvent::Click { target: decline }, 0.0);
    assert_eq!(store.peek(CONSENT_KEY).as_deref(), Some("declined"));
    assert!(site.document().query(".cookie-banner").unwrap().is_none());

    // Next visit: no banner.
    let site = SiteBuilder::new(config)
        .consent_store(store)
        .mount(landing_page().dom);
    assert!(!site.cookie_banner().unwrap().is_visible());
    assert!(site.document().query(".cookie-banner").unwrap().is_none());
}

#[test]
fn test_unreadable_consent_shows_banner() {
    let mut config = SiteConfig::default();
    config.widgets.cookie_consent = true;
    let mut site = SiteBuilder::new(config)
        .consent_store(BrokenStore)
        .mount(landing_page().dom);
    assert!(site.cookie_banner().unwrap().is_visible());

    let accept = site.document().query(".btn-accept").unwrap().unwrap();
    site.handle(InputEvent::Click { target: accept }, 0.0);
    assert!(!site.cookie_banner().unwrap().is_visible());
}

#[test]
fn test_api_calls_run_on_tick() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());
    let api = site.api();
    assert_eq!(api.version(), "1.0.0");

    assert!(api.scroll_to_element("#contact"));
    assert!(api.show_notification("Welcome", NotificationKind::Warning));
    assert!(!site.is_scrolling());

    site.tick(0.0);
    assert!(site.is_scrolling());
    assert!(site
        .notifications()
        .messages()
        .any(|(m, k)| m == "Welcome" && k == NotificationKind::Warning));

    site.tick(800.0);
    assert_eq!(site.document().scroll_offset(), 3000.0);

    // Unknown targets are ignored.
    api.scroll_to_element("#missing");
    site.tick(900.0);
    assert!(!site.is_scrolling());
}

#[test]
fn test_scroll_top_click_returns_to_top() {
    let page = landing_page();
    let mut site = Site::mount(page.dom, SiteConfig::default());
    site.document_mut().set_scroll_offset(2500.0);

    let button = site.scroll_top().element();
    site.handle(InputEvent::Click { target: button }, 0.0);
    run_frames(&mut site, 0.0, 816.0);
    assert_eq!(site.document().scroll_offset(), 0.0);
}

#[test]
fn test_default_actions_are_claimed_only_by_mounted_owners() {
    let build = |modal: bool| {
        let mut page = landing_page();
        let body = page.dom.body();
        let trigger = page
            .dom
            .element(body, "a")
            .attr("href", "/brochure.pdf")
            .attr("data-modal", "<p>Brochure</p>")
            .build();
        let newsletter = page.dom.element(body, "form").class("newsletter").build();

        let mut config = SiteConfig::default();
        config.widgets.modal = modal;
        let form = page.form;
        let link = page.links[2];
        let outside = page.outside;
        (Site::mount(page.dom, config), trigger, newsletter, form, link, outside)
    };

    let (site, trigger, newsletter, form, link, outside) = build(false);
    assert!(site.claims_default_action(&InputEvent::Click { target: link }));
    assert!(!site.claims_default_action(&InputEvent::Click { target: outside }));
    // No modal mounted: the trigger stays a plain link.
    assert!(!site.claims_default_action(&InputEvent::Click { target: trigger }));
    assert!(site.claims_default_action(&InputEvent::Submit { form }));
    assert!(!site.claims_default_action(&InputEvent::Submit { form: newsletter }));
    assert!(!site.claims_default_action(&InputEvent::KeyDown(Key::Escape)));

    let (site, trigger, ..) = build(true);
    assert!(site.claims_default_action(&InputEvent::Click { target: trigger }));
}

#[test]
fn test_broken_widget_does_not_stop_the_page() {
    let mut config = SiteConfig::default();
    config.widgets.tabs = true;
    config.widgets.tabs_selector = "div >".into();

    let page = landing_page();
    let mut site = Site::mount(page.dom, config);

    let report = site.report();
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.failed[0],
        SiteError::ComponentInit {
            component: "tabs",
            ..
        }
    ));
    assert!(site.tabs().is_none());

    site.handle(InputEvent::Scroll { offset: 1930.0 }, 0.0);
    assert_eq!(active_links(&site, &page.links), vec![page.links[2]]);
}

#[test]
fn test_optional_widgets_through_the_root() {
    let mut config = SiteConfig::default();
    config.widgets.modal = true;
    config.widgets.accordion = true;
    config.widgets.search = true;

    let mut dom = MemoryDom::new();
    let body = dom.body();
    let trigger = dom
        .element(body, "button")
        .attr("data-modal", "<p>Details</p>")
        .build();
    let item = dom.element(body, "div").class("accordion").build();
    let header = dom.element(item, "div").class("accordion-header").build();
    let content = dom
        .element(item, "div")
        .class("accordion-content")
        .scroll_height(240.0)
        .build();
    let input = dom.element(body, "input").class("search-input").build();
    let list = dom.element(body, "ul").build();
    let rust = dom.element(list, "li").class("search-item").text("Rust").build();
    let java = dom.element(list, "li").class("search-item").text("Java").build();

    let mut site = Site::mount(dom, config);
    assert!(site.report().is_complete());

    site.handle(InputEvent::Click { target: trigger }, 0.0);
    assert!(site.modal().unwrap().is_open());
    assert!(site.document().is_scroll_locked());
    site.handle(InputEvent::KeyDown(Key::Escape), 10.0);
    assert!(!site.document().is_scroll_locked());

    site.handle(InputEvent::Click { target: header }, 20.0);
    assert_eq!(site.document().style(content, "max-height"), Some("240px"));

    site.handle(
        InputEvent::Input {
            field: input,
            value: "RU".into(),
        },
        100.0,
    );
    site.tick(200.0);
    assert_eq!(site.document().style(java, "display"), None);
    site.tick(400.0);
    assert_eq!(site.document().style(java, "display"), Some("none"));
    assert_eq!(site.document().style(rust, "display"), None);
    assert_eq!(site.search().unwrap().visible_count(), 1);
}

#[test]
fn test_config_errors_surface() {
    let err = SiteConfig::from_toml_str("[observer]\nthreshold = 2.0").unwrap_err();
    assert!(matches!(err, SiteError::InvalidConfig(_)));
    assert!(err.to_string().contains("observer.threshold"));

    let config = SiteConfig::from_toml_str("[widgets]\nmodal = true").unwrap();
    assert!(config.widgets.modal);
}

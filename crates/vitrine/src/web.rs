//! # Browser Adapter
//!
//! Binds [`Site`] to the real page:
//! - [`WebDocument`] implements [`Document`] over `web-sys`
//! - DOM listeners translate browser events into [`SiteEvent`]s on the bus
//! - Two `IntersectionObserver`s report visibility: one for reveal targets,
//!   one for deferred images
//! - `requestAnimationFrame` drives [`Site::tick`]
//! - `window.VITRINE` exposes the [`SiteApi`]
//!
//! Elements are identified by an expando property holding their
//! [`ElementId`], assigned the first time the element is seen.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use tracing::{error, info, warn};
use vitrine_ui::{
    Document, DomPatch, ElementId, ElementLocator, InputEvent, Key, LazyImageLoader, NodeSpec,
    NotificationKind, ObserverOptions, Rect, UiError, UiResult,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, ErrorEvent, Event, HtmlElement, HtmlFormElement,
    HtmlImageElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    NodeList, PromiseRejectionEvent, Storage, Window,
};

use crate::api::SiteApi;
use crate::app::{Site, SiteBuilder};
use crate::config::SiteConfig;
use crate::error::{SiteError, SiteResult};
use crate::events::{EventBus, EventSender};
use crate::nodes::CreatedNodes;
use crate::storage::ConsentStore;

const ID_PROPERTY: &str = "__vitrineId";
const CONFIG_ELEMENT: &str = "vitrine-config";
const GLOBAL_NAME: &str = "VITRINE";

fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{value:?}"))
}

fn log_failure(result: Result<(), JsValue>, action: &str) {
    if let Err(err) = result {
        warn!("{action} failed: {}", js_error(&err));
    }
}

// =============================================================================
// Element registry
// =============================================================================

/// Two-way mapping between page elements and [`ElementId`]s.
#[derive(Default)]
struct Registry {
    page: RefCell<Vec<Element>>,
    created: RefCell<CreatedNodes<Element>>,
}

impl Registry {
    fn id_of(&self, element: &Element) -> ElementId {
        let key = JsValue::from_str(ID_PROPERTY);
        if let Some(raw) = Reflect::get(element, &key).ok().and_then(|v| v.as_f64()) {
            return ElementId::new(raw as u32);
        }

        let mut page = self.page.borrow_mut();
        let id = ElementId::new(page.len() as u32);
        page.push(element.clone());
        Self::tag(element, id);
        id
    }

    fn tag(element: &Element, id: ElementId) {
        let key = JsValue::from_str(ID_PROPERTY);
        log_failure(
            Reflect::set(element, &key, &JsValue::from(id.raw())).map(|_| ()),
            "tagging element",
        );
    }

    fn get(&self, id: ElementId) -> Option<Element> {
        if id.is_synthetic() {
            self.created.borrow().get(id).cloned()
        } else {
            self.page.borrow().get(id.raw() as usize).cloned()
        }
    }

    fn adopt(&self, id: ElementId, parent: Option<ElementId>, element: Element) {
        Self::tag(&element, id);
        self.created.borrow_mut().insert(id, parent, element);
    }

    fn forget(&self, id: ElementId) {
        if id.is_synthetic() {
            self.created.borrow_mut().remove(id);
        }
    }

    fn collect(&self, list: &NodeList) -> Vec<ElementId> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.id_of(&element))
            .collect()
    }
}

fn control_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Some(input.value())
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        Some(area.value())
    } else {
        element.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
    }
}

// =============================================================================
// Document
// =============================================================================

/// The live page.
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    registry: Rc<Registry>,
    observer: Option<IntersectionObserver>,
    image_observer: Option<IntersectionObserver>,
}

impl WebDocument {
    fn observer_for(&self, element: &Element) -> Option<&IntersectionObserver> {
        if element.dyn_ref::<HtmlImageElement>().is_some() {
            self.image_observer.as_ref()
        } else {
            self.observer.as_ref()
        }
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        let element = self.registry.get(id);
        if element.is_none() {
            warn!("{}", UiError::UnknownElement(id.raw()));
        }
        element
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn create(&self, id: ElementId, parent: Option<ElementId>, spec: NodeSpec) -> Result<(), JsValue> {
        let element = self.document.create_element(&spec.tag)?;
        for class in &spec.classes {
            element.class_list().add_1(class)?;
        }
        for (name, value) in &spec.attributes {
            element.set_attribute(name, value)?;
        }
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            for (property, value) in &spec.styles {
                html.style().set_property(property, value)?;
            }
        }
        if !spec.text.is_empty() {
            element.set_text_content(Some(&spec.text));
        }

        let container: Option<Element> = match parent {
            Some(parent) => self.element(parent),
            None => self.document.body().map(Into::into),
        };
        if let Some(container) = container {
            container.append_child(&element)?;
        }
        self.registry.adopt(id, parent, element);
        Ok(())
    }

    fn try_apply(&self, patch: DomPatch) -> Result<(), JsValue> {
        match patch {
            DomPatch::AddClass { element, class } => {
                if let Some(el) = self.element(element) {
                    el.class_list().add_1(&class)?;
                }
            }
            DomPatch::RemoveClass { element, class } => {
                if let Some(el) = self.element(element) {
                    el.class_list().remove_1(&class)?;
                }
            }
            DomPatch::SetStyle {
                element,
                property,
                value,
            } => {
                if let Some(el) = self.html(element) {
                    if value.is_empty() {
                        el.style().remove_property(&property)?;
                    } else {
                        el.style().set_property(&property, &value)?;
                    }
                }
            }
            DomPatch::SetText { element, text } => {
                if let Some(el) = self.element(element) {
                    el.set_text_content(Some(&text));
                }
            }
            DomPatch::SetHtml { element, html } => {
                if let Some(el) = self.element(element) {
                    el.set_inner_html(&html);
                }
            }
            DomPatch::SetAttribute {
                element,
                name,
                value,
            } => {
                if let Some(el) = self.element(element) {
                    el.set_attribute(&name, &value)?;
                }
            }
            DomPatch::RemoveAttribute { element, name } => {
                if let Some(el) = self.element(element) {
                    el.remove_attribute(&name)?;
                }
            }
            DomPatch::Create {
                element,
                parent,
                spec,
            } => self.create(element, parent, spec)?,
            DomPatch::Remove { element } => {
                if let Some(el) = self.element(element) {
                    el.remove();
                }
                self.registry.forget(element);
            }
            DomPatch::LockScroll(locked) => {
                if let Some(body) = self.document.body() {
                    body.style()
                        .set_property("overflow", if locked { "hidden" } else { "" })?;
                }
            }
            DomPatch::ScrollTo { offset } => self.window.scroll_to_with_x_and_y(0.0, offset),
            DomPatch::Observe { element } => {
                if let Some(el) = self.element(element) {
                    if let Some(observer) = self.observer_for(&el) {
                        observer.observe(&el);
                    }
                }
            }
            DomPatch::Unobserve { element } => {
                if let Some(el) = self.element(element) {
                    if let Some(observer) = self.observer_for(&el) {
                        observer.unobserve(&el);
                    }
                }
            }
            DomPatch::ResetForm { form } => {
                if let Some(form) = self
                    .element(form)
                    .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
                {
                    form.reset();
                }
            }
        }
        Ok(())
    }
}

impl ElementLocator for WebDocument {
    fn query_all(&self, selector: &str) -> UiResult<Vec<ElementId>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|_| UiError::InvalidSelector(selector.to_owned()))?;
        Ok(self.registry.collect(&list))
    }

    fn query_all_within(&self, scope: ElementId, selector: &str) -> UiResult<Vec<ElementId>> {
        let Some(scope) = self.registry.get(scope) else {
            return Ok(Vec::new());
        };
        let list = scope
            .query_selector_all(selector)
            .map_err(|_| UiError::InvalidSelector(selector.to_owned()))?;
        Ok(self.registry.collect(&list))
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.registry.get(element)?.get_attribute(name)
    }

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.registry
            .get(element)
            .is_some_and(|el| el.has_attribute(name))
    }

    fn text(&self, element: ElementId) -> String {
        self.registry
            .get(element)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    fn value(&self, element: ElementId) -> String {
        self.registry
            .get(element)
            .and_then(|el| control_value(&el))
            .unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.registry.get(element)?.parent_element()?;
        Some(self.registry.id_of(&parent))
    }

    fn layout_box(&self, element: ElementId) -> Rect {
        self.registry
            .get(element)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map_or(Rect::ZERO, |el| {
                Rect::new(
                    f64::from(el.offset_left()),
                    f64::from(el.offset_top()),
                    f64::from(el.offset_width()),
                    f64::from(el.offset_height()),
                )
            })
    }

    fn scroll_height(&self, element: ElementId) -> f64 {
        self.registry
            .get(element)
            .map_or(0.0, |el| f64::from(el.scroll_height()))
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        match (self.registry.get(ancestor), self.registry.get(element)) {
            (Some(ancestor), Some(element)) => ancestor.contains(Some(&element)),
            _ => false,
        }
    }
}

impl Document for WebDocument {
    fn apply(&mut self, patch: DomPatch) {
        log_failure(self.try_apply(patch), "applying patch");
    }

    fn supports_intersection(&self) -> bool {
        self.observer.is_some() && self.image_observer.is_some()
    }
}

// =============================================================================
// Consent storage
// =============================================================================

/// `localStorage`-backed consent store.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    /// Opens the window's `localStorage`. Private browsing may deny it; the
    /// store then reports every access as failed.
    #[must_use]
    pub fn open(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            warn!("localStorage unavailable");
        }
        Self { storage }
    }

    fn storage(&self) -> SiteResult<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| SiteError::Storage("localStorage unavailable".into()))
    }
}

impl ConsentStore for LocalStorageStore {
    fn get(&self, key: &str) -> SiteResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| SiteError::Storage(js_error(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> SiteResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| SiteError::Storage(js_error(&e)))
    }
}

// =============================================================================
// Listeners
// =============================================================================

fn listen<E: JsCast + 'static>(
    target: &web_sys::EventTarget,
    kind: &str,
    capture: bool,
    mut handler: impl FnMut(E) + 'static,
) -> SiteResult<()> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target
        .add_event_listener_with_callback_and_bool(kind, callback.as_ref().unchecked_ref(), capture)
        .map_err(|e| SiteError::Platform(js_error(&e)))?;
    callback.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

type SharedSite = Rc<RefCell<Site<WebDocument>>>;

/// Cancels the browser's default only when a mounted component takes the
/// event over. A site borrowed mid-frame leaves the default alone.
fn claim_default(site: &SharedSite, event: &Event, input: &InputEvent) {
    if site
        .try_borrow()
        .is_ok_and(|site| site.claims_default_action(input))
    {
        event.prevent_default();
    }
}

fn install_listeners(
    window: &Window,
    registry: &Rc<Registry>,
    sender: &EventSender,
    site: &SharedSite,
) -> SiteResult<()> {
    let page = window
        .document()
        .ok_or_else(|| SiteError::Platform("no document".into()))?;
    let document: &web_sys::EventTarget = &page;

    let win = window.clone();
    let tx = sender.clone();
    listen(window, "scroll", false, move |_: Event| {
        tx.send(InputEvent::Scroll {
            offset: win.scroll_y().unwrap_or(0.0),
        });
    })?;

    let win = window.clone();
    let tx = sender.clone();
    listen(window, "resize", false, move |_: Event| {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        tx.send(InputEvent::Resize {
            width: dimension(win.inner_width()),
            height: dimension(win.inner_height()),
        });
    })?;

    let (reg, tx, owner) = (Rc::clone(registry), sender.clone(), Rc::clone(site));
    listen(document, "click", false, move |event: Event| {
        let Some(element) = event_element(&event) else {
            return;
        };
        let input = InputEvent::Click {
            target: reg.id_of(&element),
        };
        claim_default(&owner, &event, &input);
        tx.send(input);
    })?;

    let tx = sender.clone();
    listen(document, "keydown", false, move |event: KeyboardEvent| {
        tx.send(InputEvent::KeyDown(Key::from_dom(&event.key())));
    })?;

    let (reg, tx) = (Rc::clone(registry), sender.clone());
    listen(document, "focusout", false, move |event: Event| {
        let Some(element) = event_element(&event) else {
            return;
        };
        if let Some(value) = control_value(&element) {
            tx.send(InputEvent::Blur {
                field: reg.id_of(&element),
                value,
            });
        }
    })?;

    let (reg, tx) = (Rc::clone(registry), sender.clone());
    listen(document, "input", false, move |event: Event| {
        let Some(element) = event_element(&event) else {
            return;
        };
        if let Some(value) = control_value(&element) {
            tx.send(InputEvent::Input {
                field: reg.id_of(&element),
                value,
            });
        }
    })?;

    let (reg, tx, owner) = (Rc::clone(registry), sender.clone(), Rc::clone(site));
    listen(document, "submit", false, move |event: Event| {
        if let Some(form) = event_element(&event) {
            let input = InputEvent::Submit {
                form: reg.id_of(&form),
            };
            claim_default(&owner, &event, &input);
            tx.send(input);
        }
    })?;

    // Resource errors do not bubble.
    let (reg, tx) = (Rc::clone(registry), sender.clone());
    listen(document, "error", true, move |event: Event| {
        if let Some(image) = event_element(&event).filter(|el| el.dyn_ref::<HtmlImageElement>().is_some()) {
            tx.send(InputEvent::ImageError {
                image: reg.id_of(&image),
            });
        }
    })?;

    listen(window, "error", false, |event: ErrorEvent| {
        error!("Uncaught error: {}", event.message());
    })?;
    listen(window, "unhandledrejection", false, |event: PromiseRejectionEvent| {
        error!("Unhandled rejection: {}", js_error(&event.reason()));
    })?;

    Ok(())
}

fn create_observer(
    window: &Window,
    options: &ObserverOptions,
    registry: &Rc<Registry>,
    sender: &EventSender,
) -> Option<IntersectionObserver> {
    let supported = Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false);
    if !supported {
        return None;
    }

    let (reg, tx) = (Rc::clone(registry), sender.clone());
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                tx.send(InputEvent::Visibility {
                    element: reg.id_of(&entry.target()),
                    visible: entry.is_intersecting(),
                });
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin());
    match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
        Ok(observer) => {
            callback.forget();
            Some(observer)
        }
        Err(err) => {
            warn!("IntersectionObserver rejected: {}", js_error(&err));
            None
        }
    }
}

// =============================================================================
// Frame loop and global API
// =============================================================================

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn run_frames(window: &Window, site: SharedSite) -> SiteResult<()> {
    let frame: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&frame);
    let win = window.clone();

    *frame.borrow_mut() = Some(Closure::new(move |now: f64| {
        site.borrow_mut().tick(now);
        if let Some(callback) = next.borrow().as_ref() {
            log_failure(
                win.request_animation_frame(callback.as_ref().unchecked_ref()).map(|_| ()),
                "scheduling frame",
            );
        }
    }));

    let first = frame.borrow();
    if let Some(callback) = first.as_ref() {
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| SiteError::Platform(js_error(&e)))?;
    }
    Ok(())
}

fn expose_api(window: &Window, api: SiteApi) -> SiteResult<()> {
    let global = Object::new();
    let set = |name: &str, value: &JsValue| {
        Reflect::set(&global, &JsValue::from_str(name), value)
            .map(|_| ())
            .map_err(|e| SiteError::Platform(js_error(&e)))
    };

    set("version", &JsValue::from_str(api.version()))?;

    let scroll_api = api.clone();
    let scroll = Closure::<dyn Fn(String)>::new(move |selector: String| {
        scroll_api.scroll_to_element(&selector);
    });
    set("scrollToElement", &scroll.into_js_value())?;

    let notify = Closure::<dyn Fn(String, JsValue)>::new(
        move |message: String, kind: JsValue| {
            let kind = kind
                .as_string()
                .map_or(NotificationKind::Info, |name| NotificationKind::from_name(&name));
            api.show_notification(&message, kind);
        },
    );
    set("showNotification", &notify.into_js_value())?;

    Reflect::set(window, &JsValue::from_str(GLOBAL_NAME), &global)
        .map(|_| ())
        .map_err(|e| SiteError::Platform(js_error(&e)))
}

fn load_config(document: &web_sys::Document) -> SiteConfig {
    let Some(source) = document
        .get_element_by_id(CONFIG_ELEMENT)
        .and_then(|el| el.text_content())
    else {
        return SiteConfig::default();
    };
    SiteConfig::from_toml_str(&source).unwrap_or_else(|err| {
        error!("{err}, using defaults");
        SiteConfig::default()
    })
}

fn boot() -> SiteResult<()> {
    let window = web_sys::window().ok_or_else(|| SiteError::Platform("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| SiteError::Platform("no document".into()))?;

    let config = load_config(&document);
    let bus = EventBus::default();
    let sender = bus.sender();
    let registry = Rc::new(Registry::default());
    let observer = create_observer(&window, &config.observer_options(), &registry, &sender);
    let image_observer = create_observer(&window, &LazyImageLoader::OBSERVER, &registry, &sender);

    let page = WebDocument {
        window: window.clone(),
        document,
        registry: Rc::clone(&registry),
        observer,
        image_observer,
    };
    let site = SiteBuilder::new(config)
        .consent_store(LocalStorageStore::open(&window))
        .event_bus(bus)
        .mount(page);
    let api = site.api();
    let site: SharedSite = Rc::new(RefCell::new(site));

    install_listeners(&window, &registry, &sender, &site)?;
    info!("Vitrine {}", api.version());
    expose_api(&window, api)?;
    run_frames(&window, site)
}

/// Entry point, run when the module is instantiated.
///
/// # Errors
///
/// Returns the platform error if the page cannot be reached at all.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let run = || {
        if let Err(err) = boot() {
            error!("Initialization failed: {err}");
        }
    };

    if document.ready_state() == "loading" {
        let ready = Closure::once_into_js(run);
        document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
    } else {
        run();
    }
    Ok(())
}

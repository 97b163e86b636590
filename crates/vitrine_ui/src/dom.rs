//! Element lookup and the in-memory document.
//!
//! Controllers find their elements through [`ElementLocator`] and write
//! through [`Document::apply`]. The browser adapter implements both on top of
//! `web_sys`; [`MemoryDom`] implements them on a plain tree so every
//! controller can be driven without a rendering engine.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{UiError, UiResult};
use crate::layout::Rect;
use crate::render::{DomPatch, NodeSpec};

/// Unique identifier for an element.
///
/// Ids with the high bit set are synthetic: they were reserved by a
/// [`PatchBuffer`](crate::render::PatchBuffer) for a node that a `Create`
/// patch brings into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    const SYNTHETIC_BIT: u32 = 1 << 31;

    /// Creates an element id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Creates the `n`th synthetic id.
    #[must_use]
    pub const fn synthetic(n: u32) -> Self {
        Self(Self::SYNTHETIC_BIT | n)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true for ids reserved by a patch buffer.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.0 & Self::SYNTHETIC_BIT != 0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "#s{}", self.0 & !Self::SYNTHETIC_BIT)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Read access to the page.
pub trait ElementLocator {
    /// All elements matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] if the selector is rejected.
    fn query_all(&self, selector: &str) -> UiResult<Vec<ElementId>>;

    /// Descendants of `scope` matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] if the selector is rejected.
    fn query_all_within(&self, scope: ElementId, selector: &str) -> UiResult<Vec<ElementId>>;

    /// First element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] if the selector is rejected.
    fn query(&self, selector: &str) -> UiResult<Option<ElementId>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    /// First descendant of `scope` matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] if the selector is rejected.
    fn query_within(&self, scope: ElementId, selector: &str) -> UiResult<Option<ElementId>> {
        Ok(self.query_all_within(scope, selector)?.into_iter().next())
    }

    /// Attribute value.
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Returns true if the attribute is present.
    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// Text content.
    fn text(&self, element: ElementId) -> String;

    /// Current value of a form control.
    fn value(&self, element: ElementId) -> String;

    /// Parent element.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Offset box in document coordinates.
    fn layout_box(&self, element: ElementId) -> Rect;

    /// Full content height (for collapsible content).
    fn scroll_height(&self, element: ElementId) -> f64;

    /// Current vertical scroll offset of the page.
    fn scroll_offset(&self) -> f64;

    /// Returns true if `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

/// A page that can also be written to.
pub trait Document: ElementLocator {
    /// Applies one patch.
    fn apply(&mut self, patch: DomPatch);

    /// Returns true if the platform can report element visibility.
    fn supports_intersection(&self) -> bool {
        true
    }
}

// =============================================================================
// Selectors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// One compound selector: `tag#id.class[attr][attr="value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatch>,
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

impl Selector {
    /// Parses one compound selector. Combinators are not supported.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] on anything else.
    pub fn parse(source: &str) -> UiResult<Self> {
        let invalid = || UiError::InvalidSelector(source.to_owned());
        let mut chars = source.trim().chars().peekable();
        let mut selector = Self::default();

        let tag = take_ident(&mut chars);
        if !tag.is_empty() {
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    let id = take_ident(&mut chars);
                    if id.is_empty() {
                        return Err(invalid());
                    }
                    selector.id = Some(id);
                }
                '.' => {
                    let class = take_ident(&mut chars);
                    if class.is_empty() {
                        return Err(invalid());
                    }
                    selector.classes.push(class);
                }
                '[' => {
                    let name = take_ident(&mut chars);
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    let value = match chars.next() {
                        Some(']') => None,
                        Some('=') => {
                            let value = match chars.peek().copied() {
                                Some(quote @ ('"' | '\'')) => {
                                    chars.next();
                                    chars.by_ref().take_while(|&c| c != quote).collect()
                                }
                                _ => take_ident(&mut chars),
                            };
                            if chars.next() != Some(']') {
                                return Err(invalid());
                            }
                            Some(value)
                        }
                        _ => return Err(invalid()),
                    };
                    selector.attributes.push(AttrMatch { name, value });
                }
                _ => return Err(invalid()),
            }
        }

        if selector == Self::default() {
            return Err(invalid());
        }
        Ok(selector)
    }

    fn matches(&self, node: &Node) -> bool {
        let tag_ok = self.tag.as_deref().map_or(true, |tag| node.tag == tag);
        let id_ok = self
            .id
            .as_deref()
            .map_or(true, |id| node.attributes.get("id").map(String::as_str) == Some(id));
        let classes_ok = self.classes.iter().all(|c| node.has_class(c));
        let attrs_ok = self.attributes.iter().all(|attr| {
            match (attr.value.as_deref(), node.attributes.get(&attr.name)) {
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected == actual,
                _ => false,
            }
        });
        tag_ok && id_ok && classes_ok && attrs_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compound selectors joined by descendant (` `) or child (`>`)
/// combinators, e.g. `.grid .card` or `ul > li.active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<Selector>,
    // `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Parses one complex selector.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] on a dangling combinator or an
    /// invalid compound.
    pub fn parse(source: &str) -> UiResult<Self> {
        let invalid = || UiError::InvalidSelector(source.to_owned());
        let mut parts = Vec::new();
        let mut combinators = Vec::new();
        let mut current = String::new();
        let mut pending = None;
        let mut in_brackets = false;
        let mut quote = None;

        for c in source.trim().chars() {
            if let Some(q) = quote {
                current.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }

            if !in_brackets && (c.is_whitespace() || c == '>') {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Descendant);
                }
                if c == '>' {
                    if parts.is_empty() || pending == Some(Combinator::Child) {
                        return Err(invalid());
                    }
                    pending = Some(Combinator::Child);
                }
                continue;
            }

            if current.is_empty() {
                if let Some(combinator) = pending.take() {
                    combinators.push(combinator);
                }
            }
            match c {
                '[' => in_brackets = true,
                ']' => in_brackets = false,
                '"' | '\'' if in_brackets => quote = Some(c),
                _ => {}
            }
            current.push(c);
        }

        if current.is_empty() {
            if pending == Some(Combinator::Child) || parts.is_empty() {
                return Err(invalid());
            }
        } else {
            parts.push(current);
        }

        let compounds = parts
            .iter()
            .map(|part| Selector::parse(part).map_err(|_| invalid()))
            .collect::<UiResult<Vec<_>>>()?;
        Ok(Self {
            compounds,
            combinators,
        })
    }
}

/// A comma-separated list of complex selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<ComplexSelector>);

impl SelectorList {
    /// Parses `a, b, c`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidSelector`] if any part is invalid.
    pub fn parse(source: &str) -> UiResult<Self> {
        source
            .split(',')
            .map(ComplexSelector::parse)
            .collect::<UiResult<Vec<_>>>()
            .map(Self)
    }
}

// =============================================================================
// In-memory document
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    html: Option<String>,
    value: String,
    rect: Rect,
    scroll_height: f64,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent,
            ..Self::default()
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }
}

/// A document tree held in memory.
///
/// Supports the selector subset the controllers use: tag, `#id`, `.class`,
/// `[attr]`, `[attr="value"]`, descendant and child combinators, and comma
/// lists.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: HashMap<ElementId, Node>,
    body: ElementId,
    next_id: u32,
    scroll_offset: f64,
    scroll_locked: bool,
    observed: BTreeSet<ElementId>,
    intersection_supported: bool,
    applied: usize,
}

impl MemoryDom {
    /// Creates a document holding only `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let body = ElementId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Node::new("body", None));
        Self {
            nodes,
            body,
            next_id: 1,
            scroll_offset: 0.0,
            scroll_locked: false,
            observed: BTreeSet::new(),
            intersection_supported: true,
            applied: 0,
        }
    }

    /// Returns the body element.
    #[must_use]
    pub const fn body(&self) -> ElementId {
        self.body
    }

    /// Starts building a new child of `parent`. The element is inserted by
    /// [`ElementBuilder::build`].
    pub fn element(&mut self, parent: ElementId, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            dom: self,
            node: Node::new(tag, Some(parent)),
        }
    }

    fn insert(&mut self, id: ElementId, parent: Option<ElementId>, node: Node) {
        let parent = parent.unwrap_or(self.body);
        self.nodes.insert(id, Node { parent: Some(parent), ..node });
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
    }

    fn remove_subtree(&mut self, id: ElementId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.observed.remove(&id);
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }
        for child in node.children {
            self.remove_subtree(child);
        }
    }

    fn descendants(&self, root: ElementId, out: &mut Vec<ElementId>) {
        if let Some(node) = self.nodes.get(&root) {
            for &child in &node.children {
                out.push(child);
                self.descendants(child, out);
            }
        }
    }

    fn select(&self, scope: ElementId, selector: &str) -> UiResult<Vec<ElementId>> {
        let list = SelectorList::parse(selector)?;
        let mut candidates = Vec::new();
        self.descendants(scope, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|&id| {
                list.0
                    .iter()
                    .any(|s| self.matches_from(id, s, s.compounds.len() - 1))
            })
            .collect())
    }

    /// Matches `selector.compounds[..=index]` with `id` as the subject of
    /// the last one, walking up for the combinators.
    fn matches_from(&self, id: ElementId, selector: &ComplexSelector, index: usize) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if !selector.compounds[index].matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match selector.combinators[index - 1] {
            Combinator::Child => node
                .parent
                .is_some_and(|parent| self.matches_from(parent, selector, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = node.parent;
                while let Some(current) = ancestor {
                    if self.matches_from(current, selector, index - 1) {
                        return true;
                    }
                    ancestor = self.nodes.get(&current).and_then(|n| n.parent);
                }
                false
            }
        }
    }

    /// Returns true if the element is in the tree.
    #[must_use]
    pub fn exists(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    /// Returns true if the element carries `class`.
    #[must_use]
    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes.get(&element).is_some_and(|n| n.has_class(class))
    }

    /// Returns an inline style value.
    #[must_use]
    pub fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.nodes
            .get(&element)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    /// Returns the markup set through `SetHtml`.
    #[must_use]
    pub fn html(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element).and_then(|n| n.html.as_deref())
    }

    /// Returns the children of an element.
    #[must_use]
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(&element)
            .map_or(&[], |n| n.children.as_slice())
    }

    /// Returns every element carrying `class`, in document order.
    #[must_use]
    pub fn with_class(&self, class: &str) -> Vec<ElementId> {
        let mut all = Vec::new();
        self.descendants(self.body, &mut all);
        all.into_iter().filter(|&id| self.has_class(id, class)).collect()
    }

    /// Sets the value of a form control, as typing would.
    pub fn set_value(&mut self, element: ElementId, value: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.value = value.to_owned();
        }
    }

    /// Moves the page, as the user scrolling would.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Moves an element, as a reflow would.
    pub fn set_layout_box(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.rect = rect;
        }
    }

    /// Returns true while page scrolling is locked.
    #[must_use]
    pub const fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Returns true while visibility is reported for `element`.
    #[must_use]
    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.contains(&element)
    }

    /// Simulates a platform without visibility reporting.
    pub fn set_intersection_supported(&mut self, supported: bool) {
        self.intersection_supported = supported;
    }

    /// Returns the number of patches applied so far.
    #[must_use]
    pub const fn applied_count(&self) -> usize {
        self.applied
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(&element);
        if node.is_none() {
            tracing::trace!("patch for unknown element {element}");
        }
        node
    }

    fn create(&mut self, element: ElementId, parent: Option<ElementId>, spec: NodeSpec) {
        let mut node = Node::new(&spec.tag, parent);
        for class in &spec.classes {
            node.add_class(class);
        }
        node.attributes.extend(spec.attributes);
        node.styles.extend(spec.styles);
        node.text = spec.text;
        self.insert(element, parent, node);
    }

    fn reset_form(&mut self, form: ElementId) {
        let mut controls = Vec::new();
        self.descendants(form, &mut controls);
        for id in controls {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.value = node.attributes.get("value").cloned().unwrap_or_default();
            }
        }
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementLocator for MemoryDom {
    fn query_all(&self, selector: &str) -> UiResult<Vec<ElementId>> {
        self.select(self.body, selector)
    }

    fn query_all_within(&self, scope: ElementId, selector: &str) -> UiResult<Vec<ElementId>> {
        self.select(scope, selector)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.nodes.get(&element)?.attributes.get(name).cloned()
    }

    fn text(&self, element: ElementId) -> String {
        self.nodes
            .get(&element)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn value(&self, element: ElementId) -> String {
        self.nodes
            .get(&element)
            .map(|n| n.value.clone())
            .unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element)?.parent
    }

    fn layout_box(&self, element: ElementId) -> Rect {
        self.nodes.get(&element).map_or(Rect::ZERO, |n| n.rect)
    }

    fn scroll_height(&self, element: ElementId) -> f64 {
        self.nodes.get(&element).map_or(0.0, |n| n.scroll_height)
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }
}

impl Document for MemoryDom {
    fn apply(&mut self, patch: DomPatch) {
        self.applied += 1;
        match patch {
            DomPatch::AddClass { element, class } => {
                if let Some(node) = self.node_mut(element) {
                    node.add_class(&class);
                }
            }
            DomPatch::RemoveClass { element, class } => {
                if let Some(node) = self.node_mut(element) {
                    node.classes.retain(|c| *c != class);
                }
            }
            DomPatch::SetStyle {
                element,
                property,
                value,
            } => {
                if let Some(node) = self.node_mut(element) {
                    if value.is_empty() {
                        node.styles.remove(&property);
                    } else {
                        node.styles.insert(property, value);
                    }
                }
            }
            DomPatch::SetText { element, text } => {
                if let Some(node) = self.node_mut(element) {
                    node.text = text;
                }
            }
            DomPatch::SetHtml { element, html } => {
                if let Some(node) = self.node_mut(element) {
                    node.html = Some(html);
                }
            }
            DomPatch::SetAttribute {
                element,
                name,
                value,
            } => {
                if let Some(node) = self.node_mut(element) {
                    node.attributes.insert(name, value);
                }
            }
            DomPatch::RemoveAttribute { element, name } => {
                if let Some(node) = self.node_mut(element) {
                    node.attributes.remove(&name);
                }
            }
            DomPatch::Create {
                element,
                parent,
                spec,
            } => self.create(element, parent, spec),
            DomPatch::Remove { element } => self.remove_subtree(element),
            DomPatch::LockScroll(locked) => self.scroll_locked = locked,
            DomPatch::ScrollTo { offset } => self.scroll_offset = offset,
            DomPatch::Observe { element } => {
                if self.intersection_supported && self.exists(element) {
                    self.observed.insert(element);
                }
            }
            DomPatch::Unobserve { element } => {
                self.observed.remove(&element);
            }
            DomPatch::ResetForm { form } => self.reset_form(form),
        }
    }

    fn supports_intersection(&self) -> bool {
        self.intersection_supported
    }
}

/// Fluent construction of a [`MemoryDom`] element.
pub struct ElementBuilder<'a> {
    dom: &'a mut MemoryDom,
    node: Node,
}

impl ElementBuilder<'_> {
    /// Sets the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Adds a class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.node.add_class(class);
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Sets text content.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_owned();
        self
    }

    /// Sets the current control value.
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.node.value = value.to_owned();
        self
    }

    /// Sets the offset box.
    #[must_use]
    pub fn rect(mut self, rect: Rect) -> Self {
        self.node.rect = rect;
        self
    }

    /// Sets the full content height.
    #[must_use]
    pub fn scroll_height(mut self, height: f64) -> Self {
        self.node.scroll_height = height;
        self
    }

    /// Inserts the element and returns its id.
    pub fn build(self) -> ElementId {
        let id = ElementId::new(self.dom.next_id);
        self.dom.next_id += 1;
        let parent = self.node.parent;
        self.dom.insert(id, parent, self.node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryDom, ElementId, ElementId) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let nav = dom.element(body, "nav").id("main-nav").build();
        let link = dom
            .element(nav, "a")
            .class("nav-link")
            .attr("href", "#pricing")
            .build();
        (dom, nav, link)
    }

    #[test]
    fn test_selector_parse() {
        assert!(Selector::parse("section[id]").is_ok());
        assert!(Selector::parse(r#"[data-panel="two"]"#).is_ok());
        assert!(Selector::parse(".stat-number[data-count]").is_ok());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("nav a").is_err());
        assert!(Selector::parse("[data-x=\"open").is_err());

        assert!(ComplexSelector::parse(".grid .card").is_ok());
        assert!(ComplexSelector::parse("ul>li.active").is_ok());
        assert!(ComplexSelector::parse(r#"[data-label="a > b"] span"#).is_ok());
        assert!(ComplexSelector::parse("div >").is_err());
        assert!(ComplexSelector::parse("> li").is_err());
        assert!(ComplexSelector::parse("ul > > li").is_err());
        assert!(ComplexSelector::parse("   ").is_err());
    }

    #[test]
    fn test_query_and_contains() {
        let (dom, nav, link) = page();

        assert_eq!(dom.query("#main-nav").unwrap(), Some(nav));
        assert_eq!(dom.query_all(".nav-link").unwrap(), vec![link]);
        assert_eq!(dom.query_within(nav, "a[href]").unwrap(), Some(link));
        assert!(dom.contains(nav, link));
        assert!(!dom.contains(link, nav));
        assert!(dom.query("#missing").unwrap().is_none());
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let form = dom.element(body, "form").class("contact-form").build();
        let a = dom.element(form, "textarea").build();
        let b = dom.element(form, "input").build();

        assert_eq!(dom.query_all_within(form, "input, textarea").unwrap(), vec![a, b]);
    }

    #[test]
    fn test_combinators() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let grid = dom.element(body, "div").class("grid").build();
        let row = dom.element(grid, "div").class("row").build();
        let nested = dom.element(row, "div").class("card").build();
        let direct = dom.element(grid, "div").class("card").build();
        let loose = dom.element(body, "div").class("card").build();

        assert_eq!(dom.query_all(".grid .card").unwrap(), vec![nested, direct]);
        assert_eq!(dom.query_all(".grid > .card").unwrap(), vec![direct]);
        assert_eq!(dom.query_all("body > .card, .row .card").unwrap(), vec![nested, loose]);
        assert!(dom.query_all(".grid >").is_err());
    }

    #[test]
    fn test_apply_create_and_remove() {
        let (mut dom, nav, _) = page();
        let id = ElementId::synthetic(0);

        dom.apply(DomPatch::Create {
            element: id,
            parent: Some(nav),
            spec: NodeSpec::new("div").class("field-error").text("oops"),
        });
        assert_eq!(dom.query_all(".field-error").unwrap(), vec![id]);
        assert_eq!(dom.text(id), "oops");

        dom.apply(DomPatch::Remove { element: nav });
        assert!(!dom.exists(id));
        assert!(dom.query("#main-nav").unwrap().is_none());
    }

    #[test]
    fn test_observe_requires_support() {
        let (mut dom, nav, _) = page();
        dom.set_intersection_supported(false);
        dom.apply(DomPatch::Observe { element: nav });
        assert!(!dom.is_observed(nav));
    }
}

//! # VITRINE UI
//!
//! State machines behind the interactive parts of a static site:
//! - Mobile navigation and active-section highlighting
//! - Fire-once reveal animations (fade-in, counters)
//! - Contact form validation
//! - Lazy images with error fallback
//! - Optional widgets (tabs, accordion, modal, search, cookie banner, notifications)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI PIPELINE                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Input Events → Controllers → Explicit State → DOM Patches    │
//! │       ↓              ↓              ↓              ↓          │
//! │  Rate Limit    ElementLocator   Transitions    Platform apply │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Controllers never touch a real DOM. They read through
//! [`ElementLocator`] and write [`DomPatch`]es into a [`PatchBuffer`].
//! The platform (browser adapter or [`MemoryDom`]) applies them.
//!
//! Time is always supplied by the caller in milliseconds, so every
//! animation and limiter is deterministic under test.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod dom;
pub mod error;
pub mod form;
pub mod input;
pub mod layout;
pub mod lazy;
pub mod nav;
pub mod rate_limit;
pub mod render;
pub mod reveal;
pub mod scroll;
pub mod style;
pub mod widget;

pub use animation::{AnimationHandle, CounterAnimation, PageScroller, SmoothScroll};
pub use dom::{Document, ElementId, ElementLocator, MemoryDom, SelectorList};
pub use error::{UiError, UiResult};
pub use form::{
    FieldKind, FieldValidationState, FormData, FormValidator, SubmitDecision, ValidationError,
};
pub use input::{InputEvent, Key};
pub use layout::{Breakpoint, Breakpoints, Rect, SectionBounds};
pub use lazy::LazyImageLoader;
pub use nav::{NavAction, NavConfig, NavController, NavState};
pub use rate_limit::{Debounce, Debounced, Millis, Throttle, Throttled};
pub use render::{DomPatch, NodeSpec, PatchBuffer};
pub use reveal::{ObserverOptions, RevealConfig, RevealEngine, RevealKind, RevealPhase};
pub use scroll::{ScrollDirection, ScrollState, ScrollTopButton, ScrollTracker};
pub use widget::{
    Accordion, ConsentFlag, CookieBanner, CookieBannerText, Modal, NotificationCenter,
    NotificationConfig, NotificationKind, NotificationPhase, SearchFilter, TabManager, CONSENT_KEY,
};

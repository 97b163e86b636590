//! # VITRINE
//!
//! Interactive behavior for a static site: the composition root that mounts
//! the [`vitrine_ui`] controllers on a page, feeds them events and time, and
//! applies their patches.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   SiteEvent   ┌────────────┐   DomPatch   ┌────────────┐
//! │  Listeners   │──────────────>│            │─────────────>│            │
//! │  (web.rs)    │   EventBus    │    Site    │              │  Document  │
//! ├──────────────┤──────────────>│  (app.rs)  │<─────────────│            │
//! │   SiteApi    │               │            │ ElementLocator└───────────┘
//! └──────────────┘               └────────────┘
//!                                  │       │
//!                        ConsentStore     Submitter
//! ```
//!
//! Everything but [`web`] builds and runs natively; tests drive [`Site`]
//! over a [`vitrine_ui::MemoryDom`].
//!
//! ## Usage
//!
//! ```
//! use vitrine::{InputEvent, Site, SiteConfig};
//! use vitrine_ui::MemoryDom;
//!
//! let mut site = Site::mount(MemoryDom::new(), SiteConfig::default());
//! site.handle(InputEvent::Scroll { offset: 600.0 }, 0.0);
//! site.tick(16.0);
//! assert!(site.scroll_top().is_visible());
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod nodes;
pub mod storage;
pub mod submit;

// wasm-bindgen glue expands to unsafe blocks.
#[cfg(target_arch = "wasm32")]
#[allow(unsafe_code)]
pub mod web;

pub use api::{SiteApi, VERSION};
pub use app::{MountReport, Site, SiteBuilder};
pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
pub use events::{EventBus, EventReceiver, EventSender, SiteEvent};
pub use nodes::CreatedNodes;
pub use storage::{ConsentStore, MemoryConsentStore};
pub use submit::{SimulatedSubmitter, Submitter};
pub use vitrine_ui::{InputEvent, Key, NotificationKind};

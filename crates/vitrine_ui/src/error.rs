//! # UI Error Types
//!
//! Errors raised while reading the page. Missing elements are not errors:
//! lookups return `None` and the caller skips the component.

use thiserror::Error;

/// Errors that can occur while reading the page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The selector could not be parsed or was rejected by the platform.
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    /// An element id does not refer to a live element.
    #[error("unknown element: {0}")]
    UnknownElement(u32),

    /// A counter's target text does not start with an integer.
    #[error("counter target is not an integer: {0:?}")]
    InvalidCounterTarget(String),
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;

//! # Site Error Types
//!
//! All errors that can occur while configuring or running the site.

use thiserror::Error;
use vitrine_ui::UiError;

/// Errors that can occur in the site runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The consent store could not be read or written.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// The form submitter reported a failure.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A component could not be mounted. The rest of the page still works.
    #[error("{component} failed to initialize: {source}")]
    ComponentInit {
        /// Component name.
        component: &'static str,
        /// Underlying error.
        source: UiError,
    },

    /// The browser refused an operation.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Result type for site operations.
pub type SiteResult<T> = Result<T, SiteError>;

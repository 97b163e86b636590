//! Contact form delivery.
//!
//! The page has no backend. [`SimulatedSubmitter`] logs the data and
//! completes after a fixed delay; a real transport would implement
//! [`Submitter`] the same way.

use std::task::Poll;

use tracing::info;
use vitrine_ui::{FormData, Millis};

use crate::error::{SiteError, SiteResult};

/// Delivers validated form data.
///
/// `begin` starts a submission; the site polls it once per tick until it
/// resolves.
pub trait Submitter {
    /// Starts sending `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Submission`] if the submission cannot start.
    fn begin(&mut self, data: &FormData, now: Millis) -> SiteResult<()>;

    /// Checks progress. `Ready` is returned once per submission.
    fn poll(&mut self, now: Millis) -> Poll<SiteResult<()>>;
}

/// Completes every submission after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Millis,
    fail: bool,
    due: Option<Millis>,
}

impl SimulatedSubmitter {
    /// Creates a submitter that succeeds after `delay`.
    #[must_use]
    pub const fn new(delay: Millis) -> Self {
        Self {
            delay,
            fail: false,
            due: None,
        }
    }

    /// Creates a submitter that fails after `delay`.
    #[must_use]
    pub const fn failing(delay: Millis) -> Self {
        Self {
            delay,
            fail: true,
            due: None,
        }
    }

    /// Returns true while a submission is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.due.is_some()
    }
}

impl Submitter for SimulatedSubmitter {
    fn begin(&mut self, data: &FormData, now: Millis) -> SiteResult<()> {
        if self.due.is_some() {
            return Err(SiteError::Submission("a submission is already pending".into()));
        }
        for (name, value) in data.iter() {
            info!("Form field {name} = {value:?}");
        }
        self.due = Some(now + self.delay);
        Ok(())
    }

    fn poll(&mut self, now: Millis) -> Poll<SiteResult<()>> {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                if self.fail {
                    Poll::Ready(Err(SiteError::Submission("delivery failed".into())))
                } else {
                    Poll::Ready(Ok(()))
                }
            }
            _ => Poll::Pending,
        }
    }
}

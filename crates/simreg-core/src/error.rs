//! Error types for the core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing a work item.
///
/// Everything here is absorbed at the unit-of-work boundary and turned
/// into a terminal classification; nothing below that boundary aborts
/// the batch.
#[derive(Debug, Error)]
pub enum Error {
    /// The automation session or a remote call broke.
    #[error("transport error: {0}")]
    Transport(#[from] simreg_appium::Error),

    /// The unit-state clear primitive reported a failure. Non-fatal;
    /// the attempt proceeds on whatever state the device is in.
    #[error("unit reset failed: {0}")]
    Reset(String),

    /// The navigation state machine exhausted its retries without
    /// reaching the phone-entry screen.
    #[error("could not reach the phone entry screen after {attempts} attempts")]
    Navigation {
        /// How many iterations were spent.
        attempts: u32,
    },

    /// No expected screen appeared after submission within the race
    /// window.
    #[error("no outcome screen appeared within {0:?}")]
    ResolutionTimeout(Duration),

    /// A UI control the submission flow depends on was missing.
    #[error("submission failed: {0}")]
    Submission(String),

    /// Mailbox store I/O failure. Logged by callers; never blocks
    /// progress.
    #[error("mailbox I/O error: {0}")]
    Mailbox(#[from] std::io::Error),

    /// The input record file was malformed.
    #[error("record file error: {0}")]
    Record(String),
}

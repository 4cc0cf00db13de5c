//! The code mailbox: a filesystem rendezvous for out-of-band codes.
//!
//! An external channel drops one file per phone number under the store
//! directory; this side only ever reads and deletes. The store assumes a
//! single consumer at a time — the batch processes items sequentially —
//! and takes no locks.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::poll;

/// Filesystem-backed code store, keyed by phone number.
#[derive(Debug, Clone)]
pub struct MailboxStore {
    dir: PathBuf,
    period: Duration,
}

impl MailboxStore {
    /// Creates a store over `dir`, polling at `period`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, period: Duration) -> Self {
        Self {
            dir: dir.into(),
            period,
        }
    }

    /// Path of the record for one phone number.
    #[must_use]
    pub fn record_path(&self, phone_number: &str) -> PathBuf {
        self.dir.join(format!("{phone_number}.txt"))
    }

    /// Waits for a non-empty code record and consumes it.
    ///
    /// The wait has no deadline: the external channel delivers on its
    /// own schedule, and a late delivery is still a valid one. An absent
    /// file and an empty file both mean "keep waiting"; read errors are
    /// logged and polling continues. On a successful read the record is
    /// deleted immediately, so a second watch for the same number blocks
    /// until a new record is delivered. A failed delete is logged and
    /// not retried.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; the signature leaves room for
    /// the store to become remote.
    pub async fn watch(&self, phone_number: &str) -> Result<String> {
        let path = self.record_path(phone_number);
        info!(phone = phone_number, path = %path.display(), "waiting for code record");

        let code = poll::poll_until::<_, Error, _, _>(self.period, || {
            let path = path.clone();
            async move { Ok(read_record(&path).await) }
        })
        .await?;

        if let Err(e) = fs::remove_file(&path).await {
            warn!(phone = phone_number, error = %e, "could not delete consumed code record");
        }
        info!(phone = phone_number, "code record consumed");
        Ok(code)
    }

    /// Deletes the record for a phone number, if present.
    ///
    /// Idempotent: an absent record is success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mailbox`] on any other filesystem failure.
    pub async fn remove(&self, phone_number: &str) -> Result<()> {
        let path = self.record_path(phone_number);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(phone = phone_number, "code record removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Mailbox(e)),
        }
    }

    /// Creates the store directory and an empty record for a number.
    ///
    /// Used by the single-number direct mode so an operator has a file
    /// to drop the code into.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mailbox`] if the directory or file cannot be
    /// created.
    pub async fn seed(&self, phone_number: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.record_path(phone_number), "").await?;
        Ok(())
    }
}

/// One probe of the record file. `None` means "not there yet".
async fn read_record(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(content) => {
            let code = content.trim();
            if code.is_empty() {
                None
            } else {
                Some(code.to_string())
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "code record read failed; retrying");
            None
        }
    }
}

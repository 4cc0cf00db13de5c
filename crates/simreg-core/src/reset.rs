//! Per-unit application state reset.
//!
//! Clearing the application's persisted data is the only isolation
//! mechanism between attempts; there is no session-level equivalent.

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Forces the automated application into a known-clean state on one
/// execution unit.
#[allow(async_fn_in_trait)]
pub trait UnitReset {
    /// Wipes all persisted state of `app_id` on the unit. Idempotent;
    /// safe to call before any session exists.
    async fn reset(&self, unit_id: &str, app_id: &str) -> Result<()>;
}

/// Reset via `adb shell pm clear`.
#[derive(Debug, Clone)]
pub struct AdbReset {
    adb_path: String,
}

impl AdbReset {
    /// Creates a reset controller using the given `adb` executable.
    #[must_use]
    pub fn new(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }
}

impl UnitReset for AdbReset {
    async fn reset(&self, unit_id: &str, app_id: &str) -> Result<()> {
        debug!(unit = unit_id, app = app_id, "clearing application state");

        let output = Command::new(&self.adb_path)
            .args(["-s", unit_id, "shell", "pm", "clear", app_id])
            .output()
            .await
            .map_err(|e| Error::Reset(format!("could not run {}: {e}", self.adb_path)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Reset(format!(
                "pm clear exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // pm clear reports success on stdout, not via the exit code.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.contains("Success") {
            return Err(Error::Reset(format!("pm clear answered: {}", stdout.trim())));
        }

        info!(unit = unit_id, app = app_id, "application state cleared");
        Ok(())
    }
}

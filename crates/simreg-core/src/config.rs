//! Orchestrator configuration.
//!
//! Everything that would otherwise be an ambient constant lives here and
//! is passed into the orchestrator at construction.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration for one batch run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package of the application under automation.
    pub app_package: String,
    /// Path to the `adb` executable used by the unit reset.
    pub adb_path: String,
    /// Directory of the code mailbox (one file per phone number).
    pub mailbox_dir: PathBuf,
    /// Directory the classification records are appended under.
    pub output_dir: PathBuf,
    /// Timing table for every wait in the run.
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_package: "org.telegram.messenger".to_string(),
            adb_path: "adb".to_string(),
            mailbox_dir: PathBuf::from("codes"),
            output_dir: PathBuf::from("."),
            timing: Timing::default(),
        }
    }
}

/// Every interval, deadline, and retry bound in one place.
///
/// The automated UI offers no ready signal, so the whole run is shaped
/// by these values. Defaults match the cadence the target application is
/// known to tolerate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Interval between existence probes of one screen.
    pub probe_poll: Duration,
    /// Deadline for a single screen check during navigation.
    pub screen_probe: Duration,
    /// Deadline for input fields and dialogs that must appear.
    pub control_wait: Duration,
    /// Deadline for the post-submission outcome race.
    pub race_timeout: Duration,
    /// Interval between mailbox polls. The mailbox wait itself has no
    /// deadline.
    pub mailbox_poll: Duration,
    /// Settle time after bringing the application to the foreground.
    pub activate_settle: Duration,
    /// Settle time after a click that triggers a screen transition.
    pub transition_settle: Duration,
    /// Settle time after a back-navigation recovery action.
    pub retreat_settle: Duration,
    /// Settle time between terminating and re-activating the app.
    pub restart_settle: Duration,
    /// Settle time after submitting the verification code.
    pub code_settle: Duration,
    /// Navigation iterations before giving up on a unit.
    pub nav_attempts: u32,
    /// Session connection attempts before failing the batch.
    pub connect_attempts: u32,
    /// Fixed backoff between connection attempts.
    pub connect_backoff: Duration,
    /// Delete keystrokes sent to clear the input fields. Deterministic,
    /// not content-aware, so unknown pre-existing text cannot survive.
    pub clear_keystrokes: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            probe_poll: Duration::from_millis(500),
            screen_probe: Duration::from_secs(3),
            control_wait: Duration::from_secs(10),
            race_timeout: Duration::from_secs(30),
            mailbox_poll: Duration::from_secs(2),
            activate_settle: Duration::from_secs(5),
            transition_settle: Duration::from_secs(3),
            retreat_settle: Duration::from_secs(2),
            restart_settle: Duration::from_secs(3),
            code_settle: Duration::from_secs(5),
            nav_attempts: 5,
            connect_attempts: 5,
            connect_backoff: Duration::from_secs(5),
            clear_keystrokes: 15,
        }
    }
}

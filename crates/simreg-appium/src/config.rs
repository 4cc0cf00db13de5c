//! Driver configuration.

use std::time::Duration;

use crate::protocol::Capabilities;

/// Configuration for an automation session.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Server hostname.
    pub host: String,
    /// Server port (Appium default: 4723).
    pub port: u16,
    /// Package of the application under automation.
    pub app_package: String,
    /// Device serial, when more than one device is attached to the server.
    pub udid: Option<String>,
    /// Display name passed in the capabilities.
    pub device_name: String,
    /// Request timeout for individual remote commands.
    pub command_timeout: Duration,
    /// Idle timeout the server applies to the session, in seconds. The
    /// code rendezvous can park the session for a long time, so this is
    /// an hour by default.
    pub new_command_timeout: u64,
}

impl DriverConfig {
    /// Creates a configuration for a server address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            app_package: String::new(),
            udid: None,
            device_name: "Android".to_string(),
            command_timeout: Duration::from_secs(120),
            new_command_timeout: 3600,
        }
    }

    /// Sets the application package.
    #[must_use]
    pub fn app_package(mut self, package: impl Into<String>) -> Self {
        self.app_package = package.into();
        self
    }

    /// Pins the session to one device serial.
    #[must_use]
    pub fn udid(mut self, udid: impl Into<String>) -> Self {
        self.udid = Some(udid.into());
        self
    }

    /// Sets the per-command request timeout.
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Capability set sent at session creation.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            platform_name: "Android".to_string(),
            automation_name: "UiAutomator2".to_string(),
            device_name: self.device_name.clone(),
            app_package: self.app_package.clone(),
            no_reset: true,
            skip_unlock: true,
            clear_system_files: true,
            new_command_timeout: self.new_command_timeout,
            udid: self.udid.clone(),
        }
    }
}

//! Automation session over the WebDriver wire protocol.
//!
//! A `Session` owns one server-side automation session for one device.
//! All commands are plain HTTP requests; any of them can fail remotely,
//! and the caller decides what is fatal.
//!
//! ## Example
//!
//! ```ignore
//! use simreg_appium::{DriverConfig, Locator, Session};
//!
//! let config = DriverConfig::new("127.0.0.1", 4723)
//!     .app_package("org.example.app")
//!     .udid("SERIAL01");
//!
//! let session = Session::connect(config).await?;
//! session.activate_app("org.example.app").await?;
//! if let Some(element) = session.find(&Locator::xpath("//Button")).await? {
//!     session.click(&element).await?;
//! }
//! session.end().await?;
//! ```

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::protocol::{
    CapabilitiesRequest, ElementRef, Locator, NewSessionRequest, NewSessionResponse,
    SetValueRequest, ValueWrapper, WireError,
};

/// Android keycode for "delete backward" (`KEYCODE_DEL`).
pub const KEYCODE_DEL: u32 = 67;

/// One live automation session.
pub struct Session {
    http: reqwest::Client,
    base: String,
    id: String,
}

impl Session {
    /// Creates a new session on the server.
    ///
    /// This is a single attempt; retry policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or rejects the
    /// capability set.
    pub async fn connect(config: DriverConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.command_timeout)
            .build()?;
        let base = config.base_url();

        let request = NewSessionRequest {
            capabilities: CapabilitiesRequest {
                always_match: config.capabilities(),
            },
        };

        let response: NewSessionResponse =
            send(&http, Method::POST, &format!("{base}/session"), Some(&request)).await?;

        let id = response
            .session_id
            .ok_or_else(|| Error::InvalidSession("server returned no session id".into()))?;

        info!(session = %id, server = %base, "automation session established");

        Ok(Self { http, base, id })
    }

    /// Package name of the application currently in the foreground.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn current_package(&self) -> Result<String> {
        self.get("appium/device/current_package").await
    }

    /// Brings an application to the foreground, launching it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn activate_app(&self, app_id: &str) -> Result<()> {
        self.post_unit(
            "appium/device/activate_app",
            &serde_json::json!({ "appId": app_id }),
        )
        .await
    }

    /// Stops an application.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn terminate_app(&self, app_id: &str) -> Result<()> {
        self.post_unit(
            "appium/device/terminate_app",
            &serde_json::json!({ "appId": app_id }),
        )
        .await
    }

    /// Presses the device back button.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn back(&self) -> Result<()> {
        self.post_unit("back", &serde_json::json!({})).await
    }

    /// Locates an element, once, without waiting.
    ///
    /// `Ok(None)` means the element does not currently exist; that is a
    /// normal negative result, not a failure.
    ///
    /// # Errors
    ///
    /// Returns an error on transport problems or any server error other
    /// than `no such element`.
    pub async fn find(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        match self.post::<_, ElementRef>("element", locator).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => {
                debug!(expr = %locator.value, "element absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Clicks a previously located element.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn click(&self, element: &ElementRef) -> Result<()> {
        self.post_unit(&format!("element/{}/click", element.id), &serde_json::json!({}))
            .await
    }

    /// Types text into a previously located element.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn set_value(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.post_unit(
            &format!("element/{}/value", element.id),
            &SetValueRequest::new(text),
        )
        .await
    }

    /// Sends a sequence of keystrokes to whatever element holds focus.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        let keys: Vec<String> = text.chars().map(String::from).collect();
        self.post_unit("keys", &serde_json::json!({ "value": keys })).await
    }

    /// Presses a raw Android keycode.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn press_keycode(&self, keycode: u32) -> Result<()> {
        self.post_unit(
            "appium/device/press_keycode",
            &serde_json::json!({ "keycode": keycode }),
        )
        .await
    }

    /// Ends the session on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails; the local handle is
    /// consumed either way.
    pub async fn end(self) -> Result<()> {
        let url = format!("{}/session/{}", self.base, self.id);
        send::<(), serde_json::Value>(&self.http, Method::DELETE, &url, None).await?;
        info!(session = %self.id, "automation session ended");
        Ok(())
    }

    // === Private helpers ===

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.base, self.id, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        send::<(), T>(&self.http, Method::GET, &self.url(path), None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        send(&self.http, Method::POST, &self.url(path), Some(body)).await
    }

    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.post::<_, serde_json::Value>(path, body).await.map(|_| ())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("server", &self.base)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Sends one request and decodes the `value` envelope.
///
/// Non-2xx responses are decoded as WebDriver error payloads when possible.
async fn send<B: Serialize, T: DeserializeOwned>(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<&B>,
) -> Result<T> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return ValueWrapper::<T>::decode(&bytes).map_err(Into::into);
    }

    match ValueWrapper::<WireError>::decode(&bytes) {
        Ok(wire) => Err(Error::WebDriver {
            error: wire.error,
            message: wire.message,
        }),
        Err(_) => Err(Error::UnexpectedStatus(status.as_u16())),
    }
}

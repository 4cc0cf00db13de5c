//! Wire types for the W3C WebDriver protocol with Appium extensions.
//!
//! Only the commands the prober actually issues are modeled; this is not a
//! general-purpose WebDriver client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// W3C web element identifier key (WebDriver spec, section 11).
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Every WebDriver response wraps its payload in a `value` field.
#[derive(Debug, Deserialize)]
pub struct ValueWrapper<T> {
    /// The wrapped payload.
    pub value: T,
}

impl<T: DeserializeOwned> ValueWrapper<T> {
    /// Decodes a response body into the wrapped payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a `{"value": ...}` envelope.
    pub fn decode(body: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice::<Self>(body).map(|w| w.value)
    }
}

/// WebDriver error payload (carried inside the `value` envelope).
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    /// W3C error code, e.g. `no such element`.
    pub error: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Element locator strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// XPath expression against the UI tree.
    #[serde(rename = "xpath")]
    XPath,
    /// Accessibility id (`content-desc` on Android).
    #[serde(rename = "accessibility id")]
    AccessibilityId,
    /// Resource id.
    #[serde(rename = "id")]
    Id,
}

/// A locating expression for one UI element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    /// Strategy the server should use.
    pub using: Strategy,
    /// Strategy-specific expression.
    pub value: String,
}

impl Locator {
    /// XPath locator.
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self {
            using: Strategy::XPath,
            value: expr.into(),
        }
    }

    /// Accessibility-id locator.
    #[must_use]
    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self {
            using: Strategy::AccessibilityId,
            value: id.into(),
        }
    }
}

/// A server-side handle to a located element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElementRef {
    /// Opaque element id, valid for the lifetime of the session.
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf", alias = "ELEMENT")]
    pub id: String,
}

/// `POST /session` request body.
#[derive(Debug, Serialize)]
pub struct NewSessionRequest {
    /// W3C capabilities object.
    pub capabilities: CapabilitiesRequest,
}

/// W3C capabilities envelope.
#[derive(Debug, Serialize)]
pub struct CapabilitiesRequest {
    /// Capabilities every matched driver must satisfy.
    #[serde(rename = "alwaysMatch")]
    pub always_match: Capabilities,
}

/// UiAutomator2 capability set.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    /// Target platform.
    #[serde(rename = "platformName")]
    pub platform_name: String,
    /// Automation backend.
    #[serde(rename = "appium:automationName")]
    pub automation_name: String,
    /// Display name of the device.
    #[serde(rename = "appium:deviceName")]
    pub device_name: String,
    /// Package of the application under automation.
    #[serde(rename = "appium:appPackage")]
    pub app_package: String,
    /// Keep application data between sessions; state isolation is done
    /// out-of-band by the unit reset instead.
    #[serde(rename = "appium:noReset")]
    pub no_reset: bool,
    /// Skip the device unlock flow.
    #[serde(rename = "appium:skipUnlock")]
    pub skip_unlock: bool,
    /// Remove stale server artifacts from the device before the session.
    #[serde(rename = "appium:clearSystemFiles")]
    pub clear_system_files: bool,
    /// Seconds of command inactivity the server tolerates. Must be large:
    /// the code rendezvous can keep the session idle for a long time.
    #[serde(rename = "appium:newCommandTimeout")]
    pub new_command_timeout: u64,
    /// Serial of the device to attach to, when more than one is connected.
    #[serde(rename = "appium:udid", skip_serializing_if = "Option::is_none")]
    pub udid: Option<String>,
}

/// `POST /session` response payload.
#[derive(Debug, Deserialize)]
pub struct NewSessionResponse {
    /// Server-assigned session id.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `POST /session/{id}/element/{el}/value` request body.
///
/// Both the W3C `text` field and the legacy `value` key sequence are sent;
/// UiAutomator2 accepts either, older servers only the latter.
#[derive(Debug, Serialize)]
pub struct SetValueRequest {
    /// Text to type into the element.
    pub text: String,
    /// The same text as a key sequence.
    pub value: Vec<String>,
}

impl SetValueRequest {
    /// Builds the request for a piece of text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            value: text.chars().map(String::from).collect(),
        }
    }
}

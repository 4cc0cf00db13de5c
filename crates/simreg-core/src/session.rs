//! The automation-session seam.
//!
//! The state machines are written against this trait rather than the
//! concrete HTTP client so they can be exercised with a scripted fake.

use simreg_appium::{ElementRef, KEYCODE_DEL, Locator, Session};

/// Remote operations the state machines need from a live session.
///
/// Every method is a potentially failing remote call. Methods take
/// `&self`: the outcome race observes several screens concurrently over
/// one session, and observation never mutates UI state.
#[allow(async_fn_in_trait)]
pub trait UiSession {
    /// Package name of the foreground application.
    async fn current_package(&self) -> simreg_appium::Result<String>;

    /// Brings an application to the foreground.
    async fn activate_app(&self, app_id: &str) -> simreg_appium::Result<()>;

    /// Stops an application.
    async fn terminate_app(&self, app_id: &str) -> simreg_appium::Result<()>;

    /// Presses the device back button.
    async fn back(&self) -> simreg_appium::Result<()>;

    /// Locates an element once; `None` when it does not currently exist.
    async fn find(&self, locator: &Locator) -> simreg_appium::Result<Option<ElementRef>>;

    /// Clicks a located element.
    async fn click(&self, element: &ElementRef) -> simreg_appium::Result<()>;

    /// Types text into a located element.
    async fn set_value(&self, element: &ElementRef, text: &str) -> simreg_appium::Result<()>;

    /// Sends keystrokes to the focused element.
    async fn send_keys(&self, text: &str) -> simreg_appium::Result<()>;

    /// Sends one delete-backward keystroke.
    async fn press_delete(&self) -> simreg_appium::Result<()>;

    /// Ends the session on the server.
    async fn end(self) -> simreg_appium::Result<()>;
}

impl UiSession for Session {
    async fn current_package(&self) -> simreg_appium::Result<String> {
        Self::current_package(self).await
    }

    async fn activate_app(&self, app_id: &str) -> simreg_appium::Result<()> {
        Self::activate_app(self, app_id).await
    }

    async fn terminate_app(&self, app_id: &str) -> simreg_appium::Result<()> {
        Self::terminate_app(self, app_id).await
    }

    async fn back(&self) -> simreg_appium::Result<()> {
        Self::back(self).await
    }

    async fn find(&self, locator: &Locator) -> simreg_appium::Result<Option<ElementRef>> {
        Self::find(self, locator).await
    }

    async fn click(&self, element: &ElementRef) -> simreg_appium::Result<()> {
        Self::click(self, element).await
    }

    async fn set_value(&self, element: &ElementRef, text: &str) -> simreg_appium::Result<()> {
        Self::set_value(self, element, text).await
    }

    async fn send_keys(&self, text: &str) -> simreg_appium::Result<()> {
        Self::send_keys(self, text).await
    }

    async fn press_delete(&self) -> simreg_appium::Result<()> {
        self.press_keycode(KEYCODE_DEL).await
    }

    async fn end(self) -> simreg_appium::Result<()> {
        Self::end(self).await
    }
}

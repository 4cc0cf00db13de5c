//! Named screens and their locating expressions.
//!
//! A screen is a detectable state of the automated application's UI,
//! recomputed by live inspection every time it is needed. The UI can
//! change from outside the state machine (popups, animations), so
//! nothing here is ever cached across polls.

use std::time::Duration;

use simreg_appium::{ElementRef, Locator};

use crate::error::Result;
use crate::poll;
use crate::session::UiSession;

/// A named logical location in the onboarding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// The phone-number entry form.
    PhoneEntry,
    /// The initial start-chatting screen.
    Welcome,
    /// The verification-code entry screen.
    CodeEntry,
    /// Popup announcing the number is suspended.
    SuspendedPopup,
    /// Popup announcing too many attempts.
    RateLimitPopup,
    /// Password prompt shown directly after submission.
    PasswordDirect,
    /// Recovery-email prompt shown directly after submission.
    EmailDirect,
    /// Password prompt shown after the code was accepted.
    PasswordFollowup,
}

impl Screen {
    /// The locating expression that detects this screen.
    ///
    /// Static configuration, one expression per screen; the password
    /// followup is the same prompt as the direct one, reached later.
    #[must_use]
    pub fn locator(self) -> Locator {
        Locator::xpath(match self {
            Self::PhoneEntry => r#"//android.widget.TextView[@text="Tu número de teléfono"]"#,
            Self::Welcome => r#"//android.widget.TextView[@text="Empezar a chatear"]"#,
            Self::CodeEntry => r#"//android.widget.TextView[@text="Pon el código"]"#,
            Self::SuspendedPopup => r#"//android.widget.TextView[contains(@text, "suspendido")]"#,
            Self::RateLimitPopup => {
                r#"//android.widget.TextView[contains(@text, "demasiados intentos")]"#
            }
            Self::PasswordDirect | Self::PasswordFollowup => {
                r#"//android.widget.TextView[@text="Tu contraseña"]"#
            }
            Self::EmailDirect => {
                r#"//android.widget.TextView[@text="Elige un correo de acceso"]"#
            }
        })
    }
}

/// Locators for the controls the submission flow interacts with.
pub mod controls {
    use simreg_appium::Locator;

    /// Country-code input field.
    #[must_use]
    pub fn country_code_field() -> Locator {
        Locator::xpath("//android.widget.EditText[1]")
    }

    /// National-number input field.
    #[must_use]
    pub fn national_number_field() -> Locator {
        Locator::xpath("//android.widget.EditText[2]")
    }

    /// The submit control of the phone-entry form.
    #[must_use]
    pub fn submit_button() -> Locator {
        Locator::xpath(r#"//android.widget.FrameLayout[@content-desc="Listo"]/android.view.View"#)
    }

    /// Affirmative control of the number-confirmation dialog.
    #[must_use]
    pub fn confirm_dialog() -> Locator {
        Locator::xpath(r#"//android.widget.TextView[@text="Sí"]"#)
    }

    /// Dismiss control of the suspended / rate-limit popups.
    #[must_use]
    pub fn popup_dismiss() -> Locator {
        Locator::xpath(r#"//android.widget.Button[@text="OK"]"#)
    }
}

/// Waits for an element to exist, up to `deadline`.
///
/// `None` on a lapsed deadline; that is a normal negative result.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn await_element<S: UiSession>(
    session: &S,
    locator: &Locator,
    deadline: Duration,
    period: Duration,
) -> Result<Option<ElementRef>> {
    let element = poll::poll_within(period, deadline, move || async move {
        session.find(locator).await
    })
    .await?;
    Ok(element)
}

/// Checks whether a screen appears within `deadline`.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn exists<S: UiSession>(
    session: &S,
    screen: Screen,
    deadline: Duration,
    period: Duration,
) -> Result<bool> {
    Ok(await_element(session, &screen.locator(), deadline, period)
        .await?
        .is_some())
}

/// Waits for a screen with no deadline. Used by the outcome race, where
/// the surrounding `timeout` is the only bound.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn await_screen<S: UiSession>(
    session: &S,
    screen: Screen,
    period: Duration,
) -> Result<Screen> {
    let locator = screen.locator();
    let locator = &locator;
    poll::poll_until(period, move || async move { session.find(locator).await }).await?;
    Ok(screen)
}

//! Number submission and first-to-appear outcome resolution.
//!
//! After submission the server decides what happens next; the client
//! cannot know in advance which screen will come up. Five watchers race
//! under one deadline, and the first to see its screen settles the
//! resolution. The losing watchers are read-only existence polls, so
//! abandoning them has no side effects.

use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Timing;
use crate::error::{Error, Result};
use crate::item::WorkItem;
use crate::screen::{self, Screen, controls};
use crate::session::UiSession;

/// Which screen won the post-submission race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The code-entry screen: an externally delivered code is required.
    CodeEntry,
    /// The number is suspended.
    Suspended,
    /// Too many attempts.
    RateLimited,
    /// A password prompt appeared directly.
    PasswordDirect,
    /// A recovery-email prompt appeared directly.
    EmailDirect,
}

/// Enters a phone number, submits it, and races the possible next
/// screens.
///
/// Precondition: the phone-entry screen is live. Individual steps are
/// not retried; a failure here is absorbed at the unit-of-work boundary.
///
/// # Errors
///
/// [`Error::Submission`] when a required control never appears,
/// [`Error::ResolutionTimeout`] when no outcome screen appears within
/// the race window, [`Error::Transport`] on remote failures.
pub async fn submit<S: UiSession>(
    session: &S,
    timing: &Timing,
    item: &WorkItem,
) -> Result<Resolution> {
    let country_field = screen::await_element(
        session,
        &controls::country_code_field(),
        timing.control_wait,
        timing.probe_poll,
    )
    .await?
    .ok_or_else(|| Error::Submission("country-code field did not appear".into()))?;

    let number_field = session
        .find(&controls::national_number_field())
        .await?
        .ok_or_else(|| Error::Submission("national-number field did not appear".into()))?;

    // Clear both fields with a fixed burst of delete keystrokes. The
    // burst length is deterministic, not content-aware, so unknown
    // pre-existing text cannot survive it.
    session.click(&number_field).await?;
    for _ in 0..timing.clear_keystrokes {
        session.press_delete().await?;
    }

    let (country_code, national_number) = item.split_number();
    debug!(country_code, national_number, "filling phone-entry form");
    session.set_value(&country_field, country_code).await?;
    session.set_value(&number_field, national_number).await?;

    let submit_button = session
        .find(&controls::submit_button())
        .await?
        .ok_or_else(|| Error::Submission("submit control not found".into()))?;
    session.click(&submit_button).await?;

    let confirm = screen::await_element(
        session,
        &controls::confirm_dialog(),
        timing.control_wait,
        timing.probe_poll,
    )
    .await?
    .ok_or_else(|| Error::Submission("confirmation dialog did not appear".into()))?;
    session.click(&confirm).await?;

    race_outcome_screens(session, timing).await
}

/// Races the five possible post-submission screens; first one wins.
async fn race_outcome_screens<S: UiSession>(
    session: &S,
    timing: &Timing,
) -> Result<Resolution> {
    let period = timing.probe_poll;
    let raced = timeout(timing.race_timeout, async {
        tokio::select! {
            r = screen::await_screen(session, Screen::CodeEntry, period) => {
                r.map(|_| Resolution::CodeEntry)
            }
            r = screen::await_screen(session, Screen::SuspendedPopup, period) => {
                r.map(|_| Resolution::Suspended)
            }
            r = screen::await_screen(session, Screen::PasswordDirect, period) => {
                r.map(|_| Resolution::PasswordDirect)
            }
            r = screen::await_screen(session, Screen::EmailDirect, period) => {
                r.map(|_| Resolution::EmailDirect)
            }
            r = screen::await_screen(session, Screen::RateLimitPopup, period) => {
                r.map(|_| Resolution::RateLimited)
            }
        }
    })
    .await;

    match raced {
        Ok(Ok(resolution)) => {
            info!(?resolution, "outcome screen appeared");
            Ok(resolution)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(Error::ResolutionTimeout(timing.race_timeout)),
    }
}

/// Dismisses the suspended / rate-limit popup via its OK control.
///
/// # Errors
///
/// [`Error::Submission`] when the dismiss control is missing,
/// [`Error::Transport`] on remote failures.
pub async fn dismiss_popup<S: UiSession>(session: &S) -> Result<()> {
    let button = session
        .find(&controls::popup_dismiss())
        .await?
        .ok_or_else(|| Error::Submission("popup dismiss control not found".into()))?;
    session.click(&button).await
        .map_err(Into::into)
}

//! Code-completion resolution.
//!
//! When the service asks for a verification code, the attempt blocks on
//! the mailbox until the external channel delivers one — with no
//! deadline, because a slow delivery is still a valid delivery. What
//! follows the code decides the classification: a password prompt means
//! the account is protected, its absence means it is not.

use tokio::time::sleep;
use tracing::info;

use crate::config::Timing;
use crate::error::Result;
use crate::mailbox::MailboxStore;
use crate::outcome::Outcome;
use crate::screen::{self, Screen};
use crate::session::UiSession;

/// Completes a code-entry resolution into a terminal outcome.
///
/// # Errors
///
/// Returns an error on transport failure; the mailbox wait itself does
/// not fail.
pub async fn with_code<S: UiSession>(
    session: &S,
    mailbox: &MailboxStore,
    timing: &Timing,
    phone_number: &str,
) -> Result<Outcome> {
    let code = mailbox.watch(phone_number).await?;
    info!(phone = phone_number, "submitting verification code");

    session.send_keys(&code).await?;
    sleep(timing.code_settle).await;

    let password_follows = screen::exists(
        session,
        Screen::PasswordFollowup,
        timing.control_wait,
        timing.probe_poll,
    )
    .await?;

    Ok(if password_follows {
        Outcome::TwoFactor
    } else {
        Outcome::NoTwoFactor
    })
}

//! The unit-of-work boundary.
//!
//! One work item in, exactly one outcome out — never an error. Every
//! failure inside the sequence is absorbed here and converted to
//! [`Outcome::Unknown`], and the mailbox record is cleaned up on every
//! terminal path.

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::complete;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::WorkItem;
use crate::mailbox::MailboxStore;
use crate::navigate::Navigator;
use crate::outcome::Outcome;
use crate::reset::UnitReset;
use crate::session::UiSession;
use crate::submit::{self, Resolution};

/// Runs single work items against one live session.
#[derive(Debug)]
pub struct UnitRunner<'a, S, R> {
    session: &'a S,
    reset: &'a R,
    mailbox: &'a MailboxStore,
    config: &'a Config,
}

impl<'a, S: UiSession, R: UnitReset> UnitRunner<'a, S, R> {
    /// Creates a runner over a session and its collaborators.
    #[must_use]
    pub const fn new(
        session: &'a S,
        reset: &'a R,
        mailbox: &'a MailboxStore,
        config: &'a Config,
    ) -> Self {
        Self {
            session,
            reset,
            mailbox,
            config,
        }
    }

    /// Processes one work item to a terminal classification.
    pub async fn run(&self, item: &WorkItem) -> Outcome {
        // A failed reset does not necessarily invalidate the attempt;
        // warn the operator and proceed on whatever state is there.
        if let Err(e) = self.reset.reset(&item.unit_id, &self.config.app_package).await {
            warn!(unit = %item.unit_id, error = %e, "unit reset failed; attempting anyway");
        }

        let outcome = match self.attempt(item).await {
            Ok(outcome) => outcome,
            Err(Error::Navigation { attempts }) => {
                warn!(
                    phone = %item.phone_number,
                    attempts,
                    "phone-entry screen unreachable; skipping submission"
                );
                Outcome::Unknown
            }
            Err(Error::ResolutionTimeout(window)) => {
                warn!(
                    phone = %item.phone_number,
                    ?window,
                    "no outcome screen appeared in the race window"
                );
                Outcome::Unknown
            }
            Err(e) => {
                error!(phone = %item.phone_number, error = %e, "attempt failed");
                self.restart_app().await;
                Outcome::Unknown
            }
        };

        // Cleanup runs on every terminal path, whichever branch was
        // taken; it is a no-op when the record was already consumed.
        if let Err(e) = self.mailbox.remove(&item.phone_number).await {
            warn!(phone = %item.phone_number, error = %e, "mailbox cleanup failed");
        }

        info!(phone = %item.phone_number, %outcome, "work item classified");
        outcome
    }

    /// The fallible middle of the sequence: navigate, submit, resolve.
    async fn attempt(&self, item: &WorkItem) -> Result<Outcome> {
        let timing = &self.config.timing;

        Navigator::new(&self.config.app_package, timing)
            .to_phone_entry(self.session)
            .await?;

        match submit::submit(self.session, timing, item).await? {
            Resolution::Suspended => {
                submit::dismiss_popup(self.session).await?;
                Ok(Outcome::Suspended)
            }
            Resolution::RateLimited => {
                submit::dismiss_popup(self.session).await?;
                Ok(Outcome::RateLimited)
            }
            // The prompt's presence alone is decisive; no interaction
            // with it is needed.
            Resolution::PasswordDirect | Resolution::EmailDirect => Ok(Outcome::TwoFactor),
            Resolution::CodeEntry => {
                complete::with_code(self.session, self.mailbox, timing, &item.phone_number).await
            }
        }
    }

    /// Best-effort restart so the next item starts from a recoverable
    /// state. Failures here are logged only.
    async fn restart_app(&self) {
        info!("restarting application before the next work item");
        let timing = &self.config.timing;

        if let Err(e) = self.session.terminate_app(&self.config.app_package).await {
            warn!(error = %e, "application terminate failed");
            return;
        }
        sleep(timing.restart_settle).await;
        if let Err(e) = self.session.activate_app(&self.config.app_package).await {
            warn!(error = %e, "application re-activation failed");
        }
        sleep(timing.activate_settle).await;
    }
}

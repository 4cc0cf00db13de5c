//! Navigation to the phone-entry screen.
//!
//! The application can be on any screen when an attempt starts — a prior
//! run's leftovers, a popup, an animation. There is no ready signal, so
//! the machine polls: each iteration observes the UI and applies one
//! recovery or transition action, bounded at a fixed number of
//! iterations. A transport error inside one iteration is logged and
//! retried, never escalated from here.

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Timing;
use crate::error::{Error, Result};
use crate::screen::{self, Screen};
use crate::session::UiSession;

/// What one iteration decided to do, given what it observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Already on the phone-entry screen.
    Arrived,
    /// On the welcome screen; click through it.
    ClickThrough,
    /// Nowhere recognizable; navigate back and retry.
    Retreat,
}

/// Pure transition function: observation in, action out.
pub(crate) const fn next_step(on_phone_entry: bool, on_welcome: bool) -> Step {
    if on_phone_entry {
        Step::Arrived
    } else if on_welcome {
        Step::ClickThrough
    } else {
        Step::Retreat
    }
}

/// Drives the application to the phone-entry screen.
#[derive(Debug)]
pub struct Navigator<'a> {
    app_package: &'a str,
    timing: &'a Timing,
}

impl<'a> Navigator<'a> {
    /// Creates a navigator for one application package.
    #[must_use]
    pub const fn new(app_package: &'a str, timing: &'a Timing) -> Self {
        Self { app_package, timing }
    }

    /// Runs the bounded retry loop until the phone-entry screen is live.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Navigation`] when the iteration budget is spent
    /// without arriving. Transport errors inside an iteration are
    /// absorbed and retried.
    pub async fn to_phone_entry<S: UiSession>(&self, session: &S) -> Result<()> {
        for attempt in 1..=self.timing.nav_attempts {
            match self.step(session).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        "navigation iteration failed; retrying"
                    );
                    sleep(self.timing.retreat_settle).await;
                }
            }
        }

        Err(Error::Navigation {
            attempts: self.timing.nav_attempts,
        })
    }

    /// One iteration: recover the foreground app, observe, act.
    /// `Ok(true)` when the phone-entry screen is live.
    async fn step<S: UiSession>(&self, session: &S) -> Result<bool> {
        if session.current_package().await? != self.app_package {
            info!("application not in foreground; activating");
            session.activate_app(self.app_package).await?;
            sleep(self.timing.activate_settle).await;
        }

        let on_phone_entry = screen::exists(
            session,
            Screen::PhoneEntry,
            self.timing.screen_probe,
            self.timing.probe_poll,
        )
        .await?;

        let welcome = if on_phone_entry {
            None
        } else {
            screen::await_element(
                session,
                &Screen::Welcome.locator(),
                self.timing.screen_probe,
                self.timing.probe_poll,
            )
            .await?
        };

        match next_step(on_phone_entry, welcome.is_some()) {
            Step::Arrived => Ok(true),
            Step::ClickThrough => {
                info!("on welcome screen; clicking through");
                if let Some(element) = welcome {
                    session.click(&element).await?;
                }
                sleep(self.timing.transition_settle).await;
                screen::exists(
                    session,
                    Screen::PhoneEntry,
                    self.timing.screen_probe,
                    self.timing.probe_poll,
                )
                .await
            }
            Step::Retreat => {
                info!("no recognizable screen; navigating back");
                session.back().await?;
                sleep(self.timing.retreat_settle).await;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_prefers_arrival() {
        assert_eq!(next_step(true, false), Step::Arrived);
        // Phone entry wins even if both probes somehow fire.
        assert_eq!(next_step(true, true), Step::Arrived);
    }

    #[test]
    fn test_next_step_clicks_through_welcome() {
        assert_eq!(next_step(false, true), Step::ClickThrough);
    }

    #[test]
    fn test_next_step_retreats_when_lost() {
        assert_eq!(next_step(false, false), Step::Retreat);
    }
}

//! Batch orchestration.
//!
//! One automation session serves the whole batch and is reused across
//! work items; items are processed strictly in input order, one at a
//! time. Teardown happens on every exit path. When no session can be
//! established at all, every item is classified unknown without a single
//! UI interaction.

use std::collections::BTreeMap;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::item::WorkItem;
use crate::mailbox::MailboxStore;
use crate::outcome::Outcome;
use crate::reset::UnitReset;
use crate::runner::UnitRunner;
use crate::session::UiSession;
use crate::sink::ResultSink;

/// Per-outcome tally of one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items processed.
    pub processed: usize,
    /// Count per terminal classification.
    pub outcomes: BTreeMap<Outcome, usize>,
    /// Whether a session was ever established.
    pub connected: bool,
}

impl BatchSummary {
    fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        *self.outcomes.entry(outcome).or_default() += 1;
    }

    /// Items that ended in the given classification.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or_default()
    }
}

/// Owns the session lifecycle and iterates the unit-of-work runner.
#[derive(Debug)]
pub struct Batch<'a, R> {
    config: &'a Config,
    reset: &'a R,
    mailbox: &'a MailboxStore,
    sink: &'a ResultSink,
}

impl<'a, R: UnitReset> Batch<'a, R> {
    /// Creates an orchestrator over explicit collaborators.
    #[must_use]
    pub const fn new(
        config: &'a Config,
        reset: &'a R,
        mailbox: &'a MailboxStore,
        sink: &'a ResultSink,
    ) -> Self {
        Self {
            config,
            reset,
            mailbox,
            sink,
        }
    }

    /// Runs the whole batch.
    ///
    /// `connect` is invoked per attempt; it typically wraps
    /// [`simreg_appium::Session::connect`].
    pub async fn run<S, C, Fut>(&self, items: &[WorkItem], connect: C) -> BatchSummary
    where
        S: UiSession,
        C: Fn() -> Fut,
        Fut: Future<Output = simreg_appium::Result<S>>,
    {
        let mut summary = BatchSummary::default();

        // Clear the first unit before the session exists: capability
        // negotiation can launch the app, and it must come up clean.
        if let Some(first) = items.first()
            && let Err(e) = self
                .reset
                .reset(&first.unit_id, &self.config.app_package)
                .await
        {
            warn!(unit = %first.unit_id, error = %e, "pre-session reset failed");
        }

        let Some(session) = self.connect_with_retry(&connect).await else {
            error!("no automation session could be established; classifying batch as unknown");
            for item in items {
                if let Err(e) = self.mailbox.remove(&item.phone_number).await {
                    warn!(phone = %item.phone_number, error = %e, "mailbox cleanup failed");
                }
                self.record(item, Outcome::Unknown, &mut summary).await;
            }
            return summary;
        };
        summary.connected = true;

        let runner = UnitRunner::new(&session, self.reset, self.mailbox, self.config);
        for (index, item) in items.iter().enumerate() {
            info!(
                item = index + 1,
                total = items.len(),
                phone = %item.phone_number,
                unit = %item.unit_id,
                "processing work item"
            );
            let outcome = runner.run(item).await;
            self.record(item, outcome, &mut summary).await;
        }

        if let Err(e) = session.end().await {
            warn!(error = %e, "session teardown failed");
        }

        info!(processed = summary.processed, "batch complete");
        summary
    }

    /// Bounded connection loop: fixed backoff, no exponent.
    async fn connect_with_retry<S, C, Fut>(&self, connect: &C) -> Option<S>
    where
        C: Fn() -> Fut,
        Fut: Future<Output = simreg_appium::Result<S>>,
    {
        let attempts = self.config.timing.connect_attempts;
        for attempt in 1..=attempts {
            info!(attempt, attempts, "connecting to automation server");
            match connect().await {
                Ok(session) => return Some(session),
                Err(e) => {
                    warn!(attempt, error = %e, "connection attempt failed");
                    if attempt < attempts {
                        sleep(self.config.timing.connect_backoff).await;
                    }
                }
            }
        }
        None
    }

    async fn record(&self, item: &WorkItem, outcome: Outcome, summary: &mut BatchSummary) {
        if let Err(e) = self.sink.append(item, outcome).await {
            warn!(phone = %item.phone_number, error = %e, "could not append classification record");
        }
        summary.record(outcome);
    }
}

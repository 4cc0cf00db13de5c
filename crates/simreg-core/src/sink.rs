//! Append-only classification records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;
use crate::item::WorkItem;
use crate::outcome::Outcome;

/// Routes terminal classifications to per-outcome record files.
///
/// One line is appended per classified item. An outcome with no
/// configured destination is dropped here — silently, by contract; this
/// is the only layer allowed to do that.
#[derive(Debug, Clone)]
pub struct ResultSink {
    dir: PathBuf,
    routes: BTreeMap<Outcome, String>,
}

impl ResultSink {
    /// Creates a sink with the default routing table.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            routes: Self::default_routes(),
        }
    }

    /// Creates a sink with an explicit routing table.
    #[must_use]
    pub fn with_routes(dir: impl Into<PathBuf>, routes: BTreeMap<Outcome, String>) -> Self {
        Self {
            dir: dir.into(),
            routes,
        }
    }

    /// The five standard destinations.
    #[must_use]
    pub fn default_routes() -> BTreeMap<Outcome, String> {
        [
            (Outcome::TwoFactor, "num_2fa.txt"),
            (Outcome::NoTwoFactor, "num_no_2fa.txt"),
            (Outcome::Suspended, "num_suspendidos.txt"),
            (Outcome::RateLimited, "num_reintentos.txt"),
            (Outcome::Unknown, "num_error.txt"),
        ]
        .into_iter()
        .map(|(outcome, name)| (outcome, name.to_string()))
        .collect()
    }

    /// Appends one classification record.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination file cannot be written.
    pub async fn append(&self, item: &WorkItem, outcome: Outcome) -> Result<()> {
        let Some(name) = self.routes.get(&outcome) else {
            debug!(%outcome, phone = %item.phone_number, "no destination configured; dropping");
            return Ok(());
        };

        let line = format!(
            "{},{},{},{}\n",
            item.phone_number, item.port, item.iccid, item.unit_id
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(name))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item() -> WorkItem {
        WorkItem {
            phone_number: "34612345678".to_string(),
            unit_id: "SERIAL01".to_string(),
            port: "COM3".to_string(),
            iccid: "8934001234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_routes_by_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());

        sink.append(&item(), Outcome::Suspended).await.unwrap();
        sink.append(&item(), Outcome::Suspended).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("num_suspendidos.txt")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(
            content.lines().next().unwrap(),
            "34612345678,COM3,8934001234,SERIAL01"
        );
        assert!(!dir.path().join("num_2fa.txt").exists());
    }

    #[tokio::test]
    async fn test_unrouted_outcome_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut routes = ResultSink::default_routes();
        routes.remove(&Outcome::Unknown);
        let sink = ResultSink::with_routes(dir.path(), routes);

        sink.append(&item(), Outcome::Unknown).await.unwrap();
        assert!(!dir.path().join("num_error.txt").exists());
    }
}

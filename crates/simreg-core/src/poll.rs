//! Poll-until-predicate primitives.
//!
//! The automated UI and the code mailbox offer no push notifications;
//! every wait in the system is one of these two shapes. Both suspend
//! cooperatively between probes, never busy-spin.

use std::time::Duration;

use tokio::time::{sleep, timeout};

/// Polls `probe` every `period` until it yields a value. No deadline.
///
/// This is the deliberately unbounded suspension used by the mailbox
/// watch and the race watchers; callers that need a deadline wrap it in
/// [`poll_within`].
///
/// # Errors
///
/// Propagates the first error the probe returns.
pub async fn poll_until<T, E, F, Fut>(period: Duration, mut probe: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        sleep(period).await;
    }
}

/// Polls `probe` every `period` until it yields a value or `deadline`
/// elapses. A lapsed deadline is a normal negative result, not an error.
///
/// # Errors
///
/// Propagates the first error the probe returns.
pub async fn poll_within<T, E, F, Fut>(
    period: Duration,
    deadline: Duration,
    probe: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    match timeout(deadline, poll_until(period, probe)).await {
        Ok(Ok(value)) => Ok(Some(value)),
        Ok(Err(e)) => Err(e),
        Err(_) => Ok(None),
    }
}

//! Generic bounded poll loop and the clock capability it runs against.

use async_trait::async_trait;
use log::debug;
use std::future::Future;
use std::time::{Duration, Instant};

use super::WaitError;

/// Time source and sleep primitive used by the poll loop.
///
/// Injected rather than taken from ambient globals so tests can substitute a
/// deterministic clock without patching anything process-wide. Production
/// callers use [`TokioClock`].
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, interval: Duration);
}

/// Clock backed by the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Identifies one wait for logging and timeout reports.
#[derive(Debug, Clone)]
pub struct WaitTarget {
    /// Resource kind label, e.g. `volume` or `interface`.
    pub resource: String,
    pub id: String,
    /// Human-readable description of the awaited condition.
    pub target: String,
}

impl WaitTarget {
    pub fn new(
        resource: impl Into<String>,
        id: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
            target: target.into(),
        }
    }
}

/// Classification of one observed snapshot.
pub enum PollState<T> {
    /// The awaited condition holds; the wait ends with this value.
    Satisfied(T),
    /// Not there yet; carries the observed status for the timeout report.
    Retry(String),
    /// A terminal failure state was observed; polling stops immediately.
    Fatal(WaitError),
}

/// Polls `observe` until it reports success, a fatal state, or the budget
/// runs out.
///
/// Elapsed time is measured against the clock's start reading, not the
/// iteration count, so the timeout stays honest when individual queries are
/// slow. The deadline check runs strictly after each observation: a status
/// that flips to success exactly at the deadline is still seen. After a
/// fatal observation no further sleep or query happens.
pub async fn poll_until<K, T, F, Fut>(
    clock: &K,
    interval: Duration,
    timeout: Duration,
    target: &WaitTarget,
    mut observe: F,
) -> Result<T, WaitError>
where
    K: Clock,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>, WaitError>>,
{
    let start = clock.now();
    let mut last_seen = String::from("unknown");

    loop {
        match observe().await? {
            PollState::Satisfied(value) => return Ok(value),
            PollState::Fatal(err) => return Err(err),
            PollState::Retry(observed) => last_seen = observed,
        }

        let elapsed = clock.now().saturating_duration_since(start);
        if elapsed >= timeout {
            return Err(WaitError::Timeout {
                resource: target.resource.clone(),
                id: target.id.clone(),
                target: target.target.clone(),
                last: last_seen,
                timeout_secs: timeout.as_secs(),
            });
        }

        debug!(
            "{} {} not ready ({}), waiting for {} ({:?} elapsed)",
            target.resource, target.id, last_seen, target.target, elapsed
        );
        clock.sleep(interval).await;
    }
}

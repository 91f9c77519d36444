//! Background reconciliation of the status store with the server.
//!
//! One loop per mounted view, fixed interval, no backoff. A failed tick is
//! logged and the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::store::{MergeOutcome, StatusStore};
use super::types::{ReadingSource, StatusReading};
use crate::api::{ApiError, VerificationApi};
use crate::observability::poll_metrics;

/// Fetch authoritative status and merge it.
///
/// The status and profile endpoints are queried together. The status
/// endpoint's answer wins; the profile fills in the document reference and
/// denial reason. Fails only when both requests fail.
pub async fn poll_once<A>(api: &A, store: &StatusStore) -> Result<MergeOutcome, ApiError>
where
    A: VerificationApi + ?Sized,
{
    let (status, profile) = tokio::join!(api.fetch_status(), api.fetch_profile());

    let reading = match (status, profile) {
        (Ok(status), Ok(profile)) => {
            StatusReading::from(&status).or(StatusReading::from(&profile))
        }
        (Ok(status), Err(e)) => {
            debug!(error = %e, "Profile fetch failed, using status endpoint only");
            StatusReading::from(&status)
        }
        (Err(e), Ok(profile)) => {
            debug!(error = %e, "Status fetch failed, using profile only");
            StatusReading::from(&profile)
        }
        (Err(status_err), Err(profile_err)) => {
            debug!(error = %profile_err, "Profile fetch failed");
            return Err(status_err);
        }
    };

    Ok(store.merge(reading, ReadingSource::Poll))
}

/// Why a polling loop stopped on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Approved and the approval notice was acknowledged (or never needed)
    Settled,
    /// The owning view was torn down
    Unmounted,
}

pub struct PollingLoop<A: ?Sized> {
    api: Arc<A>,
    store: StatusStore,
    interval: Duration,
}

impl<A> PollingLoop<A>
where
    A: VerificationApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, store: StatusStore, interval: Duration) -> Self {
        Self {
            api,
            store,
            interval,
        }
    }

    /// Start polling on the current runtime. Dropping the handle stops it.
    pub fn spawn(self) -> PollHandle {
        PollHandle {
            task: Some(tokio::spawn(self.run())),
        }
    }

    async fn retry_live_fetch(&self) {
        let metrics = poll_metrics();
        metrics.record_tick();
        match self.api.fetch_profile().await {
            Ok(profile) => {
                let outcome = self.store.merge(StatusReading::from(&profile), ReadingSource::Profile);
                debug!(?outcome, "Live profile fetch retried");
            }
            Err(e) => {
                metrics.record_fetch_failure();
                warn!(error = %e, "Live profile fetch failed again, retrying next tick");
            }
        }
    }

    async fn run(self) -> PollExit {
        let metrics = poll_metrics();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the first poll waits one interval
        ticker.tick().await;

        debug!(interval_ms = self.interval.as_millis() as u64, "Polling loop started");
        loop {
            ticker.tick().await;

            if !self.store.is_mounted() {
                debug!("Polling loop stopping: view unmounted");
                return PollExit::Unmounted;
            }
            if self.store.approval_settled() {
                debug!("Polling loop stopping: approval settled");
                return PollExit::Settled;
            }
            if !self.store.state().has_document() {
                // Nothing usable arrived at mount; keep asking for the profile
                if !self.store.has_observed() {
                    self.retry_live_fetch().await;
                }
                continue;
            }

            metrics.record_tick();
            match poll_once(self.api.as_ref(), &self.store).await {
                Ok(outcome) => debug!(?outcome, "Poll tick merged"),
                Err(e) => {
                    metrics.record_fetch_failure();
                    warn!(error = %e, transient = e.is_transient(), "Status poll failed, retrying next tick");
                }
            }
        }
    }
}

/// Teardown handle for a running polling loop
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<PollExit>>,
}

impl PollHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the loop to stop by itself. `None` if it was cancelled.
    pub async fn join(mut self) -> Option<PollExit> {
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

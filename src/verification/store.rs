//! Single source of truth for the client's verification state.
//!
//! Every writer (props, cached profile, live fetches, polls, uploads) goes
//! through [`StatusStore::merge`]. Readers subscribe to a watch channel and
//! re-render on change.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

use super::gate::{GatePhase, Notice, NotificationGate, Notifier};
use super::types::{ReadingSource, StatusReading, VerificationState, VerificationStatus};
use crate::observability::poll_metrics;

/// What readers see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub state: VerificationState,
    /// No meaningful reading has arrived yet
    pub loading: bool,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            state: VerificationState::default(),
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The owning view was torn down before the reading arrived
    Unmounted,
    /// Reading carried no information
    Empty,
    /// Out-of-order read after approval was observed
    StaleAfterApproval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied {
        previous: VerificationStatus,
        current: VerificationStatus,
    },
    /// Accepted, but nothing visible changed
    Unchanged,
    Ignored(IgnoreReason),
}

impl MergeOutcome {
    pub fn was_applied(&self) -> bool {
        matches!(self, MergeOutcome::Applied { .. })
    }
}

/// Compute the state that results from applying `reading` to `state`.
pub fn apply_reading(
    state: &VerificationState,
    reading: &StatusReading,
    now: DateTime<Utc>,
) -> Result<VerificationState, IgnoreReason> {
    if reading.is_empty() {
        return Err(IgnoreReason::Empty);
    }
    if state.status == VerificationStatus::Approved
        && matches!(reading.status, Some(status) if status != VerificationStatus::Approved)
    {
        return Err(IgnoreReason::StaleAfterApproval);
    }

    let mut status = reading.status.unwrap_or(state.status);
    let mut document_ref = reading
        .document_ref
        .clone()
        .or_else(|| state.document_ref.clone());

    match status {
        // A denied document is never shown again
        VerificationStatus::Denied => document_ref = None,
        VerificationStatus::None if reading.status == Some(VerificationStatus::None) => {
            document_ref = None
        }
        // An undecided upload is under review
        VerificationStatus::None if document_ref.is_some() => status = VerificationStatus::Pending,
        _ => {}
    }

    let denial_reason = if status == VerificationStatus::Denied {
        let previous = if state.status == VerificationStatus::Denied {
            state.denial_reason.clone()
        } else {
            None
        };
        reading.denial_reason.clone().or(previous)
    } else {
        None
    };

    let status_changed = status != state.status;
    Ok(VerificationState {
        status,
        document_ref,
        denial_reason,
        last_observed_status: if status_changed {
            Some(state.status)
        } else {
            state.last_observed_status
        },
        status_since: if status_changed {
            Some(now)
        } else {
            state.status_since
        },
    })
}

struct StoreInner {
    gate: NotificationGate,
    mounted: bool,
    /// A reading has been accepted this session; approvals after it are edges
    observed: bool,
}

/// Shared, cloneable handle to the verification state
#[derive(Clone)]
pub struct StatusStore {
    tx: Arc<watch::Sender<StoreSnapshot>>,
    inner: Arc<Mutex<StoreInner>>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStore")
            .field("snapshot", &*self.tx.borrow())
            .finish()
    }
}

impl StatusStore {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (tx, _rx) = watch::channel(StoreSnapshot::default());
        Self {
            tx: Arc::new(tx),
            inner: Arc::new(Mutex::new(StoreInner {
                gate: NotificationGate::new(),
                mounted: true,
                observed: false,
            })),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    pub fn state(&self) -> VerificationState {
        self.tx.borrow().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().mounted
    }

    /// Some reading has been accepted since the session started
    pub fn has_observed(&self) -> bool {
        self.lock().observed
    }

    pub fn mount(&self) {
        self.lock().mounted = true;
    }

    /// Late readings are dropped from here on.
    pub fn unmount(&self) {
        self.lock().mounted = false;
    }

    /// Apply a reading unless it is empty, stale, or arrives after teardown.
    ///
    /// Notices are shown after the store lock is released, so a notifier may
    /// call straight back into the store.
    pub fn merge(&self, reading: StatusReading, source: ReadingSource) -> MergeOutcome {
        self.merge_at(reading, source, Utc::now())
    }

    pub fn merge_at(
        &self,
        reading: StatusReading,
        source: ReadingSource,
        now: DateTime<Utc>,
    ) -> MergeOutcome {
        let (outcome, notices) = self.merge_locked(&reading, source, now);
        for notice in &notices {
            self.notifier.show(notice);
        }
        outcome
    }

    fn merge_locked(
        &self,
        reading: &StatusReading,
        source: ReadingSource,
        now: DateTime<Utc>,
    ) -> (MergeOutcome, Vec<Notice>) {
        let metrics = poll_metrics();
        let mut inner = self.lock();
        let mut notices = Vec::new();

        if !inner.mounted {
            debug!(source = %source, "Dropping reading for unmounted view");
            metrics.record_merge_ignored();
            return (MergeOutcome::Ignored(IgnoreReason::Unmounted), notices);
        }

        let mut outcome = MergeOutcome::Unchanged;
        self.tx.send_if_modified(|snapshot| {
            let next = match apply_reading(&snapshot.state, reading, now) {
                Ok(next) => next,
                Err(reason) => {
                    outcome = MergeOutcome::Ignored(reason);
                    return false;
                }
            };

            let was_loading = std::mem::replace(&mut snapshot.loading, false);
            if next == snapshot.state {
                return was_loading;
            }

            outcome = MergeOutcome::Applied {
                previous: snapshot.state.status,
                current: next.status,
            };
            snapshot.state = next;
            true
        });

        // The first accepted reading of a session is the starting point, not an edge
        let observed_before = inner.observed;
        if !matches!(outcome, MergeOutcome::Ignored(_)) {
            inner.observed = true;
        }

        match outcome {
            MergeOutcome::Applied { previous, current } => {
                metrics.record_merge_applied();
                if previous != current {
                    info!(source = %source, from = %previous, to = %current, "Verification status changed");
                }
                if current == VerificationStatus::Approved
                    && previous != VerificationStatus::Approved
                    && observed_before
                {
                    notices.extend(inner.gate.on_approval_transition());
                }
                if current == VerificationStatus::Denied && previous != VerificationStatus::Denied {
                    let reason = self.tx.borrow().state.denial_reason.clone();
                    notices.extend(inner.gate.on_denial(reason.as_deref()));
                }
            }
            MergeOutcome::Ignored(IgnoreReason::StaleAfterApproval) => {
                debug!(source = %source, status = ?reading.status, "Rejecting stale read after approval");
                metrics.record_stale_read();
                metrics.record_merge_ignored();
            }
            MergeOutcome::Ignored(_) => metrics.record_merge_ignored(),
            MergeOutcome::Unchanged => {}
        }

        (outcome, notices)
    }

    /// End the loading placeholder even if nothing arrived.
    pub fn finish_loading(&self) {
        self.tx.send_if_modified(|snapshot| std::mem::replace(&mut snapshot.loading, false));
    }

    /// The user closed the approval notice.
    pub fn acknowledge_approval(&self) {
        self.lock().gate.acknowledge();
    }

    /// Approved, and no approval notice is still waiting on the user
    pub fn approval_settled(&self) -> bool {
        let inner = self.lock();
        self.tx.borrow().state.status == VerificationStatus::Approved
            && !inner.gate.awaiting_acknowledgement()
    }

    pub fn gate_phase(&self) -> GatePhase {
        self.lock().gate.phase()
    }

    pub fn approvals_shown(&self) -> u64 {
        self.lock().gate.approvals_shown()
    }

    /// Forget everything; used on logout and new-session load.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.gate.reset();
        inner.observed = false;
        self.tx.send_replace(StoreSnapshot::default());
        info!("Verification state reset");
    }
}

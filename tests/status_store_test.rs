// Ordering guarantees of the status store over arbitrary reading sequences.

mod fixtures;

use std::sync::Arc;

use barangay_verify::verification::{
    resolve_step, ReadingSource, StatusReading, StatusStore, Step, VerificationStatus,
};
use fixtures::RecordingNotifier;
use proptest::prelude::*;

const STATUSES: [VerificationStatus; 4] = [
    VerificationStatus::None,
    VerificationStatus::Pending,
    VerificationStatus::Approved,
    VerificationStatus::Denied,
];

fn reading(status: VerificationStatus) -> StatusReading {
    match status {
        VerificationStatus::None => StatusReading::status(status),
        _ => StatusReading::status(status).with_document("doc1"),
    }
}

/// Every sequence of `len` statuses, in lexicographic order
fn sequences(len: u32) -> impl Iterator<Item = Vec<VerificationStatus>> {
    (0..STATUSES.len().pow(len)).map(move |mut n| {
        (0..len)
            .map(|_| {
                let status = STATUSES[n % STATUSES.len()];
                n /= STATUSES.len();
                status
            })
            .collect()
    })
}

fn any_status() -> impl Strategy<Value = VerificationStatus> {
    prop::sample::select(STATUSES.to_vec())
}

proptest! {
    #[test]
    fn approval_is_never_regressed_by_later_reads(
        sequence in prop::collection::vec(any_status(), 1..16)
    ) {
        let store = StatusStore::new(Arc::new(RecordingNotifier::default()));
        let mut approved_seen = false;

        for status in &sequence {
            store.merge(reading(*status), ReadingSource::Poll);
            approved_seen |= *status == VerificationStatus::Approved;

            if approved_seen {
                let state = store.state();
                prop_assert_eq!(state.status, VerificationStatus::Approved);
                prop_assert_eq!(resolve_step(&state, false), Step::Verified);
            }
        }
    }

    #[test]
    fn status_only_reads_keep_the_document(
        sequence in prop::collection::vec(any_status(), 1..16)
    ) {
        let store = StatusStore::new(Arc::new(RecordingNotifier::default()));
        store.merge(reading(VerificationStatus::Pending), ReadingSource::Upload);

        for status in &sequence {
            let before = store.state();
            store.merge(StatusReading::status(*status), ReadingSource::Poll);
            let after = store.state();

            // Only a denial or an explicit reset drops the document
            let cleared = matches!(after.status, VerificationStatus::Denied | VerificationStatus::None);
            if before.has_document() && !cleared {
                prop_assert!(after.has_document());
            }
        }
    }
}

#[test]
fn approval_notice_skips_only_the_first_reading() {
    for sequence in sequences(5) {
        let notifier = Arc::new(RecordingNotifier::default());
        let store = StatusStore::new(notifier.clone());
        for status in &sequence {
            store.merge(reading(*status), ReadingSource::Poll);
        }

        // Approved as the first reading is the starting state, anything later is an edge
        let expected = match sequence.iter().position(|s| *s == VerificationStatus::Approved) {
            Some(0) | None => 0,
            Some(_) => 1,
        };
        assert_eq!(notifier.approvals(), expected, "sequence {sequence:?}");
    }
}

#[test]
fn repeated_approved_polls_notify_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = StatusStore::new(notifier.clone());

    let path = [
        VerificationStatus::None,
        VerificationStatus::Pending,
        VerificationStatus::Approved,
        VerificationStatus::Approved,
        VerificationStatus::Approved,
    ];
    for status in path {
        store.merge(reading(status), ReadingSource::Poll);
    }

    assert_eq!(notifier.approvals(), 1);
    assert_eq!(store.approvals_shown(), 1);
}

#[test]
fn no_step_beyond_upload_without_a_document() {
    for sequence in sequences(4) {
        let store = StatusStore::new(Arc::new(RecordingNotifier::default()));
        for status in &sequence {
            let reading = StatusReading::status(*status);
            store.merge(reading, ReadingSource::Props);

            let state = store.state();
            if state.document_ref.is_none() && state.status != VerificationStatus::Approved {
                assert_eq!(resolve_step(&state, false), Step::Upload, "sequence {sequence:?}");
            }
        }
    }
}

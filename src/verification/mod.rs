// Residency verification workflow
//
// Server status -> PollingLoop -> StatusStore -> resolve_step -> View.
// Uploads and manual refreshes feed the same StatusStore::merge.

pub mod gate;
pub mod poller;
pub mod session;
pub mod step;
pub mod store;
pub mod types;
pub mod upload;
pub mod view;

pub use gate::{GatePhase, LogNotifier, Notice, NoticeKind, NotificationGate, Notifier};
pub use poller::{poll_once, PollExit, PollHandle, PollingLoop};
pub use session::{SessionSeed, VerificationSession};
pub use step::{resolve_step, Step};
pub use store::{IgnoreReason, MergeOutcome, StatusStore, StoreSnapshot};
pub use types::{DocumentRef, ReadingSource, StatusReading, VerificationState, VerificationStatus};
pub use upload::{load_document, submit_upload, UploadError};
pub use view::{dispatch, status_message, View, ViewContext};

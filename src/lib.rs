// Barangay residency verification client
// This exposes the workflow core and its collaborators for the CLI and tests

pub mod api;
pub mod config;
pub mod observability;
pub mod registration;
pub mod shutdown;
pub mod telemetry;
pub mod verification;

// Re-export key types for easy access
pub use api::{ApiError, HttpVerificationClient, VerificationApi};
pub use config::{config, init_config, VerifyConfig};
pub use observability::{poll_metrics, PollMetrics};
pub use registration::{CodeCountdown, CodeError, VerificationCode};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_verification_span, generate_correlation_id, init_telemetry};
pub use verification::{
    resolve_step, MergeOutcome, Notice, Notifier, PollingLoop, SessionSeed, StatusReading,
    StatusStore, Step, VerificationSession, VerificationState, VerificationStatus, View,
};

// Server collaborators for the residency verification workflow
//
// The workflow only ever sees the VerificationApi trait; the HTTP client is
// one implementation, test fakes are others.

pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

pub use client::HttpVerificationClient;
pub use errors::ApiError;
pub use types::{DocumentUpload, ProfileEnvelope, ProfilePayload, StatusPayload, UploadResponse};

/// Backend endpoints consumed by the verification workflow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Lightweight status read used on every poll tick
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError>;

    /// Full profile read, the fallback source of truth
    async fn fetch_profile(&self) -> Result<ProfilePayload, ApiError>;

    /// Submit a proof-of-residency document
    async fn upload_document(&self, document: DocumentUpload) -> Result<UploadResponse, ApiError>;
}

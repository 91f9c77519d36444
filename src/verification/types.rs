// Core types for the residency verification workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::{ProfilePayload, StatusPayload, UploadResponse};

/// Residency verification status as decided by the barangay administrators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Nothing uploaded yet
    #[default]
    None,
    /// Document uploaded, awaiting review
    Pending,
    Approved,
    /// Document rejected; a new upload is required
    Denied,
}

impl VerificationStatus {
    /// Parse a backend status string. Case-insensitive; empty or unknown
    /// values carry no information and yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "none" => Some(Self::None),
            "" => None,
            other => {
                tracing::warn!(status = %other, "Ignoring unknown verification status");
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an uploaded proof-of-residency document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Blank references carry no information.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to a fetchable URL. Absolute references are used as-is,
    /// relative ones live under the backend's public storage.
    pub fn url(&self, storage_url: &str) -> String {
        if self.0.starts_with("http://") || self.0.starts_with("https://") {
            self.0.clone()
        } else {
            format!(
                "{}/storage/{}",
                storage_url.trim_end_matches('/'),
                self.0.trim_start_matches('/')
            )
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side copy of a user's verification state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationState {
    pub status: VerificationStatus,
    pub document_ref: Option<DocumentRef>,
    /// Present only while denied
    pub denial_reason: Option<String>,
    /// Status before the most recent applied change
    pub last_observed_status: Option<VerificationStatus>,
    /// When `status` last changed
    pub status_since: Option<DateTime<Utc>>,
}

impl VerificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: VerificationStatus, document_ref: Option<&str>) -> Self {
        Self {
            status,
            document_ref: document_ref.and_then(DocumentRef::new),
            ..Self::default()
        }
    }

    pub fn has_document(&self) -> bool {
        self.document_ref.is_some()
    }
}

/// Where a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingSource {
    /// Values handed to the view explicitly
    Props,
    /// Profile cached by the auth/session provider
    CachedProfile,
    /// Live profile fetch
    Profile,
    /// Poll tick
    Poll,
    /// Upload endpoint response
    Upload,
}

impl fmt::Display for ReadingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Props => "props",
            Self::CachedProfile => "cached_profile",
            Self::Profile => "profile",
            Self::Poll => "poll",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// A candidate update for the status store. Absent fields mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReading {
    pub status: Option<VerificationStatus>,
    pub document_ref: Option<DocumentRef>,
    pub denial_reason: Option<String>,
}

impl StatusReading {
    pub fn status(status: VerificationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document_ref: &str) -> Self {
        self.document_ref = DocumentRef::new(document_ref);
        self
    }

    pub fn with_denial_reason(mut self, reason: &str) -> Self {
        self.denial_reason = non_blank(Some(reason.to_string()));
        self
    }

    pub fn from_raw(status: Option<&str>, document_ref: Option<&str>, denial_reason: Option<&str>) -> Self {
        Self {
            status: status.and_then(VerificationStatus::parse),
            document_ref: document_ref.and_then(DocumentRef::new),
            denial_reason: non_blank(denial_reason.map(str::to_string)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.document_ref.is_none() && self.denial_reason.is_none()
    }

    /// Fill gaps in `self` from a lower-priority reading.
    pub fn or(self, fallback: StatusReading) -> Self {
        Self {
            status: self.status.or(fallback.status),
            document_ref: self.document_ref.or(fallback.document_ref),
            denial_reason: self.denial_reason.or(fallback.denial_reason),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<&ProfilePayload> for StatusReading {
    fn from(profile: &ProfilePayload) -> Self {
        Self::from_raw(
            profile.verification_status.as_deref(),
            profile.residency_verification_image.as_deref(),
            profile.denial_reason.as_deref(),
        )
    }
}

impl From<&StatusPayload> for StatusReading {
    fn from(payload: &StatusPayload) -> Self {
        Self::from_raw(
            payload.verification_status.as_deref(),
            payload.residency_verification_image.as_deref(),
            None,
        )
    }
}

impl From<&UploadResponse> for StatusReading {
    fn from(response: &UploadResponse) -> Self {
        Self::from_raw(response.status.as_deref(), response.image_path.as_deref(), None)
    }
}

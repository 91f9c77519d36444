//! Wire payloads exchanged with the barangay backend.
//!
//! Field names follow the backend's JSON (`verification_status`,
//! `residency_verification_image`, `denial_reason`). Every field is optional:
//! a missing field means "no new information", never "clear it".

use serde::{Deserialize, Serialize};

/// Response of the lightweight status endpoint used for polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub residency_verification_image: Option<String>,
}

/// The residency-related subset of a user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub residency_verification_image: Option<String>,
    #[serde(default)]
    pub denial_reason: Option<String>,
}

/// The profile endpoint answers in one of three shapes:
/// `{"user": {"profile": {..}}}`, `{"profile": {..}}` or the bare profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProfileEnvelope {
    User { user: UserEnvelope },
    Wrapped { profile: ProfilePayload },
    Bare(ProfilePayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub profile: ProfilePayload,
}

impl ProfileEnvelope {
    pub fn into_profile(self) -> ProfilePayload {
        match self {
            ProfileEnvelope::User { user } => user.profile,
            ProfileEnvelope::Wrapped { profile } => profile,
            ProfileEnvelope::Bare(profile) => profile,
        }
    }
}

/// Result of a successful document upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "imagePath", alias = "image_path")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

use std::fmt;

use super::types::{VerificationState, VerificationStatus};

/// Position in the four-step residency workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    /// Upload a document (also the loading slot)
    Upload = 1,
    /// Document under review
    UnderReview = 2,
    /// Verified; profile editing unlocked
    Verified = 3,
    /// Profile completed. Only the profile module moves a user here.
    ProfileComplete = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Upload => "Upload Document",
            Step::UnderReview => "Under Review",
            Step::Verified => "Verified",
            Step::ProfileComplete => "Complete Profile",
        }
    }

    pub fn all() -> [Step; 4] {
        [Step::Upload, Step::UnderReview, Step::Verified, Step::ProfileComplete]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// Map verification state to the step the user is on.
///
/// Denied and approved are checked first: they override a stale document.
pub fn resolve_step(state: &VerificationState, is_loading: bool) -> Step {
    if is_loading {
        return Step::Upload;
    }
    match state.status {
        VerificationStatus::Denied => Step::Upload,
        VerificationStatus::Approved => Step::Verified,
        VerificationStatus::Pending if state.has_document() => Step::UnderReview,
        _ => Step::Upload,
    }
}

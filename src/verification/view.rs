//! Which panel the user sees, derived only from the store snapshot.

use chrono::{DateTime, Utc};
use std::fmt;

use super::step::{resolve_step, Step};
use super::store::StoreSnapshot;
use super::types::{VerificationState, VerificationStatus};

pub const PROFILE_LINK: &str = "/user/profile";
const DEFAULT_DENIAL_MESSAGE: &str =
    "Your verification was denied. Please upload a new verification document.";

/// Inputs the panels need besides the verification state
#[derive(Debug, Clone)]
pub struct ViewContext<'a> {
    pub storage_url: &'a str,
    pub now: DateTime<Utc>,
    /// Inline error from the last failed upload
    pub upload_error: Option<&'a str>,
}

impl<'a> ViewContext<'a> {
    pub fn new(storage_url: &'a str) -> Self {
        Self {
            storage_url,
            now: Utc::now(),
            upload_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPrompt {
    pub message: String,
    /// Why the previous document was rejected
    pub denial_notice: Option<String>,
    pub is_retry: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPanel {
    pub message: String,
    pub document_url: String,
    pub elapsed: Option<chrono::Duration>,
    pub indicator: PollIndicator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedPanel {
    pub message: String,
    pub document_url: Option<String>,
    pub profile_link: &'static str,
    pub next_step: Step,
}

/// Three-phase activity indicator, advancing once per second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIndicator(u8);

impl PollIndicator {
    pub fn at(elapsed: Option<chrono::Duration>) -> Self {
        let secs = elapsed.map_or(0, |e| e.num_seconds().max(0));
        Self((secs % 3) as u8)
    }

    pub fn phase(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PollIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dots = ".".repeat(self.0 as usize + 1);
        write!(f, "{dots:<3}")
    }
}

/// Exactly one of these is shown at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    Upload(UploadPrompt),
    Pending(PendingPanel),
    Approved(ApprovedPanel),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading => "loading",
            View::Upload(prompt) if prompt.is_retry => "denied",
            View::Upload(_) => "upload",
            View::Pending(_) => "pending",
            View::Approved(_) => "approved",
        }
    }
}

/// Banner text for the current status
pub fn status_message(state: &VerificationState) -> String {
    match state.status {
        VerificationStatus::Pending => "Your residency verification is under review. Once approved, \
                                        you can complete your profile."
            .to_string(),
        VerificationStatus::Approved => {
            "Your residency has been verified! You can now complete your profile.".to_string()
        }
        VerificationStatus::Denied => state
            .denial_reason
            .clone()
            .unwrap_or_else(|| DEFAULT_DENIAL_MESSAGE.to_string()),
        VerificationStatus::None => "Please upload a document to verify your residency.".to_string(),
    }
}

pub fn dispatch(snapshot: &StoreSnapshot, ctx: &ViewContext<'_>) -> View {
    if snapshot.loading {
        return View::Loading;
    }

    let state = &snapshot.state;
    let message = status_message(state);
    match (resolve_step(state, false), &state.document_ref) {
        (Step::Verified | Step::ProfileComplete, document) => View::Approved(ApprovedPanel {
            message,
            document_url: document.as_ref().map(|d| d.url(ctx.storage_url)),
            profile_link: PROFILE_LINK,
            next_step: Step::ProfileComplete,
        }),
        (Step::UnderReview, Some(document)) => {
            let elapsed = state.status_since.map(|since| ctx.now - since);
            View::Pending(PendingPanel {
                message,
                document_url: document.url(ctx.storage_url),
                elapsed,
                indicator: PollIndicator::at(elapsed),
            })
        }
        _ => {
            let denied = state.status == VerificationStatus::Denied;
            View::Upload(UploadPrompt {
                denial_notice: denied.then(|| message.clone()),
                message,
                is_retry: denied,
                error: ctx.upload_error.map(str::to_string),
            })
        }
    }
}

fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Step tracker line, e.g. `(1) Upload Document > [2] Under Review > ...`
pub fn render_tracker(current: Step) -> String {
    Step::all()
        .iter()
        .map(|step| {
            if *step == current {
                format!("[{}] {}", step.number(), step.title())
            } else if *step < current {
                format!("(✓) {}", step.title())
            } else {
                format!("({}) {}", step.number(), step.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => write!(f, "⏳ Loading verification status..."),
            View::Upload(prompt) => {
                writeln!(f, "{}", render_tracker(Step::Upload))?;
                if let Some(notice) = &prompt.denial_notice {
                    writeln!(f, "❌ Verification denied: {notice}")?;
                    writeln!(f, "   Please upload a new document.")?;
                } else {
                    writeln!(f, "📄 {}", prompt.message)?;
                }
                if let Some(error) = &prompt.error {
                    writeln!(f, "⚠️  Upload failed: {error}")?;
                }
                write!(f, "   → barangay-verify upload <FILE>")
            }
            View::Pending(panel) => {
                writeln!(f, "{}", render_tracker(Step::UnderReview))?;
                writeln!(f, "🕒 {}", panel.message)?;
                writeln!(f, "   Document: {}", panel.document_url)?;
                match panel.elapsed {
                    Some(elapsed) => write!(
                        f,
                        "   Waiting {} for review {}",
                        format_elapsed(elapsed),
                        panel.indicator
                    ),
                    None => write!(f, "   Checking for updates {}", panel.indicator),
                }
            }
            View::Approved(panel) => {
                writeln!(f, "{}", render_tracker(Step::Verified))?;
                writeln!(f, "✅ {}", panel.message)?;
                if let Some(url) = &panel.document_url {
                    writeln!(f, "   Verified document: {url}")?;
                }
                write!(f, "   → Complete your profile: {}", panel.profile_link)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = "http://localhost:8000";

    fn snapshot(state: VerificationState) -> StoreSnapshot {
        StoreSnapshot {
            state,
            loading: false,
        }
    }

    #[test]
    fn test_loading_placeholder() {
        let view = dispatch(&StoreSnapshot::default(), &ViewContext::new(STORAGE));
        assert_eq!(view, View::Loading);
    }

    #[test]
    fn test_denied_renders_retry_upload() {
        let mut state = VerificationState::with_status(VerificationStatus::Denied, None);
        state.denial_reason = Some("blurry photo".to_string());

        match dispatch(&snapshot(state), &ViewContext::new(STORAGE)) {
            View::Upload(prompt) => {
                assert!(prompt.is_retry);
                assert_eq!(prompt.denial_notice.as_deref(), Some("blurry photo"));
            }
            other => panic!("expected upload prompt, got {other:?}"),
        }
    }

    #[test]
    fn test_denied_without_reason_uses_default_notice() {
        let state = VerificationState::with_status(VerificationStatus::Denied, None);
        let view = dispatch(&snapshot(state), &ViewContext::new(STORAGE));
        assert_eq!(view.name(), "denied");
        assert!(view.to_string().contains(DEFAULT_DENIAL_MESSAGE));
    }

    #[test]
    fn test_pending_panel_elapsed_and_indicator() {
        let now = Utc::now();
        let mut state = VerificationState::with_status(VerificationStatus::Pending, Some("residency/doc1.png"));
        state.status_since = Some(now - chrono::Duration::seconds(125));

        let ctx = ViewContext {
            storage_url: STORAGE,
            now,
            upload_error: None,
        };
        match dispatch(&snapshot(state), &ctx) {
            View::Pending(panel) => {
                assert_eq!(panel.document_url, "http://localhost:8000/storage/residency/doc1.png");
                assert_eq!(panel.elapsed, Some(chrono::Duration::seconds(125)));
                assert_eq!(panel.indicator.phase(), 2);
            }
            other => panic!("expected pending panel, got {other:?}"),
        }
    }

    #[test]
    fn test_approved_links_to_profile_completion() {
        let state = VerificationState::with_status(VerificationStatus::Approved, None);
        match dispatch(&snapshot(state), &ViewContext::new(STORAGE)) {
            View::Approved(panel) => {
                assert_eq!(panel.document_url, None);
                assert_eq!(panel.profile_link, PROFILE_LINK);
                assert_eq!(panel.next_step, Step::ProfileComplete);
            }
            other => panic!("expected approved panel, got {other:?}"),
        }
    }

    #[test]
    fn test_upload_error_shown_inline() {
        let ctx = ViewContext {
            upload_error: Some("The file must be an image."),
            ..ViewContext::new(STORAGE)
        };
        let view = dispatch(&snapshot(VerificationState::new()), &ctx);
        assert!(view.to_string().contains("Upload failed: The file must be an image."));
    }

    #[test]
    fn test_tracker_marks_completed_steps() {
        let line = render_tracker(Step::Verified);
        assert!(line.starts_with("(✓) Upload Document > (✓) Under Review > [3] Verified"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(chrono::Duration::seconds(65)), "1m 05s");
        assert_eq!(format_elapsed(chrono::Duration::seconds(3720)), "1h 02m");
    }
}

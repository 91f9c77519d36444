//! One-time user notices for verification decisions.
//!
//! The approval notice is shown at most once per approval event: the gate
//! moves from `Armed` to `Shown` on the first approval edge and stays there
//! until a denial or a session reset re-arms it.

/// Visual tone of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A modal dialog to surface to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    /// Offer a link onward to profile completion
    pub show_profile_button: bool,
}

impl Notice {
    pub fn approved() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Verification Approved!".to_string(),
            message: "Congratulations! Your residency verification has been approved by the \
                      barangay administrators. You can now complete your profile to access all \
                      resident services."
                .to_string(),
            show_profile_button: true,
        }
    }

    pub fn denied(reason: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Verification Denied".to_string(),
            message: format!("Your residency verification was denied. Reason: {reason}"),
            show_profile_button: false,
        }
    }
}

/// Modal-display side effect
pub trait Notifier: Send + Sync {
    fn show(&self, notice: &Notice);
}

/// Notifier that only logs; used when no interactive surface is attached
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, notice: &Notice) {
        tracing::info!(title = %notice.title, message = %notice.message, "Verification notice");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// Status went from an observed non-approved value to approved
    ApprovalEdge,
    /// Status went to denied
    Denied { reason: Option<String> },
    /// User closed the approval notice
    Acknowledge,
    /// Logout or new session
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Armed,
    Shown { acknowledged: bool },
}

/// Decides which notices to show. Displaying them is left to the caller,
/// so a notifier may call back into whatever owns the gate.
#[derive(Debug)]
pub struct NotificationGate {
    phase: GatePhase,
    approvals_shown: u64,
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationGate {
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Armed,
            approvals_shown: 0,
        }
    }

    /// Advance the gate; returns the notice to display, if any.
    pub fn handle(&mut self, event: &GateEvent) -> Option<Notice> {
        match (self.phase, event) {
            (GatePhase::Armed, GateEvent::ApprovalEdge) => {
                self.approvals_shown += 1;
                self.phase = GatePhase::Shown { acknowledged: false };
                tracing::info!("Approval notice shown");
                Some(Notice::approved())
            }
            (GatePhase::Shown { .. }, GateEvent::ApprovalEdge) => {
                tracing::debug!("Approval notice already shown, suppressing");
                None
            }
            (GatePhase::Shown { .. }, GateEvent::Acknowledge) => {
                self.phase = GatePhase::Shown { acknowledged: true };
                None
            }
            (GatePhase::Armed, GateEvent::Acknowledge) => None,
            (_, GateEvent::Denied { reason }) => {
                self.phase = GatePhase::Armed;
                reason.as_deref().map(Notice::denied)
            }
            (_, GateEvent::Reset) => {
                self.phase = GatePhase::Armed;
                None
            }
        }
    }

    pub fn on_approval_transition(&mut self) -> Option<Notice> {
        self.handle(&GateEvent::ApprovalEdge)
    }

    pub fn on_denial(&mut self, reason: Option<&str>) -> Option<Notice> {
        self.handle(&GateEvent::Denied {
            reason: reason.map(str::to_string),
        })
    }

    pub fn acknowledge(&mut self) {
        self.handle(&GateEvent::Acknowledge);
    }

    pub fn reset(&mut self) {
        self.handle(&GateEvent::Reset);
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// An approval notice is open and the user has not closed it yet
    pub fn awaiting_acknowledgement(&self) -> bool {
        self.phase == GatePhase::Shown { acknowledged: false }
    }

    pub fn approvals_shown(&self) -> u64 {
        self.approvals_shown
    }
}

//! Shared fakes for the verification workflow integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use barangay_verify::api::{
    ApiError, DocumentUpload, ProfilePayload, StatusPayload, UploadResponse, VerificationApi,
};
use barangay_verify::config::PollingConfig;
use barangay_verify::verification::{LogNotifier, Notice, NoticeKind, Notifier, VerificationSession};

/// Replays scripted responses in order; the last one repeats forever.
#[derive(Debug)]
pub struct Script<T: Clone> {
    responses: Mutex<VecDeque<Result<T, String>>>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    pub fn new(responses: Vec<Result<T, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn next(&self) -> Result<T, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        match response {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ApiError::Network { message }),
            None => Err(ApiError::Network {
                message: "no scripted response".to_string(),
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct ScriptedApi {
    pub status: Script<StatusPayload>,
    pub profile: Script<ProfilePayload>,
    pub upload: Mutex<VecDeque<Result<UploadResponse, ApiError>>>,
    /// Simulated latency of the profile endpoint
    pub profile_delay: Duration,
}

impl ScriptedApi {
    pub fn new(status: Vec<Result<StatusPayload, String>>, profile: Vec<Result<ProfilePayload, String>>) -> Self {
        Self {
            status: Script::new(status),
            profile: Script::new(profile),
            upload: Mutex::new(VecDeque::new()),
            profile_delay: Duration::ZERO,
        }
    }

    pub fn with_upload(self, response: Result<UploadResponse, ApiError>) -> Self {
        self.upload.lock().unwrap().push_back(response);
        self
    }

    pub fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = delay;
        self
    }
}

#[async_trait]
impl VerificationApi for ScriptedApi {
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError> {
        self.status.next()
    }

    async fn fetch_profile(&self) -> Result<ProfilePayload, ApiError> {
        if !self.profile_delay.is_zero() {
            tokio::time::sleep(self.profile_delay).await;
        }
        self.profile.next()
    }

    async fn upload_document(&self, _document: DocumentUpload) -> Result<UploadResponse, ApiError> {
        self.upload
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network {
                message: "no scripted upload".to_string(),
            }))
    }
}

pub fn status(value: &str) -> StatusPayload {
    StatusPayload {
        verification_status: Some(value.to_string()),
        residency_verification_image: None,
    }
}

pub fn profile(status: Option<&str>, image: Option<&str>, denial_reason: Option<&str>) -> ProfilePayload {
    ProfilePayload {
        verification_status: status.map(str::to_string),
        residency_verification_image: image.map(str::to_string),
        denial_reason: denial_reason.map(str::to_string),
    }
}

pub fn uploaded(status: &str, image_path: &str) -> UploadResponse {
    UploadResponse {
        status: Some(status.to_string()),
        image_path: Some(image_path.to_string()),
        message: None,
    }
}

pub fn document() -> DocumentUpload {
    DocumentUpload {
        file_name: "doc1.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

/// Records every notice instead of displaying it
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn approvals(&self) -> usize {
        self.notices()
            .iter()
            .filter(|notice| notice.kind == NoticeKind::Success)
            .count()
    }

    pub fn denials(&self) -> usize {
        self.notices()
            .iter()
            .filter(|notice| notice.kind == NoticeKind::Error)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn polling() -> PollingConfig {
    PollingConfig {
        interval_secs: 3,
        loading_timeout_secs: 3,
    }
}

pub fn session(api: Arc<ScriptedApi>, notifier: Arc<RecordingNotifier>) -> VerificationSession<ScriptedApi> {
    VerificationSession::new(api, notifier, polling())
}

pub fn quiet_session(api: Arc<ScriptedApi>) -> VerificationSession<ScriptedApi> {
    VerificationSession::new(api, Arc::new(LogNotifier), polling())
}

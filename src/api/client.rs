use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::errors::ApiError;
use super::types::{DocumentUpload, ProfileEnvelope, ProfilePayload, StatusPayload, UploadResponse};
use super::VerificationApi;
use crate::config::ApiConfig;

const PROFILE_PATH: &str = "profile";
const STATUS_PATH: &str = "profile-status";
const UPLOAD_PATH: &str = "residency-verification/upload";
const UPLOAD_FIELD: &str = "residency_verification_image";

/// Rate-limited HTTP client for the barangay backend
#[derive(Debug, Clone)]
pub struct HttpVerificationClient {
    http: Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpVerificationClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;

        // Polling plus manual refreshes must never hammer the backend
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Ok(Self {
            http,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthenticated)?;
        Ok(request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let response = self.authorize(request)?.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    duration_ms: self.timeout.as_millis() as u64,
                }
            } else {
                ApiError::from(e)
            }
        })?;

        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path = %path, "GET");
        let response = self.send(self.http.get(self.url(path))).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthenticated);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Http {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| status.to_string()),
    })
}

/// Laravel-style error bodies carry `message` and optionally `errors`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(first) = value
        .get("errors")
        .and_then(|errors| errors.as_object())
        .and_then(|errors| errors.values().next())
        .and_then(|messages| messages.get(0))
        .and_then(|message| message.as_str())
    {
        return Some(first.to_string());
    }
    value.get("message")?.as_str().map(str::to_string)
}

#[async_trait]
impl VerificationApi for HttpVerificationClient {
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError> {
        self.get_json(STATUS_PATH).await
    }

    async fn fetch_profile(&self) -> Result<ProfilePayload, ApiError> {
        let envelope: ProfileEnvelope = self.get_json(PROFILE_PATH).await?;
        Ok(envelope.into_profile())
    }

    async fn upload_document(&self, document: DocumentUpload) -> Result<UploadResponse, ApiError> {
        debug!(file = %document.file_name, bytes = document.bytes.len(), "Uploading residency document");
        let part = Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(&document.content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .send(self.http.post(self.url(UPLOAD_PATH)).multipart(form))
            .await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

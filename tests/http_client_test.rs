//! HTTP client tests against a wiremock backend

use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use barangay_verify::api::{ApiError, DocumentUpload, HttpVerificationClient, VerificationApi};
use barangay_verify::config::ApiConfig;

struct BackendMock {
    server: MockServer,
}

impl BackendMock {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn client(&self) -> HttpVerificationClient {
        let config = ApiConfig {
            base_url: format!("{}/api", self.server.uri()),
            token: Some("resident-token".to_string()),
            requests_per_second: 100,
            burst: 100,
            ..ApiConfig::default()
        };
        HttpVerificationClient::new(&config).unwrap()
    }

    async fn mock_get(&self, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer resident-token"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn test_fetch_status_sends_bearer_token() {
    let backend = BackendMock::new().await;
    backend
        .mock_get("/api/profile-status", 200, json!({"verification_status": "pending"}))
        .await;

    let status = backend.client().fetch_status().await.unwrap();
    assert_eq!(status.verification_status.as_deref(), Some("pending"));
    assert_eq!(status.residency_verification_image, None);
}

#[tokio::test]
async fn test_fetch_profile_unwraps_user_envelope() {
    let backend = BackendMock::new().await;
    backend
        .mock_get(
            "/api/profile",
            200,
            json!({
                "user": {
                    "id": 7,
                    "profile": {
                        "verification_status": "denied",
                        "residency_verification_image": "residency/doc1.jpg",
                        "denial_reason": "blurry photo"
                    }
                }
            }),
        )
        .await;

    let profile = backend.client().fetch_profile().await.unwrap();
    assert_eq!(profile.verification_status.as_deref(), Some("denied"));
    assert_eq!(profile.residency_verification_image.as_deref(), Some("residency/doc1.jpg"));
    assert_eq!(profile.denial_reason.as_deref(), Some("blurry photo"));
}

#[tokio::test]
async fn test_upload_posts_multipart_document() {
    let backend = BackendMock::new().await;
    Mock::given(method("POST"))
        .and(path("/api/residency-verification/upload"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Document uploaded successfully",
            "status": "pending",
            "imagePath": "residency/doc1.png"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let response = backend
        .client()
        .upload_document(DocumentUpload {
            file_name: "doc1.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        })
        .await
        .unwrap();

    assert_eq!(response.status.as_deref(), Some("pending"));
    assert_eq!(response.image_path.as_deref(), Some("residency/doc1.png"));
}

#[tokio::test]
async fn test_validation_error_message_is_surfaced() {
    let backend = BackendMock::new().await;
    Mock::given(method("POST"))
        .and(path("/api/residency-verification/upload"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"residency_verification_image": ["The residency verification image must not be greater than 5120 kilobytes."]}
        })))
        .mount(&backend.server)
        .await;

    let err = backend
        .client()
        .upload_document(DocumentUpload {
            file_name: "huge.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8, 0xff],
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Http { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("5120 kilobytes"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let backend = BackendMock::new().await;
    backend
        .mock_get("/api/profile-status", 401, json!({"message": "Unauthenticated."}))
        .await;
    backend
        .mock_get("/api/profile", 503, json!({"message": "Service Unavailable"}))
        .await;

    let client = backend.client();
    assert!(matches!(client.fetch_status().await, Err(ApiError::Unauthenticated)));

    let err = client.fetch_profile().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
}

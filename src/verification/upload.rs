use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::store::{MergeOutcome, StatusStore};
use super::types::{ReadingSource, StatusReading};
use crate::api::{ApiError, DocumentUpload, VerificationApi};
use crate::observability::poll_metrics;

pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Upload failures are shown inline on the form; none of them touch the store.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is empty")]
    EmptyFile { path: PathBuf },
    #[error("{path} is {size} bytes; documents must be at most {limit} bytes")]
    TooLarge { path: PathBuf, size: usize, limit: usize },
    #[error("Unsupported document type for {path}; use JPG, PNG, WEBP or PDF")]
    UnsupportedType { path: PathBuf },
    #[error("{message}")]
    Rejected { message: String },
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for UploadError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http { status, message } if (400..500).contains(&status) => {
                UploadError::Rejected { message }
            }
            other => UploadError::Api(other),
        }
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Read and validate a document from disk.
pub async fn load_document(path: &Path) -> Result<DocumentUpload, UploadError> {
    let content_type = content_type_for(path).ok_or_else(|| UploadError::UnsupportedType {
        path: path.to_path_buf(),
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(UploadError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(UploadError::TooLarge {
            path: path.to_path_buf(),
            size: bytes.len(),
            limit: MAX_DOCUMENT_BYTES,
        });
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    Ok(DocumentUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    })
}

/// Send a document and merge the server's answer into the store.
pub async fn submit_upload<A>(
    api: &A,
    store: &StatusStore,
    document: DocumentUpload,
) -> Result<MergeOutcome, UploadError>
where
    A: VerificationApi + ?Sized,
{
    let file_name = document.file_name.clone();
    match api.upload_document(document).await {
        Ok(response) => {
            poll_metrics().record_upload(true);
            info!(file = %file_name, status = ?response.status, "Residency document uploaded");
            Ok(store.merge(StatusReading::from(&response), ReadingSource::Upload))
        }
        Err(e) => {
            poll_metrics().record_upload(false);
            warn!(file = %file_name, error = %e, "Residency document upload failed");
            Err(e.into())
        }
    }
}

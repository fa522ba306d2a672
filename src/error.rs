//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps storage-layer errors to HTTP status codes and the JSON envelope the
//! browser client expects: `{"success": false, "error": <message>}` with an
//! optional `"details"` field carrying the underlying I/O message for
//! upload failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StoreError;

/// JSON error response body.
///
/// All error responses use this envelope. `success` is always `false`;
/// `details` is present only for upload storage failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
    /// Underlying error detail, present only for 500 upload failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// The four upload validation kinds are client-input errors (400, never
/// retried); `UploadFailed` and `ListFailed` are storage I/O failures (500).
#[derive(Debug, Error)]
pub enum AppError {
    /// Upload carried no `audio` file (400).
    #[error("No file uploaded")]
    MissingFile,

    /// Upload carried no (or an empty) `cardId` (400).
    #[error("No card ID provided")]
    MissingCardId,

    /// Upload content type is not an audio type (400).
    #[error("Invalid file type. Please upload an audio file.")]
    InvalidFileType,

    /// Upload exceeds the 10 MiB ceiling (400).
    #[error("File too large. Maximum size is 10MB.")]
    FileTooLarge,

    /// The multipart form could not be parsed (400).
    #[error("invalid multipart form data: {0}")]
    Multipart(String),

    /// Writing the asset failed (500). Underlying message is surfaced in
    /// the `details` field, matching the upload contract.
    #[error("upload failed: {0}")]
    UploadFailed(#[source] std::io::Error),

    /// Scanning the asset directory failed (500). No detail is exposed.
    #[error("failed to read audio assets: {0}")]
    ListFailed(#[source] std::io::Error),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Map a storage error from the upload path.
    pub fn from_upload(err: StoreError) -> Self {
        match err {
            StoreError::MissingFile => Self::MissingFile,
            StoreError::MissingCardId => Self::MissingCardId,
            StoreError::InvalidFileType => Self::InvalidFileType,
            StoreError::FileTooLarge => Self::FileTooLarge,
            StoreError::Io(e) => Self::UploadFailed(e),
        }
    }

    /// Map a storage error from the list path. The list operation only
    /// fails on I/O; the validation kinds cannot occur there.
    pub fn from_list(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => Self::ListFailed(e),
            other => Self::ListFailed(std::io::Error::other(other.to_string())),
        }
    }

    /// Return the HTTP status, client-facing message, and optional detail.
    fn status_and_body(&self) -> (StatusCode, String, Option<String>) {
        match self {
            Self::MissingFile | Self::MissingCardId | Self::InvalidFileType | Self::FileTooLarge => {
                (StatusCode::BAD_REQUEST, self.to_string(), None)
            }
            Self::Multipart(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid multipart form data".to_string(),
                None,
            ),
            Self::UploadFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload failed".to_string(),
                Some(e.to_string()),
            ),
            Self::ListFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read audio files".to_string(),
                None,
            ),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = self.status_and_body();

        // Log server-side errors for operator visibility.
        match &self {
            Self::UploadFailed(_) | Self::ListFailed(_) => {
                tracing::error!(error = %self, "storage failure")
            }
            Self::Unauthorized(_) => tracing::warn!(error = %self, "authentication failed"),
            _ => {}
        }

        (status, Json(ErrorBody::new(message, details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn validation_kinds_are_bad_request() {
        for err in [
            AppError::MissingFile,
            AppError::MissingCardId,
            AppError::InvalidFileType,
            AppError::FileTooLarge,
        ] {
            let (status, _, details) = err.status_and_body();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(details.is_none());
        }
    }

    #[test]
    fn multipart_failure_is_bad_request_without_details() {
        let err = AppError::Multipart("unexpected end of stream".to_string());
        let (status, message, details) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid multipart form data");
        assert!(details.is_none());
    }

    #[test]
    fn upload_failure_carries_details() {
        let err = AppError::UploadFailed(std::io::Error::other("disk full"));
        let (status, message, details) = err.status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Upload failed");
        assert_eq!(details.as_deref(), Some("disk full"));
    }

    #[test]
    fn list_failure_hides_details() {
        let err = AppError::ListFailed(std::io::Error::other("permission denied"));
        let (status, message, details) = err.status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to read audio files");
        assert!(details.is_none());
    }

    #[test]
    fn from_upload_maps_each_kind() {
        assert!(matches!(
            AppError::from_upload(StoreError::MissingFile),
            AppError::MissingFile
        ));
        assert!(matches!(
            AppError::from_upload(StoreError::MissingCardId),
            AppError::MissingCardId
        ));
        assert!(matches!(
            AppError::from_upload(StoreError::InvalidFileType),
            AppError::InvalidFileType
        ));
        assert!(matches!(
            AppError::from_upload(StoreError::FileTooLarge),
            AppError::FileTooLarge
        ));
        assert!(matches!(
            AppError::from_upload(StoreError::Io(std::io::Error::other("x"))),
            AppError::UploadFailed(_)
        ));
    }

    #[test]
    fn from_list_maps_io() {
        assert!(matches!(
            AppError::from_list(StoreError::Io(std::io::Error::other("x"))),
            AppError::ListFailed(_)
        ));
    }

    #[test]
    fn error_body_omits_absent_details() {
        let json = serde_json::to_string(&ErrorBody::new("No file uploaded", None)).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn error_body_includes_present_details() {
        let json =
            serde_json::to_string(&ErrorBody::new("Upload failed", Some("disk full".into())))
                .unwrap();
        assert!(json.contains("disk full"));
    }

    #[tokio::test]
    async fn into_response_missing_file() {
        let (status, body) = response_parts(AppError::MissingFile).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "No file uploaded");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn into_response_upload_failed_exposes_io_detail() {
        let err = AppError::UploadFailed(std::io::Error::other("read-only filesystem"));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Upload failed");
        assert_eq!(body.details.as_deref(), Some("read-only filesystem"));
    }

    #[tokio::test]
    async fn into_response_unauthorized() {
        let (status, body) = response_parts(AppError::Unauthorized("missing token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "missing token");
    }
}

//! # Audio Asset Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/api/get-audio` | `get_audio` |
//! | `POST` | `/api/upload-audio` | `upload_audio` |
//!
//! Both endpoints answer with a `success` envelope: listings return
//! `{"success": true, "files": […]}`, uploads return
//! `{"success": true, "url": …, "filename": …}`, and failures use
//! [`crate::error::ErrorBody`].

use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{AudioAsset, IncomingAudio};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct GetAudioParams {
    /// Restrict the listing to assets of one card. Normalized the same way
    /// the upload path normalizes card ids before matching.
    pub card_id: Option<String>,
}

/// Successful listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct GetAudioResponse {
    pub success: bool,
    /// Assets sorted newest-first by upload timestamp.
    pub files: Vec<AudioAsset>,
}

/// Multipart form shape for the upload endpoint (OpenAPI documentation
/// only; the handler reads the fields from the raw multipart stream).
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadForm {
    /// The audio file.
    #[schema(value_type = String, format = Binary)]
    pub audio: String,
    /// Card identifier the clip belongs to.
    pub card_id: String,
}

/// Successful upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Public URL path of the stored file, e.g. `/audio/asset-42-1712345678901.wav`.
    pub url: String,
    /// Stored file name.
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the audio asset router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/get-audio", get(get_audio))
        .route("/api/upload-audio", post(upload_audio))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/get-audio: List stored audio assets, newest first.
#[utoipa::path(
    get,
    path = "/api/get-audio",
    params(GetAudioParams),
    responses(
        (status = 200, description = "Assets sorted newest-first", body = GetAudioResponse),
        (status = 500, description = "Storage scan failed", body = crate::error::ErrorBody),
    ),
    tag = "audio"
)]
pub(crate) async fn get_audio(
    State(state): State<AppState>,
    Query(params): Query<GetAudioParams>,
) -> Result<Json<GetAudioResponse>, AppError> {
    let files = state
        .store
        .list(params.card_id.as_deref())
        .await
        .map_err(AppError::from_list)?;

    Ok(Json(GetAudioResponse {
        success: true,
        files,
    }))
}

/// POST /api/upload-audio: Store one audio clip for a card.
///
/// Multipart form fields: `audio` (the file) and `cardId` (text). Unknown
/// fields are ignored. Validation and persistence happen in
/// [`crate::storage::AudioStore::store`]; this handler only unpacks the
/// form.
#[utoipa::path(
    post,
    path = "/api/upload-audio",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Asset stored", body = UploadResponse),
        (status = 400, description = "Missing file or card id, non-audio type, or file over 10 MiB", body = crate::error::ErrorBody),
        (status = 500, description = "Write to the asset directory failed", body = crate::error::ErrorBody),
    ),
    tag = "audio"
)]
pub(crate) async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut card_id: Option<String> = None;
    let mut file: Option<IncomingAudio> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.to_string()))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("audio") => {
                let file_name = field.file_name().map(ToString::to_string);
                let mime_type = field.content_type().map(ToString::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Multipart(e.to_string()))?
                    .to_vec();
                file = Some(IncomingAudio {
                    file_name,
                    mime_type,
                    content,
                });
            }
            Some("cardId") => {
                card_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Multipart(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let stored = state
        .store
        .store(card_id.as_deref(), file)
        .await
        .map_err(AppError::from_upload)?;

    tracing::info!(filename = %stored.stored_file_name, "audio asset stored");

    Ok(Json(UploadResponse {
        success: true,
        url: stored.public_path,
        filename: stored.stored_file_name,
    }))
}

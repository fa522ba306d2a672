//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI 3.0 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Optional bearer token, set via the REELS_AUTH_TOKEN env var. \
                             When unset, the API is open.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reels Audio API",
        version = "0.1.0",
        description = "File-backed audio asset endpoints for the reels flashcard viewer.\n\n\
            Uploads are validated (audio content type, 10 MiB ceiling), stored into a flat \
            directory under a name encoding the card id and upload timestamp, and served \
            statically at `/audio/*`. Listings are reconstructed purely from file names plus \
            filesystem stats; there is no database.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::audio::get_audio,
        crate::routes::audio::upload_audio,
    ),
    components(schemas(
        crate::storage::AudioAsset,
        crate::routes::audio::GetAudioResponse,
        crate::routes::audio::UploadForm,
        crate::routes::audio::UploadResponse,
        crate::error::ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "audio", description = "Audio asset upload and listing")
    )
)]
pub struct ApiDoc;

/// Router serving the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_both_audio_paths() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths.paths;
        assert!(paths.contains_key("/api/get-audio"));
        assert!(paths.contains_key("/api/upload-audio"));
    }

    #[test]
    fn spec_serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Reels Audio API"));
    }
}

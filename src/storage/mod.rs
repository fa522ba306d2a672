//! # Audio Asset Storage
//!
//! The storage layer for per-card audio clips. There is no database: a flat
//! directory of immutable files IS the index. Each file name encodes the
//! normalized card identifier and the millisecond upload timestamp:
//!
//! ```text
//! asset-<normalizedCardId>-<uploadedAtMs>.<extension>
//! ```
//!
//! [`AudioStore::store`] validates an upload and persists it under a fresh
//! name; [`AudioStore::list`] reconstructs [`AudioAsset`] records purely from
//! file names plus a stat call, newest first. Files that do not match the
//! pattern are skipped silently so foreign files can coexist in the
//! directory.
//!
//! Normalization replaces every character outside `[A-Za-z0-9]` with `_`.
//! It is lossy: distinct raw identifiers can collide after normalization
//! (e.g. `a-b` and `a_b`), in which case their assets become
//! indistinguishable to the lister. The intended identifier space is small
//! integer IDs, for which normalization is the identity function.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Upload size ceiling (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// URL prefix under which stored files are served statically.
pub const PUBLIC_PREFIX: &str = "/audio";

/// Extension used when the uploaded file name carries none.
const DEFAULT_EXTENSION: &str = "mp3";

/// Extensions the lister recognizes (case-insensitive).
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a"];

/// Canonical asset file name pattern. The card-id capture stops at the
/// first literal `-`, which is safe because normalization never emits one.
fn asset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^asset-([^-]+)-(\d+)\.").expect("pattern is valid"))
}

/// One stored audio clip, derived on every read from its file name plus a
/// filesystem stat. Never persisted as a separate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioAsset {
    /// Stored file name, e.g. `asset-42-1712345678901.wav`.
    pub filename: String,
    /// Public URL path, `/audio/<filename>`.
    pub public_path: String,
    /// The *normalized* card identifier parsed back out of the file name.
    pub card_id: String,
    /// Millisecond upload timestamp; the sort key.
    pub uploaded_at_ms: i64,
    /// Byte size from the filesystem stat at list time.
    pub size_bytes: u64,
}

/// An uploaded file as received from the multipart form, before validation.
#[derive(Debug, Clone)]
pub struct IncomingAudio {
    /// Original client-side file name, if the form carried one.
    pub file_name: Option<String>,
    /// Declared content type, if the form carried one.
    pub mime_type: Option<String>,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// Result of a successful [`AudioStore::store`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Public URL path of the new file.
    pub public_path: String,
    /// File name the content was stored under.
    pub stored_file_name: String,
}

/// Storage-layer errors. The first four are client-input rejections in
/// validation order; `Io` is a genuine storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The multipart form carried no `audio` file.
    #[error("No file uploaded")]
    MissingFile,

    /// The multipart form carried no (or an empty) `cardId`.
    #[error("No card ID provided")]
    MissingCardId,

    /// The declared content type is not an audio type.
    #[error("Invalid file type. Please upload an audio file.")]
    InvalidFileType,

    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File too large. Maximum size is 10MB.")]
    FileTooLarge,

    /// Reading or writing the asset directory failed.
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// Keeps file names shell- and URL-safe and keeps the literal `-` free for
/// use as the field separator in the asset file name format.
pub fn normalize_card_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Extension of an uploaded file name: the substring after the last `.`,
/// defaulting to `mp3` when absent. A candidate containing anything other
/// than ASCII alphanumerics also falls back to the default so a hostile
/// file name cannot steer the write path out of the asset directory.
fn extension_of(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Whether a file name ends in one of the recognized audio extensions.
fn has_audio_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

/// File-backed store for audio assets.
///
/// Stateless beyond the directory path: every call is one bounded
/// filesystem interaction. Concurrent stores for different cards are safe
/// by construction (distinct file names); same-card same-millisecond
/// stores are an accepted, unhandled race.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first successful upload, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and persist an uploaded audio clip.
    ///
    /// Validation short-circuits in order: file present, card id present
    /// and non-empty, content type contains `audio`, size within
    /// [`MAX_UPLOAD_BYTES`]. On success the content is written verbatim
    /// (no transcoding) to a fresh file; existing files are never
    /// overwritten because the millisecond timestamp discriminates names.
    pub async fn store(
        &self,
        card_id: Option<&str>,
        file: Option<IncomingAudio>,
    ) -> Result<StoredAsset, StoreError> {
        let file = file.ok_or(StoreError::MissingFile)?;
        let card_id = card_id
            .filter(|id| !id.is_empty())
            .ok_or(StoreError::MissingCardId)?;

        let mime_type = file.mime_type.as_deref().unwrap_or("");
        if !mime_type.contains("audio") {
            return Err(StoreError::InvalidFileType);
        }
        if file.content.len() > MAX_UPLOAD_BYTES {
            return Err(StoreError::FileTooLarge);
        }

        let normalized = normalize_card_id(card_id);
        let uploaded_at_ms = chrono::Utc::now().timestamp_millis();
        let extension = extension_of(file.file_name.as_deref().unwrap_or(""));
        let stored_file_name = format!("asset-{normalized}-{uploaded_at_ms}.{extension}");

        // Idempotent: pre-existence of the directory is not an error.
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&stored_file_name), &file.content).await?;

        tracing::debug!(
            filename = %stored_file_name,
            size_bytes = file.content.len(),
            "audio asset written"
        );

        Ok(StoredAsset {
            public_path: format!("{PUBLIC_PREFIX}/{stored_file_name}"),
            stored_file_name,
        })
    }

    /// Scan the directory and reconstruct assets, newest first.
    ///
    /// A missing directory is the expected first-run state and yields an
    /// empty list. File names with an unrecognized extension, names that
    /// fail the canonical pattern, and timestamps that overflow `i64` are
    /// skipped without error. When `card_id_filter` is given it is
    /// normalized exactly like the writer normalizes, then matched as a
    /// file name prefix. An empty filter means no filter, the same as
    /// `None`.
    pub async fn list(&self, card_id_filter: Option<&str>) -> Result<Vec<AudioAsset>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = card_id_filter
            .filter(|f| !f.is_empty())
            .map(|f| format!("asset-{}-", normalize_card_id(f)));

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !has_audio_extension(name) {
                continue;
            }
            if let Some(prefix) = &prefix {
                if !name.starts_with(prefix.as_str()) {
                    continue;
                }
            }
            let Some(caps) = asset_pattern().captures(name) else {
                continue;
            };
            let Ok(uploaded_at_ms) = caps[2].parse::<i64>() else {
                continue;
            };
            let metadata = entry.metadata().await?;

            assets.push(AudioAsset {
                filename: name.to_string(),
                public_path: format!("{PUBLIC_PREFIX}/{name}"),
                card_id: caps[1].to_string(),
                uploaded_at_ms,
                size_bytes: metadata.len(),
            });
        }

        assets.sort_unstable_by(|a, b| b.uploaded_at_ms.cmp(&a.uploaded_at_ms));
        Ok(assets)
    }
}

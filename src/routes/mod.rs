//! # API Route Modules
//!
//! - `audio`: the two audio asset endpoints the reels client consumes:
//!   `GET /api/get-audio` (list, optionally filtered by card) and
//!   `POST /api/upload-audio` (multipart upload).

pub mod audio;

//! # Authentication Middleware
//!
//! Optional static bearer-token authentication:
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! The token is configured via `REELS_AUTH_TOKEN`. When the variable is
//! absent, authentication is disabled and every request passes through;
//! the browser client ships without credentials, so this is the default
//! deployment mode. Health probes, `/metrics`, `/openapi.json`, and the
//! static `/audio/*` files are mounted outside this middleware and never
//! require a token.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// A bearer token that never appears in `Debug` output and compares in
/// constant time.
#[derive(Clone)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Constant-time comparison against a caller-supplied token.
    fn verify(&self, provided: &str) -> bool {
        provided.as_bytes().ct_eq(self.0.as_bytes()).into()
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

/// Auth configuration injected into the API router as an extension.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Expected token. `None` disables authentication.
    pub token: Option<SecretToken>,
}

/// Bearer-token middleware for the API routes.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();

    let expected = match config {
        Some(AuthConfig {
            token: Some(expected),
        }) => expected,
        // Auth disabled.
        _ => return next.run(request).await,
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) if expected.verify(provided) => next.run(request).await,
            Some(_) => AppError::Unauthorized("invalid bearer token".to_string()).into_response(),
            None => AppError::Unauthorized(
                "authorization header must use Bearer scheme".to_string(),
            )
            .into_response(),
        },
        None => {
            AppError::Unauthorized("missing authorization header".to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_exact_match() {
        let token = SecretToken::new("s3cret");
        assert!(token.verify("s3cret"));
    }

    #[test]
    fn verify_rejects_mismatch_and_prefix() {
        let token = SecretToken::new("s3cret");
        assert!(!token.verify("wrong"));
        assert!(!token.verify("s3cre"));
        assert!(!token.verify("s3cret "));
        assert!(!token.verify(""));
    }

    #[test]
    fn debug_redacts_token() {
        let token = SecretToken::new("s3cret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("REDACTED"));
    }
}

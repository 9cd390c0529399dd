// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Callers present `Authorization: Bearer <owner_id>:<signature>` where the
//! signature is the hex HMAC-SHA256 of the owner id under the deployment
//! secret. A valid token establishes the caller's identity for the request;
//! the path owner check happens later in the handler. When no secret is
//! configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Deployment-wide signing secret. If `None`, all requests are rejected.
    pub secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// The authenticated caller, inserted into request extensions by the
/// middleware and read by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

/// Builds a bearer token for `owner_id` under `secret`.
///
/// Shared with tests and client tooling so the token format lives in one
/// place.
pub fn sign_token(secret: &str, owner_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(owner_id.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{owner_id}:{signature}")
}

/// Verifies a bearer token and returns the owner id it authenticates.
fn verify_token(secret: &str, token: &str) -> Option<String> {
    let (owner_id, signature_hex) = token.rsplit_once(':')?;
    if owner_id.is_empty() {
        return None;
    }
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(owner_id.as_bytes());
    // Constant-time comparison.
    mac.verify_slice(&signature).ok()?;
    Some(owner_id.to_string())
}

/// Middleware that validates the bearer token and records the caller
/// identity in request extensions.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref secret) = auth.secret else {
        tracing::error!("gateway has no auth secret configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token
        && let Some(owner_id) = verify_token(secret, token)
    {
        request.extensions_mut().insert(CallerIdentity(owner_id));
        return Ok(next.run(request).await);
    }

    Err(StatusCode::UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_token_round_trips() {
        let token = sign_token("secret", "alice");
        assert_eq!(verify_token("secret", &token), Some("alice".to_string()));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token("secret", "alice");
        assert_eq!(verify_token("other-secret", &token), None);
    }

    #[test]
    fn tampered_owner_is_rejected() {
        let token = sign_token("secret", "alice");
        let (_owner, sig) = token.rsplit_once(':').unwrap();
        assert_eq!(verify_token("secret", &format!("bob:{sig}")), None);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(verify_token("secret", "no-separator"), None);
        assert_eq!(verify_token("secret", ":deadbeef"), None);
        assert_eq!(verify_token("secret", "alice:not-hex"), None);
    }

    #[test]
    fn owner_ids_containing_colons_verify() {
        let token = sign_token("secret", "org:alice");
        assert_eq!(
            verify_token("secret", &token),
            Some("org:alice".to_string())
        );
    }

    #[test]
    fn auth_config_debug_redacts_secret() {
        let config = AuthConfig {
            secret: Some("super-secret".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super-secret"));
        assert!(debug_output.contains("[redacted]"));
    }
}

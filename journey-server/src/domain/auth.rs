//! Caller authentication state.
//!
//! The access token is passed explicitly to everything that talks to the
//! journal store. Nothing reads it from ambient storage.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;

/// An opaque bearer token.
///
/// `Debug` only shows the first 5 characters.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First few characters, for logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(5).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.redacted())
    }
}

/// Whether a request carries a usable credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(AccessToken),
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl AuthState {
    /// Build from an `Authorization` header value.
    ///
    /// Accepts `Bearer <token>` (scheme is case-insensitive). JWTs past
    /// their `exp` claim, or with an undecodable payload, are rejected.
    pub fn from_bearer(header: Option<&str>) -> Self {
        Self::from_bearer_at(header, Utc::now().timestamp())
    }

    /// Like [`AuthState::from_bearer`] with an explicit clock, in unix seconds.
    pub fn from_bearer_at(header: Option<&str>, now_secs: i64) -> Self {
        let Some(header) = header else {
            return AuthState::Unauthenticated;
        };

        let Some((scheme, token)) = header.trim().split_once(' ') else {
            return AuthState::Unauthenticated;
        };

        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return AuthState::Unauthenticated;
        }

        if is_jwt(token) {
            match jwt_expiry(token) {
                Some(Some(exp)) if exp <= now_secs => return AuthState::Unauthenticated,
                Some(_) => {}
                None => return AuthState::Unauthenticated,
            }
        }

        AuthState::Authenticated(AccessToken::new(token))
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            AuthState::Authenticated(token) => Some(token),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

fn is_jwt(token: &str) -> bool {
    token.split('.').count() == 3
}

/// Decode the `exp` claim of a JWT.
///
/// Returns `None` if the payload is not valid base64url JSON, and
/// `Some(None)` if it decodes but carries no expiry.
fn jwt_expiry(token: &str) -> Option<Option<i64>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

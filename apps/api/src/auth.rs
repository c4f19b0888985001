//! Request authentication.
//!
//! Handlers take an `AuthUser` argument; the extractor asks the configured
//! `Authenticator` for a user id and rejects with 401 when there is none.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Header trusted by `HeaderAuthenticator`.
pub const USER_ID_HEADER: &str = "x-user-id";

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves the calling user, or `None` when the request is anonymous or
    /// its credentials are rejected.
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Uuid>;
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Supabase
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
}

/// Validates bearer tokens against a Supabase auth server.
pub struct SupabaseAuthenticator {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuthenticator {
    pub fn new(base_url: &str, anon_key: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(AUTH_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

#[async_trait]
impl Authenticator for SupabaseAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Uuid> {
        let token = bearer_token(headers)?;

        let response = match self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.anon_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Auth server unreachable: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Auth server rejected token: {}", response.status());
            return None;
        }

        match response.json::<SupabaseUser>().await {
            Ok(user) => Some(user.id),
            Err(e) => {
                warn!("Unexpected auth server response: {e}");
                None
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Header (development)
// ────────────────────────────────────────────────────────────────────────────

/// Trusts the `x-user-id` header as-is. Only for local development and tests.
pub struct HeaderAuthenticator;

#[async_trait]
impl Authenticator for HeaderAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Uuid> {
        let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
        Uuid::parse_str(raw.trim()).ok()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .auth
            .authenticate(&parts.headers)
            .await
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

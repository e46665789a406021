//! Bearer-token extractor.
//!
//! Pulls the JWT from the `Authorization` header and runs the full
//! per-request check (signature AND account existence), yielding the
//! live `Account` to the handler.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domains::{Account, AccountRef, DomainError};

use crate::envelope::ApiError;
use crate::AppState;

/// The authenticated caller.
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    /// Tagged reference for ownership checks.
    pub fn as_ref(&self) -> AccountRef {
        AccountRef {
            kind: self.0.kind,
            id: self.0.id,
        }
    }
}

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError(DomainError::Auth("missing Authorization header".into()))
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError(DomainError::Auth("expected a bearer token".into())))?;

        let account = state.auth.authenticate(token).await?;
        Ok(CurrentAccount(account))
    }
}

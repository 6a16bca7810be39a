//! Caller identity
//!
//! The login layer in front of this service forwards the provider account id
//! in a header. It is resolved to the internal user id on every request.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use super::handlers::AppState;
use crate::error::AppError;

/// Header carrying the provider account id of the caller.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Internal id of the authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Reads the account id header, ignoring blank values.
pub fn account_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let account = account_id(&parts.headers).ok_or(AppError::Unauthorized)?;
        state
            .services
            .accounts
            .user_id(account)
            .await
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

//! Account context for tenant scoping.
//!
//! The gateway in front of this service authenticates the user and forwards
//! the account they act for in the `X-Account-ID` header. Every report is
//! computed for that account only.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

pub const ACCOUNT_ID_HEADER: &str = "X-Account-ID";

/// Current account extracted from request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountContext {
    pub account_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AccountContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-Account-ID header (required from gateway)"
                ))
            })?;

        let account_id = Uuid::parse_str(raw.trim()).map_err(|_| {
            AppError::AuthError(anyhow::anyhow!("Invalid X-Account-ID header"))
        })?;

        tracing::Span::current().record("account_id", tracing::field::display(account_id));

        Ok(AccountContext { account_id })
    }
}

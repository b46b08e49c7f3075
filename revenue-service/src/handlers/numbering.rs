use super::section_failure;
use crate::dtos::{NextNumberResponse, ValidateNumberRequest, ValidateNumberResponse};
use crate::middleware::AccountContext;
use crate::services::DocumentKind;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

async fn next_number(
    state: &AppState,
    account: AccountContext,
    kind: DocumentKind,
) -> Result<Json<NextNumberResponse>, AppError> {
    let next_number = state
        .sequences
        .next_number(account.account_id, kind)
        .await
        .map_err(|e| section_failure("next number", account.account_id, e))?;
    Ok(Json(NextNumberResponse { next_number }))
}

async fn validate_number(
    state: &AppState,
    account: AccountContext,
    kind: DocumentKind,
    request: ValidateNumberRequest,
) -> Result<Json<ValidateNumberResponse>, AppError> {
    request.validate()?;

    let check = state
        .sequences
        .check_number(account.account_id, kind, &request.number)
        .await
        .map_err(|e| match e {
            AppError::InvalidInput { .. } => e,
            other => section_failure("next number", account.account_id, other),
        })?;

    tracing::debug!(kind = %kind, number = %check.number, "Document number accepted");

    Ok(Json(ValidateNumberResponse {
        number: check.number,
        minimum: check.minimum,
    }))
}

pub async fn next_quote_number(
    State(state): State<AppState>,
    account: AccountContext,
) -> Result<Json<NextNumberResponse>, AppError> {
    next_number(&state, account, DocumentKind::Quote).await
}

pub async fn next_invoice_number(
    State(state): State<AppState>,
    account: AccountContext,
) -> Result<Json<NextNumberResponse>, AppError> {
    next_number(&state, account, DocumentKind::Invoice).await
}

pub async fn validate_quote_number(
    State(state): State<AppState>,
    account: AccountContext,
    Json(request): Json<ValidateNumberRequest>,
) -> Result<Json<ValidateNumberResponse>, AppError> {
    validate_number(&state, account, DocumentKind::Quote, request).await
}

pub async fn validate_invoice_number(
    State(state): State<AppState>,
    account: AccountContext,
    Json(request): Json<ValidateNumberRequest>,
) -> Result<Json<ValidateNumberResponse>, AppError> {
    validate_number(&state, account, DocumentKind::Invoice, request).await
}

use crate::dtos::{InvoiceListParams, InvoiceListResponse, InvoiceResponse};
use crate::middleware::AccountContext;
use crate::models::InvoiceListFilter;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

pub async fn list_invoices(
    State(state): State<AppState>,
    account: AccountContext,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let today = state.clock.today();
    let filter = InvoiceListFilter::from(params);

    let items = state
        .store
        .list_invoices(account.account_id, &filter, today)
        .await
        .map_err(|e| super::section_failure("invoices", account.account_id, e))?;

    Ok(Json(InvoiceListResponse {
        invoices: items
            .into_iter()
            .map(|item| InvoiceResponse::from_item(item, today))
            .collect(),
        page: filter.page,
        page_size: filter.page_size,
    }))
}

use super::section_failure;
use crate::dtos::{ChartsParams, ChartsReport, DashboardSummary, QuarterParams, QuarterReport};
use crate::middleware::AccountContext;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

pub async fn dashboard_summary(
    State(state): State<AppState>,
    account: AccountContext,
) -> Result<Json<DashboardSummary>, AppError> {
    let today = state.clock.today();
    state
        .aggregator
        .dashboard(account.account_id, today)
        .await
        .map(Json)
        .map_err(|e| section_failure("dashboard", account.account_id, e))
}

pub async fn dashboard_quarter(
    State(state): State<AppState>,
    account: AccountContext,
    Query(params): Query<QuarterParams>,
) -> Result<Json<QuarterReport>, AppError> {
    let today = state.clock.today();
    let selector = params.quarter.unwrap_or_default();
    state
        .aggregator
        .quarter_report(account.account_id, selector, today)
        .await
        .map(Json)
        .map_err(|e| section_failure("quarter", account.account_id, e))
}

pub async fn dashboard_charts(
    State(state): State<AppState>,
    account: AccountContext,
    Query(params): Query<ChartsParams>,
) -> Result<Json<ChartsReport>, AppError> {
    let today = state.clock.today();
    state
        .aggregator
        .charts(account.account_id, params.year, today)
        .await
        .map(Json)
        .map_err(|e| section_failure("charts", account.account_id, e))
}

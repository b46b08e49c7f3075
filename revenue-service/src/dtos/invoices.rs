use crate::models::{InvoiceListFilter, InvoiceListItem, InvoiceSort, InvoiceStatus, SortOrder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query string accepted by `GET /invoices`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub issued_from: Option<NaiveDate>,
    pub issued_to: Option<NaiveDate>,
    pub overdue: Option<bool>,
    pub search: Option<String>,
    pub sort: Option<InvoiceSort>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<InvoiceListParams> for InvoiceListFilter {
    fn from(params: InvoiceListParams) -> Self {
        Self {
            status: params.status,
            client_id: params.client_id,
            project_id: params.project_id,
            issued_from: params.issued_from,
            issued_to: params.issued_to,
            overdue: params.overdue,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            sort: params.sort.unwrap_or_default(),
            order: params.order.unwrap_or_default(),
            page: params.page.unwrap_or(1).max(1),
            page_size: params
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub status_code: i16,
    pub client_id: Uuid,
    pub client_name: String,
    pub project_id: Uuid,
    pub issue_date: NaiveDate,
    pub payment_due_date: NaiveDate,
    pub actual_payment_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub overdue: bool,
}

impl InvoiceResponse {
    pub fn from_item(item: InvoiceListItem, today: NaiveDate) -> Self {
        let overdue = item.is_overdue(today);
        Self {
            invoice_id: item.invoice_id,
            invoice_number: item.invoice_number,
            status: item.status,
            status_code: item.status.code(),
            client_id: item.client_id,
            client_name: item.client_name,
            project_id: item.project_id,
            issue_date: item.issue_date,
            payment_due_date: item.payment_due_date,
            actual_payment_date: item.actual_payment_date,
            total: item.total,
            overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_normalized_into_filter() {
        let filter = InvoiceListFilter::from(InvoiceListParams {
            search: Some("   ".to_string()),
            page: Some(0),
            page_size: Some(500),
            ..Default::default()
        });
        assert_eq!(filter.search, None);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, MAX_PAGE_SIZE);
        assert_eq!(filter.sort, InvoiceSort::IssueDate);
        assert_eq!(filter.order, SortOrder::Desc);
    }
}

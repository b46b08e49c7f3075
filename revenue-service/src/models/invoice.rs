//! Invoice model for revenue-service.

use super::line::{document_total, DocumentLine};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status, persisted as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft = 0,
    Edited = 1,
    Sent = 2,
    Paid = 3,
}

impl InvoiceStatus {
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Draft),
            1 => Some(Self::Edited),
            2 => Some(Self::Sent),
            3 => Some(Self::Paid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Edited => "edited",
            Self::Sent => "sent",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice issued for a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub project_id: Uuid,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub payment_due_date: NaiveDate,
    pub actual_payment_date: Option<NaiveDate>,
    pub payment_type: Option<String>,
    pub created_utc: DateTime<Utc>,
    #[sqlx(skip)]
    pub lines: Vec<DocumentLine>,
}

impl Invoice {
    pub fn total(&self) -> Decimal {
        document_total(&self.lines)
    }

    /// Paid invoices can no longer be edited or deleted.
    pub fn is_locked(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && today > self.payment_due_date
    }

    /// Move to `status`. Entering `Paid` stamps today as payment date unless one is set.
    pub fn set_status(&mut self, status: InvoiceStatus, today: NaiveDate) {
        if status == InvoiceStatus::Paid && self.actual_payment_date.is_none() {
            self.actual_payment_date = Some(today);
        }
        self.status = status;
    }

    /// Replace every line of the invoice.
    pub fn replace_lines(&mut self, lines: Vec<DocumentLine>) -> Result<(), AppError> {
        if self.is_locked() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Invoice {} is paid and cannot be modified",
                self.invoice_number
            )));
        }
        self.lines = lines;
        Ok(())
    }
}

/// Sortable invoice columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceSort {
    #[default]
    IssueDate,
    DueDate,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter parameters for listing invoices. One field per filterable column.
#[derive(Debug, Clone)]
pub struct InvoiceListFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub issued_from: Option<NaiveDate>,
    pub issued_to: Option<NaiveDate>,
    pub overdue: Option<bool>,
    pub search: Option<String>,
    pub sort: InvoiceSort,
    pub order: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl Default for InvoiceListFilter {
    fn default() -> Self {
        Self {
            status: None,
            client_id: None,
            project_id: None,
            issued_from: None,
            issued_to: None,
            overdue: None,
            search: None,
            sort: InvoiceSort::default(),
            order: SortOrder::default(),
            page: 1,
            page_size: 20,
        }
    }
}

impl InvoiceListFilter {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// Invoice row as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceListItem {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub client_id: Uuid,
    pub client_name: String,
    pub project_id: Uuid,
    pub issue_date: NaiveDate,
    pub payment_due_date: NaiveDate,
    pub actual_payment_date: Option<NaiveDate>,
    pub total: Decimal,
}

impl InvoiceListItem {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && today > self.payment_due_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(status: InvoiceStatus) -> Invoice {
        Invoice {
            invoice_id: 7,
            project_id: Uuid::new_v4(),
            invoice_number: "FAC-007".to_string(),
            status,
            issue_date: date(2024, 4, 1),
            payment_due_date: date(2024, 5, 1),
            actual_payment_date: None,
            payment_type: None,
            created_utc: Utc::now(),
            lines: vec![DocumentLine::new("Build", Decimal::from(1200), Decimal::ONE)],
        }
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Edited,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
        ] {
            assert_eq!(InvoiceStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(InvoiceStatus::from_code(4), None);
        assert_eq!(InvoiceStatus::Edited.code(), 1);
    }

    #[test]
    fn overdue_only_when_sent_and_past_due() {
        let sent = invoice(InvoiceStatus::Sent);
        assert!(!sent.is_overdue(date(2024, 5, 1)));
        assert!(sent.is_overdue(date(2024, 5, 2)));

        let edited = invoice(InvoiceStatus::Edited);
        assert!(!edited.is_overdue(date(2024, 6, 1)));
    }

    #[test]
    fn paying_stamps_payment_date_once() {
        let mut inv = invoice(InvoiceStatus::Sent);
        inv.set_status(InvoiceStatus::Paid, date(2024, 5, 10));
        assert_eq!(inv.actual_payment_date, Some(date(2024, 5, 10)));

        let mut prepaid = invoice(InvoiceStatus::Sent);
        prepaid.actual_payment_date = Some(date(2024, 4, 30));
        prepaid.set_status(InvoiceStatus::Paid, date(2024, 5, 10));
        assert_eq!(prepaid.actual_payment_date, Some(date(2024, 4, 30)));
    }

    #[test]
    fn paid_invoice_rejects_line_replacement() {
        let mut inv = invoice(InvoiceStatus::Paid);
        assert!(inv.replace_lines(Vec::new()).is_err());
        assert_eq!(inv.total(), Decimal::from(1200));

        let mut open = invoice(InvoiceStatus::Draft);
        open.replace_lines(vec![DocumentLine::new("Fix", Decimal::from(90), Decimal::from(2))])
            .unwrap();
        assert_eq!(open.total(), Decimal::from(180));
    }

    #[test]
    fn offset_follows_page() {
        let filter = InvoiceListFilter {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        assert_eq!(filter.offset(), 50);
    }
}

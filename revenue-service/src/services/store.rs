//! Storage abstraction consumed by the reporting services.
//!
//! Every read is scoped to one account. Invoices and projects are reached
//! through the Client -> Project -> Invoice chain, never by id alone.

use crate::models::{
    Account, Client, DocumentLine, Invoice, InvoiceListFilter, InvoiceListItem, InvoiceStatus,
    Project, Quote,
};
use crate::services::sequence::DocumentKind;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

/// Creation-time window for counting clients and projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatedWindow {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub before: Option<DateTime<Utc>>,
}

impl CreatedWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn before(ts: DateTime<Utc>) -> Self {
        Self {
            from: None,
            before: Some(ts),
        }
    }

    pub fn since(ts: DateTime<Utc>) -> Self {
        Self {
            from: Some(ts),
            before: None,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.before.map_or(true, |before| ts < before)
    }
}

/// Invoice date column a sum can be restricted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceDateField {
    ActualPaymentDate,
    PaymentDueDate,
}

impl InvoiceDateField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::ActualPaymentDate => "i.actual_payment_date",
            Self::PaymentDueDate => "i.payment_due_date",
        }
    }

    pub fn value_of(&self, invoice: &Invoice) -> Option<NaiveDate> {
        match self {
            Self::ActualPaymentDate => invoice.actual_payment_date,
            Self::PaymentDueDate => Some(invoice.payment_due_date),
        }
    }
}

/// Inclusive date range over one invoice date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub field: InvoiceDateField,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, invoice: &Invoice) -> bool {
        self.field
            .value_of(invoice)
            .is_some_and(|d| d >= self.start && d <= self.end)
    }
}

/// Which invoices a line-total sum covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSumFilter {
    pub statuses: Vec<InvoiceStatus>,
    pub window: Option<DateWindow>,
}

impl InvoiceSumFilter {
    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            statuses: vec![status],
            window: None,
        }
    }

    pub fn statuses(statuses: &[InvoiceStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            window: None,
        }
    }

    pub fn within(
        mut self,
        field: InvoiceDateField,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        self.window = Some(DateWindow { field, start, end });
        self
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.statuses.contains(&invoice.status)
            && self.window.map_or(true, |w| w.contains(invoice))
    }

    pub(crate) fn status_codes(&self) -> Vec<i16> {
        self.statuses.iter().map(|s| s.code()).collect()
    }
}

/// Data store for accounts, clients, projects and documents.
#[async_trait]
pub trait RevenueStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn insert_account(&self, account: &Account) -> Result<(), AppError>;
    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError>;
    async fn insert_client(&self, client: &Client) -> Result<(), AppError>;
    async fn insert_project(&self, project: &Project) -> Result<(), AppError>;

    /// Insert a quote with its lines and return the assigned internal id.
    async fn insert_quote(&self, quote: &Quote) -> Result<i64, AppError>;
    async fn get_quote(&self, account_id: Uuid, quote_id: i64) -> Result<Option<Quote>, AppError>;
    /// Replace all lines of a quote that is not accepted.
    async fn replace_quote_lines(
        &self,
        account_id: Uuid,
        quote_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Quote, AppError>;

    /// Insert an invoice with its lines and return the assigned internal id.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<i64, AppError>;
    async fn get_invoice(
        &self,
        account_id: Uuid,
        invoice_id: i64,
    ) -> Result<Option<Invoice>, AppError>;
    /// Replace all lines of an invoice that is not paid.
    async fn replace_invoice_lines(
        &self,
        account_id: Uuid,
        invoice_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Invoice, AppError>;
    async fn list_invoices(
        &self,
        account_id: Uuid,
        filter: &InvoiceListFilter,
        today: NaiveDate,
    ) -> Result<Vec<InvoiceListItem>, AppError>;

    async fn count_clients(&self, account_id: Uuid, window: CreatedWindow)
        -> Result<i64, AppError>;
    async fn count_projects(
        &self,
        account_id: Uuid,
        window: CreatedWindow,
    ) -> Result<i64, AppError>;

    /// Sum of `unit_price * quantity` over the lines of matching invoices. Zero when none match.
    async fn sum_invoice_lines(
        &self,
        account_id: Uuid,
        filter: &InvoiceSumFilter,
    ) -> Result<Decimal, AppError>;

    /// Year of the earliest paid invoice that has a payment date.
    async fn earliest_paid_year(&self, account_id: Uuid) -> Result<Option<i32>, AppError>;

    /// Number of the most recently created document of `kind` (highest internal id).
    async fn latest_document_number(
        &self,
        account_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Option<String>, AppError>;
}

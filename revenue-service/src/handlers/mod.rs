pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod numbering;

pub use dashboard::{dashboard_charts, dashboard_quarter, dashboard_summary};
pub use health::{health_check, metrics_handler, readiness_check};
pub use invoices::list_invoices;
pub use numbering::{
    next_invoice_number, next_quote_number, validate_invoice_number, validate_quote_number,
};

use crate::services::metrics::record_section_failure;
use service_core::error::AppError;
use uuid::Uuid;

/// Log a failed report section and hide its cause from the caller.
pub(crate) fn section_failure(section: &'static str, account_id: Uuid, err: AppError) -> AppError {
    tracing::error!(error = %err, account_id = %account_id, section, "Failed to load report section");
    record_section_failure(section);
    AppError::SectionUnavailable(section)
}

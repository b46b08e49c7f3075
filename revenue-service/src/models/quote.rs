//! Quote model.

use super::line::{document_total, DocumentLine};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

/// Quote status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Sent,
    Accepted,
    Rejected,
}

/// Quote sent to a client for a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub quote_id: i64,
    pub project_id: Uuid,
    pub quote_number: String,
    pub status: QuoteStatus,
    pub issue_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
    #[sqlx(skip)]
    pub lines: Vec<DocumentLine>,
}

impl Quote {
    pub fn total(&self) -> Decimal {
        document_total(&self.lines)
    }

    /// Accepted quotes can no longer be edited or deleted.
    pub fn is_locked(&self) -> bool {
        self.status == QuoteStatus::Accepted
    }

    /// Replace every line of the quote.
    pub fn replace_lines(&mut self, lines: Vec<DocumentLine>) -> Result<(), AppError> {
        if self.is_locked() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Quote {} is accepted and cannot be modified",
                self.quote_number
            )));
        }
        self.lines = lines;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            quote_id: 1,
            project_id: Uuid::new_v4(),
            quote_number: "DEV-001".to_string(),
            status,
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            created_utc: Utc::now(),
            lines: vec![DocumentLine::new("Audit", Decimal::from(800), Decimal::ONE)],
        }
    }

    #[test]
    fn replacing_lines_recomputes_total() {
        let mut q = quote(QuoteStatus::Sent);
        q.replace_lines(vec![
            DocumentLine::new("Audit", Decimal::from(500), Decimal::ONE),
            DocumentLine::new("Workshop", Decimal::from(300), Decimal::from(3)),
        ])
        .unwrap();
        assert_eq!(q.total(), Decimal::from(1400));
    }

    #[test]
    fn accepted_quote_is_locked() {
        let mut q = quote(QuoteStatus::Accepted);
        assert!(q.replace_lines(Vec::new()).is_err());
        assert_eq!(q.total(), Decimal::from(800));
    }
}

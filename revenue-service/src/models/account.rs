//! Account model: the tenant scope for every report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account owning clients, projects and documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub account_id: Uuid,
    pub name: String,
    /// Yearly revenue target.
    pub max_annual_revenue: Decimal,
    /// Share of revenue set aside for expenses, in percent.
    pub expense_rate: Decimal,
    pub created_utc: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, max_annual_revenue: Decimal, expense_rate: Decimal) -> Self {
        Self {
            account_id: Uuid::new_v4(),
            name: name.into(),
            max_annual_revenue,
            expense_rate,
            created_utc: Utc::now(),
        }
    }

    /// Expense estimate for a revenue figure.
    pub fn expenses_for(&self, revenue: Decimal) -> Decimal {
        revenue * self.expense_rate / Decimal::ONE_HUNDRED
    }
}

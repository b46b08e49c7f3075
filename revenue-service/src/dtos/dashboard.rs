//! Dashboard response shapes. Money is serialized as JSON numbers.

use crate::services::period::{QuarterPeriod, QuarterSelector};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Year-over-year count of clients or projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    pub total: i64,
    pub current_year: i64,
    pub last_year: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub target: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    pub target_reached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub clients: GrowthStats,
    pub projects: GrowthStats,
    pub revenue: RevenueStats,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_payments: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub draft_invoices: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuarterParams {
    pub quarter: Option<QuarterSelector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterReport {
    pub period: QuarterPeriod,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses_to_pay: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_expenses: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartsParams {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: u32,
    pub month_name: String,
    pub month_short: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRevenue {
    pub month: u32,
    pub month_name: String,
    pub month_short: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartsReport {
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub cumulative_revenue: Vec<CumulativeRevenue>,
    pub available_years: Vec<i32>,
    pub selected_year: i32,
}

//! Revenue aggregation behind the dashboard.
//!
//! All figures are computed per account from invoice lines; a sum over no
//! rows is zero.

use crate::dtos::{
    ChartsReport, CumulativeRevenue, DashboardSummary, GrowthStats, MonthlyRevenue,
    QuarterReport, RevenueStats,
};
use crate::models::{Account, InvoiceStatus};
use crate::services::period::{available_years, PeriodResolver, QuarterSelector};
use crate::services::store::{CreatedWindow, InvoiceDateField, InvoiceSumFilter, RevenueStore};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Statuses counted as "still to be collected" in a quarter estimate.
const ESTIMATED_STATUSES: [InvoiceStatus; 2] = [InvoiceStatus::Edited, InvoiceStatus::Sent];

/// Percentage change from `last_year` to `total`.
///
/// With no base the change is reported as `total * 100`, and 0 when both are zero.
pub fn growth_percentage(total: i64, last_year: i64) -> Decimal {
    if last_year > 0 {
        (Decimal::from(total - last_year) / Decimal::from(last_year) * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    } else if total > 0 {
        Decimal::from(total) * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Running totals of a monthly series, January first.
pub fn cumulative_series(monthly: &[MonthlyRevenue]) -> Vec<CumulativeRevenue> {
    monthly
        .iter()
        .scan(Decimal::ZERO, |running, month| {
            *running += month.revenue;
            Some(CumulativeRevenue {
                month: month.month,
                month_name: month.month_name.clone(),
                month_short: month.month_short.clone(),
                cumulative_revenue: *running,
            })
        })
        .collect()
}

fn start_of_year(year: i32) -> Result<DateTime<Utc>, AppError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Year {} is out of range", year)))
}

/// Computes dashboard figures from a [`RevenueStore`].
#[derive(Clone)]
pub struct RevenueAggregator {
    store: Arc<dyn RevenueStore>,
    periods: PeriodResolver,
}

impl RevenueAggregator {
    pub fn new(store: Arc<dyn RevenueStore>, periods: PeriodResolver) -> Self {
        Self { store, periods }
    }

    async fn account(&self, account_id: Uuid) -> Result<Account, AppError> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Account {} not found", account_id)))
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn client_growth(
        &self,
        account_id: Uuid,
        today: NaiveDate,
    ) -> Result<GrowthStats, AppError> {
        let year_start = start_of_year(today.year())?;
        let total = self.store.count_clients(account_id, CreatedWindow::all()).await?;
        let last_year = self
            .store
            .count_clients(account_id, CreatedWindow::before(year_start))
            .await?;
        let current_year = self
            .store
            .count_clients(account_id, CreatedWindow::since(year_start))
            .await?;

        Ok(GrowthStats {
            total,
            current_year,
            last_year,
            percentage: growth_percentage(total, last_year),
        })
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn project_growth(
        &self,
        account_id: Uuid,
        today: NaiveDate,
    ) -> Result<GrowthStats, AppError> {
        let year_start = start_of_year(today.year())?;
        let total = self.store.count_projects(account_id, CreatedWindow::all()).await?;
        let last_year = self
            .store
            .count_projects(account_id, CreatedWindow::before(year_start))
            .await?;
        let current_year = self
            .store
            .count_projects(account_id, CreatedWindow::since(year_start))
            .await?;

        Ok(GrowthStats {
            total,
            current_year,
            last_year,
            percentage: growth_percentage(total, last_year),
        })
    }

    /// Paid revenue against the account's annual target.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn revenue_summary(&self, account_id: Uuid) -> Result<RevenueStats, AppError> {
        let account = self.account(account_id).await?;
        let current = self
            .store
            .sum_invoice_lines(account_id, &InvoiceSumFilter::status(InvoiceStatus::Paid))
            .await?;
        let target = account.max_annual_revenue;
        let remaining = target - current;

        Ok(RevenueStats {
            current,
            target,
            remaining,
            target_reached: remaining <= Decimal::ZERO,
        })
    }

    pub async fn pending_payments(&self, account_id: Uuid) -> Result<Decimal, AppError> {
        self.store
            .sum_invoice_lines(account_id, &InvoiceSumFilter::status(InvoiceStatus::Sent))
            .await
    }

    /// Total reported as `draft_invoices`. Sums edited invoices, not drafts.
    pub async fn draft_total(&self, account_id: Uuid) -> Result<Decimal, AppError> {
        self.store
            .sum_invoice_lines(account_id, &InvoiceSumFilter::status(InvoiceStatus::Edited))
            .await
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn dashboard(
        &self,
        account_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardSummary, AppError> {
        let clients = self.client_growth(account_id, today).await?;
        let projects = self.project_growth(account_id, today).await?;
        let revenue = self.revenue_summary(account_id).await?;
        let pending_payments = self.pending_payments(account_id).await?;
        let draft_invoices = self.draft_total(account_id).await?;

        debug!(
            clients = clients.total,
            projects = projects.total,
            revenue = %revenue.current,
            "Dashboard summary assembled"
        );

        Ok(DashboardSummary {
            clients,
            projects,
            revenue,
            pending_payments,
            draft_invoices,
        })
    }

    #[instrument(skip(self), fields(account_id = %account_id, quarter = ?selector))]
    pub async fn quarter_report(
        &self,
        account_id: Uuid,
        selector: QuarterSelector,
        today: NaiveDate,
    ) -> Result<QuarterReport, AppError> {
        let account = self.account(account_id).await?;
        let period = self.periods.quarter(selector, today)?;

        let paid_revenue = self
            .store
            .sum_invoice_lines(
                account_id,
                &InvoiceSumFilter::status(InvoiceStatus::Paid).within(
                    InvoiceDateField::ActualPaymentDate,
                    period.start,
                    period.end,
                ),
            )
            .await?;
        let estimated_revenue = self
            .store
            .sum_invoice_lines(
                account_id,
                &InvoiceSumFilter::statuses(&ESTIMATED_STATUSES).within(
                    InvoiceDateField::PaymentDueDate,
                    period.start,
                    period.end,
                ),
            )
            .await?;

        Ok(QuarterReport {
            period,
            paid_revenue,
            estimated_revenue,
            expenses_to_pay: account.expenses_for(paid_revenue),
            estimated_expenses: account.expenses_for(estimated_revenue),
        })
    }

    /// Paid revenue per month of `year`, by payment date.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn monthly_revenue(
        &self,
        account_id: Uuid,
        year: i32,
    ) -> Result<Vec<MonthlyRevenue>, AppError> {
        let mut series = Vec::with_capacity(12);
        for month in self.periods.year_months(year)? {
            let revenue = self
                .store
                .sum_invoice_lines(
                    account_id,
                    &InvoiceSumFilter::status(InvoiceStatus::Paid).within(
                        InvoiceDateField::ActualPaymentDate,
                        month.start,
                        month.end,
                    ),
                )
                .await?;
            series.push(MonthlyRevenue {
                month: month.month,
                month_name: month.month_name.to_string(),
                month_short: month.month_short.to_string(),
                revenue,
            });
        }
        Ok(series)
    }

    pub async fn available_years(
        &self,
        account_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<i32>, AppError> {
        let earliest = self.store.earliest_paid_year(account_id).await?;
        Ok(available_years(earliest, today))
    }

    /// Monthly and cumulative series for `year` (defaults to the current year).
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn charts(
        &self,
        account_id: Uuid,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<ChartsReport, AppError> {
        let selected_year = year.unwrap_or_else(|| today.year());
        let monthly_revenue = self.monthly_revenue(account_id, selected_year).await?;
        let cumulative_revenue = cumulative_series(&monthly_revenue);
        let available_years = self.available_years(account_id, today).await?;

        Ok(ChartsReport {
            monthly_revenue,
            cumulative_revenue,
            available_years,
            selected_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_without_base_uses_count_times_hundred() {
        assert_eq!(growth_percentage(5, 0), Decimal::from(500));
        assert_eq!(growth_percentage(0, 0), Decimal::ZERO);
    }

    #[test]
    fn growth_with_base_is_rounded_to_one_decimal() {
        assert_eq!(growth_percentage(15, 10), Decimal::from(50));
        assert_eq!(growth_percentage(4, 3), Decimal::new(333, 1));
        assert_eq!(growth_percentage(2, 3), Decimal::new(-333, 1));
    }

    #[test]
    fn growth_midpoints_round_away_from_zero() {
        // 1.25% and 3.75%
        assert_eq!(growth_percentage(81, 80), Decimal::new(13, 1));
        assert_eq!(growth_percentage(83, 80), Decimal::new(38, 1));
        // -1.25%
        assert_eq!(growth_percentage(79, 80), Decimal::new(-13, 1));
    }

    fn month(m: u32, revenue: i64) -> MonthlyRevenue {
        MonthlyRevenue {
            month: m,
            month_name: format!("m{m}"),
            month_short: format!("m{m}"),
            revenue: Decimal::from(revenue),
        }
    }

    #[test]
    fn cumulative_series_is_prefix_sum() {
        let monthly: Vec<_> = [100, 0, 250, 50]
            .iter()
            .enumerate()
            .map(|(i, r)| month(i as u32 + 1, *r))
            .collect();
        let cumulative = cumulative_series(&monthly);

        assert_eq!(cumulative[0].cumulative_revenue, monthly[0].revenue);
        for i in 1..monthly.len() {
            assert_eq!(
                cumulative[i].cumulative_revenue - cumulative[i - 1].cumulative_revenue,
                monthly[i].revenue
            );
        }
        assert_eq!(cumulative[3].cumulative_revenue, Decimal::from(400));
        assert_eq!(cumulative[2].month, 3);
    }
}

//! Calendar periods used by the dashboard: quarters, months and report years.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

const MONTHS_EN: [(&str, &str); 12] = [
    ("January", "Jan"),
    ("February", "Feb"),
    ("March", "Mar"),
    ("April", "Apr"),
    ("May", "May"),
    ("June", "Jun"),
    ("July", "Jul"),
    ("August", "Aug"),
    ("September", "Sep"),
    ("October", "Oct"),
    ("November", "Nov"),
    ("December", "Dec"),
];

const MONTHS_FR: [(&str, &str); 12] = [
    ("janvier", "janv."),
    ("février", "févr."),
    ("mars", "mars"),
    ("avril", "avr."),
    ("mai", "mai"),
    ("juin", "juin"),
    ("juillet", "juil."),
    ("août", "août"),
    ("septembre", "sept."),
    ("octobre", "oct."),
    ("novembre", "nov."),
    ("décembre", "déc."),
];

/// Display locale for month names and formatted dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    fn months(&self) -> &'static [(&'static str, &'static str); 12] {
        match self {
            Locale::En => &MONTHS_EN,
            Locale::Fr => &MONTHS_FR,
        }
    }

    /// Full month name, `month` in 1..=12.
    pub fn month_name(&self, month: u32) -> &'static str {
        self.months()[month_index(month)].0
    }

    pub fn month_short(&self, month: u32) -> &'static str {
        self.months()[month_index(month)].1
    }

    pub fn date_format(&self) -> &'static str {
        match self {
            Locale::En => "%m/%d/%Y",
            Locale::Fr => "%d/%m/%Y",
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.date_format()).to_string()
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            _ => Err(format!("Invalid display locale: {}", s)),
        }
    }
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

/// Symbolic quarter requested by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarterSelector {
    #[default]
    Current,
    Previous,
    Next,
}

impl QuarterSelector {
    /// Date inside the selected quarter: today shifted by -3, 0 or +3 months.
    fn anchor(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            QuarterSelector::Current => Some(today),
            QuarterSelector::Previous => today.checked_sub_months(Months::new(3)),
            QuarterSelector::Next => today.checked_add_months(Months::new(3)),
        }
    }
}

/// Resolved quarter with display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_formatted: String,
    pub end_formatted: String,
    pub quarter: QuarterSelector,
}

/// One calendar month of a report year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSpan {
    pub month: u32,
    pub month_name: &'static str,
    pub month_short: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// First and last day of the calendar quarter containing `date`.
pub fn quarter_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first_month = (date.month0() / 3) * 3 + 1;
    let start = NaiveDate::from_ymd_opt(date.year(), first_month, 1)?;
    let end = start.checked_add_months(Months::new(3))?.pred_opt()?;
    Some((start, end))
}

/// First and last day of `month` in `year`.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

/// Years from the earliest paid invoice through `today`'s year, ascending.
pub fn available_years(earliest_paid_year: Option<i32>, today: NaiveDate) -> Vec<i32> {
    let current = today.year();
    let first = earliest_paid_year.map_or(current, |year| year.min(current));
    (first..=current).collect()
}

/// Resolves periods using the configured display locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodResolver {
    locale: Locale,
}

impl PeriodResolver {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn quarter(
        &self,
        selector: QuarterSelector,
        today: NaiveDate,
    ) -> Result<QuarterPeriod, AppError> {
        let (start, end) = selector
            .anchor(today)
            .and_then(quarter_bounds)
            .ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!(
                    "Quarter out of range for date {}",
                    today
                ))
            })?;

        Ok(QuarterPeriod {
            start,
            end,
            start_formatted: self.locale.format_date(start),
            end_formatted: self.locale.format_date(end),
            quarter: selector,
        })
    }

    pub fn year_months(&self, year: i32) -> Result<Vec<MonthSpan>, AppError> {
        (1..=12)
            .map(|month| {
                let (start, end) = month_bounds(year, month).ok_or_else(|| {
                    AppError::BadRequest(anyhow::anyhow!("Year {} is out of range", year))
                })?;
                Ok(MonthSpan {
                    month,
                    month_name: self.locale.month_name(month),
                    month_short: self.locale.month_short(month),
                    start,
                    end,
                })
            })
            .collect()
    }
}

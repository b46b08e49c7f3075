pub mod dashboard;
pub mod invoices;
pub mod numbering;

pub use dashboard::{
    ChartsParams, ChartsReport, CumulativeRevenue, DashboardSummary, GrowthStats,
    MonthlyRevenue, QuarterParams, QuarterReport, RevenueStats,
};
pub use invoices::{InvoiceListParams, InvoiceListResponse, InvoiceResponse};
pub use numbering::{NextNumberResponse, ValidateNumberRequest, ValidateNumberResponse};

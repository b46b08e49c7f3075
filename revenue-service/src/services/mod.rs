//! Services module for revenue-service.

pub mod aggregator;
pub mod clock;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod period;
pub mod sequence;
pub mod store;

pub use aggregator::{growth_percentage, RevenueAggregator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use database::Database;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use period::{Locale, PeriodResolver, QuarterSelector};
pub use sequence::{DocumentKind, NumberingError, SequenceGenerator};
pub use store::{CreatedWindow, DateWindow, InvoiceDateField, InvoiceSumFilter, RevenueStore};

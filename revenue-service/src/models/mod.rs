//! Domain models for revenue-service.

mod account;
mod client;
mod invoice;
mod line;
mod project;
mod quote;

pub use account::Account;
pub use client::Client;
pub use invoice::{
    Invoice, InvoiceListFilter, InvoiceListItem, InvoiceSort, InvoiceStatus, SortOrder,
};
pub use line::{document_total, DocumentLine};
pub use project::{Project, ProjectStatus};
pub use quote::{Quote, QuoteStatus};

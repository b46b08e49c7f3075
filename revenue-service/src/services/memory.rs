//! In-process store backed by plain collections.
//!
//! Mirrors the PostgreSQL store's account scoping so that reports computed
//! against it match the database.

use crate::models::{
    document_total, Account, Client, DocumentLine, Invoice, InvoiceListFilter, InvoiceListItem,
    InvoiceSort, InvoiceStatus, Project, Quote, SortOrder,
};
use crate::services::sequence::DocumentKind;
use crate::services::store::{CreatedWindow, InvoiceSumFilter, RevenueStore};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    clients: HashMap<Uuid, Client>,
    projects: HashMap<Uuid, Project>,
    quotes: Vec<Quote>,
    invoices: Vec<Invoice>,
    last_quote_id: i64,
    last_invoice_id: i64,
}

impl Tables {
    fn project_client(&self, project_id: Uuid) -> Option<&Client> {
        self.projects
            .get(&project_id)
            .and_then(|p| self.clients.get(&p.client_id))
    }

    fn owns_project(&self, account_id: Uuid, project_id: Uuid) -> bool {
        self.project_client(project_id)
            .is_some_and(|c| c.account_id == account_id)
    }

    fn account_invoices(&self, account_id: Uuid) -> impl Iterator<Item = &Invoice> + '_ {
        self.invoices
            .iter()
            .filter(move |i| self.owns_project(account_id, i.project_id))
    }
}

fn missing_parent(what: &str, id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("{} {} not found", what, id))
}

/// Store kept in memory for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevenueStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.account_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Account {} already exists",
                account.account_id
            )));
        }
        tables.accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.tables.read().await.accounts.get(&account_id).cloned())
    }

    async fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&client.account_id) {
            return Err(missing_parent("Account", client.account_id));
        }
        tables.clients.insert(client.client_id, client.clone());
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&project.client_id) {
            return Err(missing_parent("Client", project.client_id));
        }
        tables.projects.insert(project.project_id, project.clone());
        Ok(())
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&quote.project_id) {
            return Err(missing_parent("Project", quote.project_id));
        }
        tables.last_quote_id += 1;
        let mut stored = quote.clone();
        stored.quote_id = tables.last_quote_id;
        tables.quotes.push(stored);
        Ok(tables.last_quote_id)
    }

    async fn get_quote(&self, account_id: Uuid, quote_id: i64) -> Result<Option<Quote>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .iter()
            .find(|q| q.quote_id == quote_id && tables.owns_project(account_id, q.project_id))
            .cloned())
    }

    async fn replace_quote_lines(
        &self,
        account_id: Uuid,
        quote_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Quote, AppError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let owned: Vec<Uuid> = tables
            .projects
            .keys()
            .copied()
            .filter(|p| tables.owns_project(account_id, *p))
            .collect();
        let quote = tables
            .quotes
            .iter_mut()
            .find(|q| q.quote_id == quote_id && owned.contains(&q.project_id))
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)))?;
        quote.replace_lines(lines.to_vec())?;
        Ok(quote.clone())
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&invoice.project_id) {
            return Err(missing_parent("Project", invoice.project_id));
        }
        tables.last_invoice_id += 1;
        let mut stored = invoice.clone();
        stored.invoice_id = tables.last_invoice_id;
        tables.invoices.push(stored);
        Ok(tables.last_invoice_id)
    }

    async fn get_invoice(
        &self,
        account_id: Uuid,
        invoice_id: i64,
    ) -> Result<Option<Invoice>, AppError> {
        let tables = self.tables.read().await;
        let found = tables
            .account_invoices(account_id)
            .find(|i| i.invoice_id == invoice_id)
            .cloned();
        Ok(found)
    }

    async fn replace_invoice_lines(
        &self,
        account_id: Uuid,
        invoice_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Invoice, AppError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let owned: Vec<Uuid> = tables
            .projects
            .keys()
            .copied()
            .filter(|p| tables.owns_project(account_id, *p))
            .collect();
        let invoice = tables
            .invoices
            .iter_mut()
            .find(|i| i.invoice_id == invoice_id && owned.contains(&i.project_id))
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id))
            })?;
        invoice.replace_lines(lines.to_vec())?;
        Ok(invoice.clone())
    }

    async fn list_invoices(
        &self,
        account_id: Uuid,
        filter: &InvoiceListFilter,
        today: NaiveDate,
    ) -> Result<Vec<InvoiceListItem>, AppError> {
        let tables = self.tables.read().await;
        let search = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut items: Vec<InvoiceListItem> = tables
            .account_invoices(account_id)
            .filter_map(|invoice| {
                let client = tables.project_client(invoice.project_id)?;
                Some(InvoiceListItem {
                    invoice_id: invoice.invoice_id,
                    invoice_number: invoice.invoice_number.clone(),
                    status: invoice.status,
                    client_id: client.client_id,
                    client_name: client.display_name(),
                    project_id: invoice.project_id,
                    issue_date: invoice.issue_date,
                    payment_due_date: invoice.payment_due_date,
                    actual_payment_date: invoice.actual_payment_date,
                    total: document_total(&invoice.lines),
                })
            })
            .filter(|item| filter.status.map_or(true, |s| item.status == s))
            .filter(|item| filter.client_id.map_or(true, |c| item.client_id == c))
            .filter(|item| filter.project_id.map_or(true, |p| item.project_id == p))
            .filter(|item| filter.issued_from.map_or(true, |d| item.issue_date >= d))
            .filter(|item| filter.issued_to.map_or(true, |d| item.issue_date <= d))
            .filter(|item| filter.overdue.map_or(true, |o| item.is_overdue(today) == o))
            .filter(|item| {
                search
                    .as_deref()
                    .map_or(true, |s| item.invoice_number.to_lowercase().contains(s))
            })
            .collect();

        items.sort_by(|a, b| {
            let ordering = match filter.sort {
                InvoiceSort::IssueDate => a.issue_date.cmp(&b.issue_date),
                InvoiceSort::DueDate => a.payment_due_date.cmp(&b.payment_due_date),
                InvoiceSort::Number => a.invoice_number.cmp(&b.invoice_number),
            }
            .then(a.invoice_id.cmp(&b.invoice_id));
            match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(items
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .collect())
    }

    async fn count_clients(
        &self,
        account_id: Uuid,
        window: CreatedWindow,
    ) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .clients
            .values()
            .filter(|c| c.account_id == account_id && window.contains(c.created_utc))
            .count();
        Ok(count as i64)
    }

    async fn count_projects(
        &self,
        account_id: Uuid,
        window: CreatedWindow,
    ) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .projects
            .values()
            .filter(|p| tables.owns_project(account_id, p.project_id))
            .filter(|p| window.contains(p.created_utc))
            .count();
        Ok(count as i64)
    }

    async fn sum_invoice_lines(
        &self,
        account_id: Uuid,
        filter: &InvoiceSumFilter,
    ) -> Result<Decimal, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .account_invoices(account_id)
            .filter(|i| filter.matches(i))
            .map(Invoice::total)
            .sum())
    }

    async fn earliest_paid_year(&self, account_id: Uuid) -> Result<Option<i32>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .account_invoices(account_id)
            .filter(|i| i.status == InvoiceStatus::Paid)
            .filter_map(|i| i.actual_payment_date)
            .map(|d| d.year())
            .min())
    }

    async fn latest_document_number(
        &self,
        account_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Option<String>, AppError> {
        let tables = self.tables.read().await;
        let number = match kind {
            DocumentKind::Quote => tables
                .quotes
                .iter()
                .filter(|q| tables.owns_project(account_id, q.project_id))
                .max_by_key(|q| q.quote_id)
                .map(|q| q.quote_number.clone()),
            DocumentKind::Invoice => tables
                .account_invoices(account_id)
                .max_by_key(|i| i.invoice_id)
                .map(|i| i.invoice_number.clone()),
        };
        Ok(number)
    }
}

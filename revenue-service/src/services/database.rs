//! PostgreSQL store for revenue-service.

use crate::models::{
    Account, Client, DocumentLine, Invoice, InvoiceListFilter, InvoiceListItem, InvoiceSort,
    InvoiceStatus, Project, Quote, SortOrder,
};
use crate::services::metrics::QueryTimer;
use crate::services::sequence::DocumentKind;
use crate::services::store::{CreatedWindow, InvoiceSumFilter, RevenueStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Transaction};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Joins that scope invoices to the owning account.
const INVOICE_SCOPE: &str = r#"
    FROM invoices i
    JOIN projects p ON p.project_id = i.project_id
    JOIN clients c ON c.client_id = p.client_id
"#;

/// `LIKE` pattern matching `search` anywhere, with its wildcards taken literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "revenue-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| db_error("Failed to connect", e))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        table: &str,
        owner_column: &str,
        owner_id: i64,
        lines: &[DocumentLine],
    ) -> Result<(), AppError> {
        if lines.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}, description, unit_price, quantity, sort_order) ",
            table, owner_column
        ));
        builder.push_values(lines.iter().enumerate(), |mut row, (index, line)| {
            let sort_order = if line.sort_order == 0 {
                index as i32
            } else {
                line.sort_order
            };
            row.push_bind(owner_id)
                .push_bind(&line.description)
                .push_bind(line.unit_price)
                .push_bind(line.quantity)
                .push_bind(sort_order);
        });
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to insert lines", e))?;
        Ok(())
    }

    async fn load_lines(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: i64,
    ) -> Result<Vec<DocumentLine>, AppError> {
        let sql = format!(
            "SELECT description, unit_price, quantity, sort_order FROM {} WHERE {} = $1 ORDER BY sort_order, line_id",
            table, owner_column
        );
        sqlx::query_as::<_, DocumentLine>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load lines", e))
    }
}

#[async_trait]
impl RevenueStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Health check failed", e))?;
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.account_id))]
    async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, name, max_annual_revenue, expense_rate, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.account_id)
        .bind(&account.name)
        .bind(account.max_annual_revenue)
        .bind(account.expense_rate)
        .bind(account.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Account {} already exists",
                    account.account_id
                ))
            }
            _ => db_error("Failed to create account", e),
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        let timer = QueryTimer::start("get_account");
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, name, max_annual_revenue, expense_rate, created_utc
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get account", e))?;
        timer.observe_duration();
        Ok(account)
    }

    #[instrument(skip(self, client), fields(account_id = %client.account_id))]
    async fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clients (client_id, account_id, is_company, company_name,
                                 contact_first_name, contact_last_name, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(client.client_id)
        .bind(client.account_id)
        .bind(client.is_company)
        .bind(&client.company_name)
        .bind(&client.contact_first_name)
        .bind(&client.contact_last_name)
        .bind(client.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create client", e))?;
        Ok(())
    }

    #[instrument(skip(self, project), fields(client_id = %project.client_id))]
    async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO projects (project_id, client_id, name, status, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(project.project_id)
        .bind(project.client_id)
        .bind(&project.name)
        .bind(project.status)
        .bind(project.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create project", e))?;
        Ok(())
    }

    #[instrument(skip(self, quote), fields(quote_number = %quote.quote_number))]
    async fn insert_quote(&self, quote: &Quote) -> Result<i64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let quote_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quotes (project_id, quote_number, status, issue_date, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING quote_id
            "#,
        )
        .bind(quote.project_id)
        .bind(&quote.quote_number)
        .bind(quote.status)
        .bind(quote.issue_date)
        .bind(quote.created_utc)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create quote", e))?;

        Self::insert_lines(&mut tx, "quote_lines", "quote_id", quote_id, &quote.lines).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit quote", e))?;

        info!(quote_id, "Quote created");
        Ok(quote_id)
    }

    #[instrument(skip(self), fields(account_id = %account_id, quote_id = quote_id))]
    async fn get_quote(&self, account_id: Uuid, quote_id: i64) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            SELECT q.quote_id, q.project_id, q.quote_number, q.status, q.issue_date, q.created_utc
            FROM quotes q
            JOIN projects p ON p.project_id = q.project_id
            JOIN clients c ON c.client_id = p.client_id
            WHERE c.account_id = $1 AND q.quote_id = $2
            "#,
        )
        .bind(account_id)
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get quote", e))?;

        match quote {
            Some(mut quote) => {
                quote.lines = self.load_lines("quote_lines", "quote_id", quote_id).await?;
                Ok(Some(quote))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, lines), fields(account_id = %account_id, quote_id = quote_id))]
    async fn replace_quote_lines(
        &self,
        account_id: Uuid,
        quote_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Quote, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Row lock keeps the status from changing until the new lines are in.
        let mut quote = sqlx::query_as::<_, Quote>(
            r#"
            SELECT q.quote_id, q.project_id, q.quote_number, q.status, q.issue_date, q.created_utc
            FROM quotes q
            JOIN projects p ON p.project_id = q.project_id
            JOIN clients c ON c.client_id = p.client_id
            WHERE c.account_id = $1 AND q.quote_id = $2
            FOR UPDATE OF q
            "#,
        )
        .bind(account_id)
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock quote", e))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)))?;
        quote.replace_lines(lines.to_vec())?;

        sqlx::query("DELETE FROM quote_lines WHERE quote_id = $1")
            .bind(quote_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete quote lines", e))?;
        Self::insert_lines(&mut tx, "quote_lines", "quote_id", quote_id, lines).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit quote lines", e))?;

        quote.lines = self.load_lines("quote_lines", "quote_id", quote_id).await?;
        Ok(quote)
    }

    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number))]
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<i64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let invoice_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoices (project_id, invoice_number, status, issue_date, payment_due_date,
                                  actual_payment_date, payment_type, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING invoice_id
            "#,
        )
        .bind(invoice.project_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.status)
        .bind(invoice.issue_date)
        .bind(invoice.payment_due_date)
        .bind(invoice.actual_payment_date)
        .bind(&invoice.payment_type)
        .bind(invoice.created_utc)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create invoice", e))?;

        Self::insert_lines(&mut tx, "invoice_lines", "invoice_id", invoice_id, &invoice.lines)
            .await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit invoice", e))?;

        info!(invoice_id, status = %invoice.status, "Invoice created");
        Ok(invoice_id)
    }

    #[instrument(skip(self), fields(account_id = %account_id, invoice_id = invoice_id))]
    async fn get_invoice(
        &self,
        account_id: Uuid,
        invoice_id: i64,
    ) -> Result<Option<Invoice>, AppError> {
        let sql = format!(
            r#"
            SELECT i.invoice_id, i.project_id, i.invoice_number, i.status, i.issue_date,
                   i.payment_due_date, i.actual_payment_date, i.payment_type, i.created_utc
            {INVOICE_SCOPE}
            WHERE c.account_id = $1 AND i.invoice_id = $2
            "#
        );
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(account_id)
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get invoice", e))?;

        match invoice {
            Some(mut invoice) => {
                invoice.lines = self
                    .load_lines("invoice_lines", "invoice_id", invoice_id)
                    .await?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, lines), fields(account_id = %account_id, invoice_id = invoice_id))]
    async fn replace_invoice_lines(
        &self,
        account_id: Uuid,
        invoice_id: i64,
        lines: &[DocumentLine],
    ) -> Result<Invoice, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let sql = format!(
            r#"
            SELECT i.invoice_id, i.project_id, i.invoice_number, i.status, i.issue_date,
                   i.payment_due_date, i.actual_payment_date, i.payment_type, i.created_utc
            {INVOICE_SCOPE}
            WHERE c.account_id = $1 AND i.invoice_id = $2
            FOR UPDATE OF i
            "#
        );
        let mut invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(account_id)
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock invoice", e))?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id))
            })?;
        invoice.replace_lines(lines.to_vec())?;

        sqlx::query("DELETE FROM invoice_lines WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete invoice lines", e))?;
        Self::insert_lines(&mut tx, "invoice_lines", "invoice_id", invoice_id, lines).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit invoice lines", e))?;

        invoice.lines = self
            .load_lines("invoice_lines", "invoice_id", invoice_id)
            .await?;
        Ok(invoice)
    }

    #[instrument(skip(self, filter), fields(account_id = %account_id))]
    async fn list_invoices(
        &self,
        account_id: Uuid,
        filter: &InvoiceListFilter,
        today: NaiveDate,
    ) -> Result<Vec<InvoiceListItem>, AppError> {
        let timer = QueryTimer::start("list_invoices");

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT i.invoice_id, i.invoice_number, i.status, c.client_id,
                   CASE WHEN c.is_company AND c.company_name IS NOT NULL THEN c.company_name
                        ELSE TRIM(c.contact_first_name || ' ' || c.contact_last_name)
                   END AS client_name,
                   i.project_id, i.issue_date, i.payment_due_date, i.actual_payment_date,
                   COALESCE((SELECT SUM(l.unit_price * l.quantity)
                             FROM invoice_lines l
                             WHERE l.invoice_id = i.invoice_id), 0) AS total
            "#,
        );
        builder.push(INVOICE_SCOPE);
        builder.push(" WHERE c.account_id = ").push_bind(account_id);

        if let Some(status) = filter.status {
            builder.push(" AND i.status = ").push_bind(status.code());
        }
        if let Some(client_id) = filter.client_id {
            builder.push(" AND c.client_id = ").push_bind(client_id);
        }
        if let Some(project_id) = filter.project_id {
            builder.push(" AND i.project_id = ").push_bind(project_id);
        }
        if let Some(from) = filter.issued_from {
            builder.push(" AND i.issue_date >= ").push_bind(from);
        }
        if let Some(to) = filter.issued_to {
            builder.push(" AND i.issue_date <= ").push_bind(to);
        }
        if let Some(overdue) = filter.overdue {
            builder
                .push(if overdue { " AND " } else { " AND NOT " })
                .push("(i.status = ")
                .push_bind(InvoiceStatus::Sent.code())
                .push(" AND i.payment_due_date < ")
                .push_bind(today)
                .push(")");
        }
        if let Some(search) = &filter.search {
            builder
                .push(" AND i.invoice_number ILIKE ")
                .push_bind(contains_pattern(search))
                .push(r" ESCAPE '\'");
        }

        let column = match filter.sort {
            InvoiceSort::IssueDate => "i.issue_date",
            InvoiceSort::DueDate => "i.payment_due_date",
            InvoiceSort::Number => "i.invoice_number",
        };
        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        builder.push(format!(" ORDER BY {} {}, i.invoice_id {}", column, direction, direction));
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(filter.page_size))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset()));

        let items = builder
            .build_query_as::<InvoiceListItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list invoices", e))?;

        timer.observe_duration();
        Ok(items)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn count_clients(
        &self,
        account_id: Uuid,
        window: CreatedWindow,
    ) -> Result<i64, AppError> {
        let timer = QueryTimer::start("count_clients");
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clients
            WHERE account_id = $1
              AND ($2::timestamptz IS NULL OR created_utc >= $2)
              AND ($3::timestamptz IS NULL OR created_utc < $3)
            "#,
        )
        .bind(account_id)
        .bind(window.from)
        .bind(window.before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count clients", e))?;
        timer.observe_duration();
        Ok(count)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn count_projects(
        &self,
        account_id: Uuid,
        window: CreatedWindow,
    ) -> Result<i64, AppError> {
        let timer = QueryTimer::start("count_projects");
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM projects p
            JOIN clients c ON c.client_id = p.client_id
            WHERE c.account_id = $1
              AND ($2::timestamptz IS NULL OR p.created_utc >= $2)
              AND ($3::timestamptz IS NULL OR p.created_utc < $3)
            "#,
        )
        .bind(account_id)
        .bind(window.from)
        .bind(window.before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count projects", e))?;
        timer.observe_duration();
        Ok(count)
    }

    #[instrument(skip(self, filter), fields(account_id = %account_id))]
    async fn sum_invoice_lines(
        &self,
        account_id: Uuid,
        filter: &InvoiceSumFilter,
    ) -> Result<Decimal, AppError> {
        let timer = QueryTimer::start("sum_invoice_lines");

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COALESCE(SUM(l.unit_price * l.quantity), 0)");
        builder.push(INVOICE_SCOPE);
        builder.push(" JOIN invoice_lines l ON l.invoice_id = i.invoice_id");
        builder.push(" WHERE c.account_id = ").push_bind(account_id);
        builder
            .push(" AND i.status = ANY(")
            .push_bind(filter.status_codes())
            .push(")");
        if let Some(window) = filter.window {
            let column = window.field.column();
            builder
                .push(format!(" AND {} >= ", column))
                .push_bind(window.start)
                .push(format!(" AND {} <= ", column))
                .push_bind(window.end);
        }

        let total: Decimal = builder
            .build_query_scalar::<Decimal>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to sum invoice lines", e))?;

        timer.observe_duration();
        Ok(total)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn earliest_paid_year(&self, account_id: Uuid) -> Result<Option<i32>, AppError> {
        let sql = format!(
            r#"
            SELECT MIN(EXTRACT(YEAR FROM i.actual_payment_date))::int
            {INVOICE_SCOPE}
            WHERE c.account_id = $1 AND i.status = $2 AND i.actual_payment_date IS NOT NULL
            "#
        );
        sqlx::query_scalar::<_, Option<i32>>(&sql)
            .bind(account_id)
            .bind(InvoiceStatus::Paid.code())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get earliest paid year", e))
    }

    #[instrument(skip(self), fields(account_id = %account_id, kind = %kind))]
    async fn latest_document_number(
        &self,
        account_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Option<String>, AppError> {
        let sql = match kind {
            DocumentKind::Quote => {
                r#"
                SELECT q.quote_number
                FROM quotes q
                JOIN projects p ON p.project_id = q.project_id
                JOIN clients c ON c.client_id = p.client_id
                WHERE c.account_id = $1
                ORDER BY q.quote_id DESC
                LIMIT 1
                "#
            }
            DocumentKind::Invoice => {
                r#"
                SELECT i.invoice_number
                FROM invoices i
                JOIN projects p ON p.project_id = i.project_id
                JOIN clients c ON c.client_id = p.client_id
                WHERE c.account_id = $1
                ORDER BY i.invoice_id DESC
                LIMIT 1
                "#
            }
        };
        sqlx::query_scalar::<_, String>(sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get latest document number", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("FAC-01"), "%FAC-01%");
        assert_eq!(contains_pattern("%"), r"%\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(r"x\y"), r"%x\\y%");
    }
}

//! Common test utilities for revenue-service integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use http_body_util::BodyExt;
use revenue_service::config::{RevenueConfig, StoreBackend};
use revenue_service::middleware::ACCOUNT_ID_HEADER;
use revenue_service::models::{
    Account, Client, DocumentLine, Invoice, InvoiceStatus, Project, Quote, QuoteStatus,
};
use revenue_service::services::{FixedClock, Locale, MemoryStore, RevenueStore};
use revenue_service::startup::{build_router, AppState};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// "Today" for every test unless a test picks its own.
pub fn today() -> NaiveDate {
    date(2024, 5, 15)
}

pub fn test_config(locale: Locale) -> RevenueConfig {
    RevenueConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        service_name: "revenue-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        store: StoreBackend::Memory,
        database: None,
        locale,
    }
}

/// Router over an in-memory store with a pinned clock.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with(today(), Locale::En)
    }

    pub fn spawn_with(today: NaiveDate, locale: Locale) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            test_config(locale),
            store.clone() as Arc<dyn RevenueStore>,
            Arc::new(FixedClock(today)),
        );
        Self {
            store,
            router: build_router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, account_id: Uuid) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(ACCOUNT_ID_HEADER, account_id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_account_header(&self, uri: &str, raw: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(ACCOUNT_ID_HEADER, raw)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_anonymous(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, account_id: Uuid, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(ACCOUNT_ID_HEADER, account_id.to_string())
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Account with a 50 000 target and a 20% expense rate.
    pub async fn seed_account(&self) -> Account {
        let account = Account::new("Atelier", Decimal::from(50_000), Decimal::from(20));
        self.store.insert_account(&account).await.unwrap();
        account
    }

    pub async fn seed_client(&self, account: &Account, created: DateTime<Utc>) -> Client {
        let client = Client::company(account.account_id, "Acme").created_at(created);
        self.store.insert_client(&client).await.unwrap();
        client
    }

    pub async fn seed_project(&self, client: &Client, created: DateTime<Utc>) -> Project {
        let project = Project::new(client.client_id, "Website").created_at(created);
        self.store.insert_project(&project).await.unwrap();
        project
    }

    /// Client and project created before the current year.
    pub async fn seed_project_for(&self, account: &Account) -> Project {
        let client = self.seed_client(account, at(2023, 3, 1)).await;
        self.seed_project(&client, at(2023, 3, 2)).await
    }

    pub async fn seed_invoice(&self, project: &Project, invoice: InvoiceBuilder) -> i64 {
        self.store
            .insert_invoice(&invoice.build(project.project_id))
            .await
            .unwrap()
    }

    pub async fn seed_quote(&self, project: &Project, number: &str, status: QuoteStatus) -> i64 {
        let quote = Quote {
            quote_id: 0,
            project_id: project.project_id,
            quote_number: number.to_string(),
            status,
            issue_date: today(),
            created_utc: Utc::now(),
            lines: vec![line(1000, 1)],
        };
        self.store.insert_quote(&quote).await.unwrap()
    }
}

/// Line with a whole unit price.
pub fn line(unit_price: i64, quantity: i64) -> DocumentLine {
    DocumentLine::new("Service", Decimal::from(unit_price), Decimal::from(quantity))
}

/// Builder for seeded invoices.
pub struct InvoiceBuilder {
    number: String,
    status: InvoiceStatus,
    issue_date: NaiveDate,
    due: NaiveDate,
    paid: Option<NaiveDate>,
    lines: Vec<DocumentLine>,
}

impl InvoiceBuilder {
    pub fn new(number: &str, status: InvoiceStatus) -> Self {
        Self {
            number: number.to_string(),
            status,
            issue_date: date(2024, 4, 1),
            due: date(2024, 5, 1),
            paid: None,
            lines: Vec::new(),
        }
    }

    pub fn issued(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = issue_date;
        self
    }

    pub fn due(mut self, due: NaiveDate) -> Self {
        self.due = due;
        self
    }

    pub fn paid_on(mut self, paid: NaiveDate) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn line(mut self, unit_price: i64, quantity: i64) -> Self {
        self.lines.push(line(unit_price, quantity));
        self
    }

    pub fn build(self, project_id: Uuid) -> Invoice {
        Invoice {
            invoice_id: 0,
            project_id,
            invoice_number: self.number,
            status: self.status,
            issue_date: self.issue_date,
            payment_due_date: self.due,
            actual_payment_date: self.paid,
            payment_type: None,
            created_utc: Utc::now(),
            lines: self.lines,
        }
    }
}

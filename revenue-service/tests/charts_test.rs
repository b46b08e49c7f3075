//! Monthly and cumulative revenue chart tests. Today is 2024-05-15.

mod common;

use axum::http::StatusCode;
use common::{date, InvoiceBuilder, TestApp};
use revenue_service::models::InvoiceStatus;
use revenue_service::services::Locale;
use serde_json::json;

fn series(body: &serde_json::Value, key: &str, field: &str) -> Vec<f64> {
    body[key]
        .as_array()
        .expect("series is an array")
        .iter()
        .map(|entry| entry[field].as_f64().expect("amount is a number"))
        .collect()
}

#[tokio::test]
async fn monthly_revenue_follows_payment_dates() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;

    for invoice in [
        InvoiceBuilder::new("FAC-001", InvoiceStatus::Paid)
            .paid_on(date(2024, 1, 15))
            .line(1000, 1),
        InvoiceBuilder::new("FAC-002", InvoiceStatus::Paid)
            .paid_on(date(2024, 3, 10))
            .line(250, 2),
        InvoiceBuilder::new("FAC-003", InvoiceStatus::Paid)
            .paid_on(date(2024, 3, 31))
            .line(250, 1),
        InvoiceBuilder::new("FAC-004", InvoiceStatus::Sent)
            .due(date(2024, 2, 10))
            .line(8000, 1),
    ] {
        app.seed_invoice(&project, invoice).await;
    }

    let (status, body) = app.get("/dashboard/charts?year=2024", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_year"], 2024);

    let monthly = series(&body, "monthly_revenue", "revenue");
    assert_eq!(monthly.len(), 12);
    assert_eq!(&monthly[..4], &[1000.0, 0.0, 750.0, 0.0]);

    let cumulative = series(&body, "cumulative_revenue", "cumulative_revenue");
    assert_eq!(cumulative.len(), 12);
    assert_eq!(cumulative[0], monthly[0]);
    for i in 1..12 {
        assert_eq!(cumulative[i] - cumulative[i - 1], monthly[i]);
    }
    assert_eq!(cumulative[11], 1750.0);

    assert_eq!(body["monthly_revenue"][0]["month"], 1);
    assert_eq!(body["monthly_revenue"][0]["month_name"], "January");
    assert_eq!(body["monthly_revenue"][0]["month_short"], "Jan");
    assert_eq!(body["cumulative_revenue"][11]["month_name"], "December");
}

#[tokio::test]
async fn available_years_start_at_earliest_payment() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;

    app.seed_invoice(
        &project,
        InvoiceBuilder::new("FAC-001", InvoiceStatus::Paid)
            .paid_on(date(2022, 6, 1))
            .line(100, 1),
    )
    .await;
    app.seed_invoice(
        &project,
        InvoiceBuilder::new("FAC-002", InvoiceStatus::Paid)
            .paid_on(date(2023, 1, 1))
            .line(200, 1),
    )
    .await;

    let (status, body) = app.get("/dashboard/charts", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_years"], json!([2022, 2023, 2024]));
    assert_eq!(body["selected_year"], 2024);

    let (_, past) = app.get("/dashboard/charts?year=2022", account.account_id).await;
    let monthly = series(&past, "monthly_revenue", "revenue");
    assert_eq!(monthly[5], 100.0);
    assert_eq!(monthly.iter().sum::<f64>(), 100.0);
}

#[tokio::test]
async fn available_years_is_current_year_without_payments() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;
    app.seed_invoice(
        &project,
        InvoiceBuilder::new("FAC-001", InvoiceStatus::Sent).line(100, 1),
    )
    .await;

    let (status, body) = app.get("/dashboard/charts", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_years"], json!([2024]));
    assert!(series(&body, "cumulative_revenue", "cumulative_revenue")
        .iter()
        .all(|v| *v == 0.0));
}

#[tokio::test]
async fn french_locale_names_months() {
    let app = TestApp::spawn_with(date(2024, 5, 15), Locale::Fr);
    let account = app.seed_account().await;

    let (status, body) = app.get("/dashboard/charts", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthly_revenue"][1]["month_name"], "février");
    assert_eq!(body["monthly_revenue"][1]["month_short"], "févr.");
}

//! Quarter report integration tests. Today is 2024-05-15.

mod common;

use axum::http::StatusCode;
use common::{date, InvoiceBuilder, TestApp};
use revenue_service::models::{InvoiceStatus, Project};
use revenue_service::services::Locale;

async fn seed_quarters(app: &TestApp, project: &Project) {
    let invoices = [
        // Paid in Q2: 4000 + 500 (end date is inclusive)
        InvoiceBuilder::new("FAC-001", InvoiceStatus::Paid)
            .paid_on(date(2024, 4, 10))
            .line(2000, 2),
        InvoiceBuilder::new("FAC-002", InvoiceStatus::Paid)
            .paid_on(date(2024, 6, 30))
            .line(500, 1),
        // Paid in Q1
        InvoiceBuilder::new("FAC-003", InvoiceStatus::Paid)
            .paid_on(date(2024, 3, 31))
            .line(1000, 1),
        // Still to be collected in Q2: 2000 + 1000
        InvoiceBuilder::new("FAC-004", InvoiceStatus::Edited)
            .due(date(2024, 5, 20))
            .line(2000, 1),
        InvoiceBuilder::new("FAC-005", InvoiceStatus::Sent)
            .due(date(2024, 6, 1))
            .line(1000, 1),
        // Due in Q3
        InvoiceBuilder::new("FAC-006", InvoiceStatus::Sent)
            .due(date(2024, 7, 1))
            .line(700, 1),
        // Drafts never count
        InvoiceBuilder::new("FAC-007", InvoiceStatus::Draft)
            .due(date(2024, 5, 20))
            .line(9999, 1),
    ];
    for invoice in invoices {
        app.seed_invoice(project, invoice).await;
    }
}

#[tokio::test]
async fn current_quarter_sums_paid_and_expected_revenue() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;
    seed_quarters(&app, &project).await;

    let (status, body) = app
        .get("/dashboard/quarter?quarter=current", account.account_id)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["start"], "2024-04-01");
    assert_eq!(body["period"]["end"], "2024-06-30");
    assert_eq!(body["period"]["start_formatted"], "04/01/2024");
    assert_eq!(body["period"]["end_formatted"], "06/30/2024");
    assert_eq!(body["period"]["quarter"], "current");
    assert_eq!(body["paid_revenue"].as_f64(), Some(4500.0));
    assert_eq!(body["estimated_revenue"].as_f64(), Some(3000.0));
    assert_eq!(body["expenses_to_pay"].as_f64(), Some(900.0));
    assert_eq!(body["estimated_expenses"].as_f64(), Some(600.0));
}

#[tokio::test]
async fn quarter_defaults_to_current() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;

    let (status, body) = app.get("/dashboard/quarter", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["quarter"], "current");
    assert_eq!(body["period"]["start"], "2024-04-01");
    assert_eq!(body["paid_revenue"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn previous_quarter_covers_january_to_march() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;
    seed_quarters(&app, &project).await;

    let (status, body) = app
        .get("/dashboard/quarter?quarter=previous", account.account_id)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["start"], "2024-01-01");
    assert_eq!(body["period"]["end"], "2024-03-31");
    assert_eq!(body["period"]["quarter"], "previous");
    assert_eq!(body["paid_revenue"].as_f64(), Some(1000.0));
    assert_eq!(body["estimated_revenue"].as_f64(), Some(0.0));
    assert_eq!(body["expenses_to_pay"].as_f64(), Some(200.0));
}

#[tokio::test]
async fn next_quarter_covers_july_to_september() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;
    let project = app.seed_project_for(&account).await;
    seed_quarters(&app, &project).await;

    let (status, body) = app
        .get("/dashboard/quarter?quarter=next", account.account_id)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["start"], "2024-07-01");
    assert_eq!(body["period"]["end"], "2024-09-30");
    assert_eq!(body["paid_revenue"].as_f64(), Some(0.0));
    assert_eq!(body["estimated_revenue"].as_f64(), Some(700.0));
    assert_eq!(body["estimated_expenses"].as_f64(), Some(140.0));
}

#[tokio::test]
async fn unknown_selector_is_a_bad_request() {
    let app = TestApp::spawn();
    let account = app.seed_account().await;

    let (status, _) = app
        .get("/dashboard/quarter?quarter=last", account.account_id)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn french_locale_formats_day_first() {
    let app = TestApp::spawn_with(date(2024, 5, 15), Locale::Fr);
    let account = app.seed_account().await;

    let (status, body) = app.get("/dashboard/quarter", account.account_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"]["start_formatted"], "01/04/2024");
    assert_eq!(body["period"]["end_formatted"], "30/06/2024");
}

#[tokio::test]
async fn unknown_account_fails_with_generic_error() {
    let app = TestApp::spawn();

    let (status, body) = app
        .get("/dashboard/quarter", uuid::Uuid::new_v4())
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load quarter");
}

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use db::{DBOptions, DBService};
use serde_json::{Value, json};
use server::{AppState, routes};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let db = DBService::open(dir.path().join("api.db"), &DBOptions::default())
        .await
        .unwrap();
    (dir, routes::router(AppState::new(db)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_company(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/companies",
        Some(json!({"name": "Acme SL", "tax_id": "B12345678"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_draft(app: &Router, company_id: &str, doc_type: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/documents",
        Some(json!({
            "company_id": company_id,
            "doc_type": doc_type,
            "counterparty": "Globex",
            "description": null,
            "corrects_document_id": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "draft");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn issue_flow_numbers_documents_sequentially() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;

    let preview_uri = format!("/api/companies/{company_id}/counters/invoice/2026/next");
    let (status, body) = send(&app, Method::GET, &preview_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["next_number"], 1);
    assert_eq!(body["data"]["reference"], "FAC-2026-0001");

    for expected in 1..=2 {
        let id = create_draft(&app, &company_id, "invoice").await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/documents/{id}/issue"),
            Some(json!({"issue_date": "2026-03-10"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "issued");
        assert_eq!(body["data"]["number"], expected);
        assert_eq!(body["data"]["year"], 2026);
    }

    let (_, body) = send(&app, Method::GET, &preview_uri, None).await;
    assert_eq!(body["data"]["next_number"], 3);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/companies/{company_id}/counters"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["current_number"], 2);
    assert_eq!(body["data"][0]["doc_type"], "invoice");
}

#[tokio::test]
async fn reissuing_is_a_conflict() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;
    let id = create_draft(&app, &company_id, "quote").await;
    let issue_uri = format!("/api/documents/{id}/issue");

    let (status, body) = send(
        &app,
        Method::POST,
        &issue_uri,
        Some(json!({"issue_date": "2026-06-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");

    let (status, body) = send(&app, Method::POST, &issue_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/companies/{company_id}/counters/quote/2026/next"),
        None,
    )
    .await;
    assert_eq!(body["data"]["next_number"], 2);
}

#[tokio::test]
async fn void_then_events() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;
    let id = create_draft(&app, &company_id, "purchase_invoice").await;

    send(
        &app,
        Method::POST,
        &format!("/api/documents/{id}/issue"),
        Some(json!({"issue_date": "2026-02-02"})),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/documents/{id}/void"),
        Some(json!({"reason": "entered twice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "void");
    assert_eq!(body["data"]["number"], 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/documents/{id}/events"), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["voided", "issued", "created"]);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (_dir, app) = app().await;
    let missing = uuid::Uuid::new_v4();

    let company_id = create_company(&app).await;
    let id = create_draft(&app, &company_id, "invoice").await;
    let (status, body) = send(&app, Method::GET, &format!("/api/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (status, _) = send(&app, Method::GET, &format!("/api/documents/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/companies/{missing}/counters/invoice/2026/next"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/documents/{missing}/issue"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seeding_counters() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;
    let seed_uri = format!("/api/companies/{company_id}/counters/quote/2026");

    let (status, body) = send(&app, Method::PUT, &seed_uri, Some(json!({"current_number": 5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_number"], 5);

    let (status, _) = send(&app, Method::PUT, &seed_uri, Some(json!({"current_number": 2}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let other_year = format!("/api/companies/{company_id}/counters/quote/2027");
    let (status, body) =
        send(&app, Method::PUT, &other_year, Some(json!({"current_number": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let id = create_draft(&app, &company_id, "quote").await;
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/documents/{id}/issue"),
        Some(json!({"issue_date": "2026-11-11"})),
    )
    .await;
    assert_eq!(body["data"]["number"], 6);

    let (status, _) = send(&app, Method::PUT, &seed_uri, Some(json!({"current_number": 50}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn credit_note_without_invoice_is_rejected() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/documents",
        Some(json!({
            "company_id": company_id,
            "doc_type": "credit_note",
            "counterparty": null,
            "description": null,
            "corrects_document_id": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/companies/{company_id}/documents?doc_type=credit_note"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn issue_and_void_accept_an_empty_body() {
    let (_dir, app) = app().await;
    let company_id = create_company(&app).await;
    let id = create_draft(&app, &company_id, "invoice").await;

    let (status, body) = send(&app, Method::POST, &format!("/api/documents/{id}/issue"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "issued");
    assert_eq!(body["data"]["number"], 1);
    assert!(body["data"]["issue_date"].is_string());

    let (status, body) = send(&app, Method::POST, &format!("/api/documents/{id}/void"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "void");
}

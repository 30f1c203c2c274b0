//! API Integration Tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use simple_bank::api::{self, routes::{CreateAccountRequest, TransferRequest}, AppState};

mod common;

async fn setup_app() -> Router {
    let store = common::setup_store().await;
    api::build_router(AppState {
        store,
        transfer_timeout: Some(std::time::Duration::from_secs(5)),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-request-id", "api-test")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_account(app: &Router, currency: &str) -> i64 {
    let (status, body) = send(
        app,
        post_json(
            "/accounts",
            &CreateAccountRequest {
                owner: common::random_owner(),
                currency: currency.to_string(),
            },
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "account creation failed: {}", body);
    assert_eq!(body["balance"], 0);
    assert_eq!(body["currency"], currency);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_transfer_e2e() {
    let app = setup_app().await;

    // 1. Open two accounts
    let account_a = create_account(&app, "USD").await;
    let account_b = create_account(&app, "USD").await;

    // 2. Transfer from A to B (A may go negative)
    let (status, body) = send(
        &app,
        post_json(
            "/transfers",
            &TransferRequest {
                from_account_id: account_a,
                to_account_id: account_b,
                amount: 25,
                currency: "USD".to_string(),
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "transfer failed: {}", body);
    assert_eq!(body["transfer"]["amount"], 25);
    assert_eq!(body["from_entry"]["amount"], -25);
    assert_eq!(body["to_entry"]["amount"], 25);
    assert_eq!(body["from_account"]["balance"], -25);
    assert_eq!(body["to_account"]["balance"], 25);

    let transfer_id = body["transfer"]["id"].as_i64().unwrap();
    let from_entry_id = body["from_entry"]["id"].as_i64().unwrap();

    // 3. Read back the transfer
    let (status, body) = send(&app, get(&format!("/transfers/{}", transfer_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from_account_id"], account_a);
    assert_eq!(body["to_account_id"], account_b);

    // 4. Read back the source entry
    let (status, body) = send(&app, get(&format!("/entries/{}", from_entry_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_id"], account_a);

    // 5. Ledger of B
    let (status, body) = send(&app, get(&format!("/accounts/{}/entries", account_b))).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["amount"], 25);

    // 6. Balances
    let (_, body) = send(&app, get(&format!("/accounts/{}", account_a))).await;
    assert_eq!(body["balance"], -25);
    let (_, body) = send(&app, get(&format!("/accounts/{}", account_b))).await;
    assert_eq!(body["balance"], 25);
}

#[tokio::test]
async fn test_transfer_same_account_rejected() {
    let app = setup_app().await;
    let account = create_account(&app, "EUR").await;

    let (status, body) = send(
        &app,
        post_json(
            "/transfers",
            &TransferRequest {
                from_account_id: account,
                to_account_id: account,
                amount: 10,
                currency: "EUR".to_string(),
            },
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "same_account_transfer");
}

#[tokio::test]
async fn test_transfer_currency_mismatch() {
    let app = setup_app().await;
    let account_a = create_account(&app, "USD").await;
    let account_b = create_account(&app, "CAD").await;

    let (status, body) = send(
        &app,
        post_json(
            "/transfers",
            &TransferRequest {
                from_account_id: account_a,
                to_account_id: account_b,
                amount: 10,
                currency: "USD".to_string(),
            },
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "currency_mismatch");

    let (_, body) = send(&app, get(&format!("/accounts/{}", account_a))).await;
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn test_transfer_missing_account() {
    let app = setup_app().await;
    let account = create_account(&app, "USD").await;

    let (status, body) = send(
        &app,
        post_json(
            "/transfers",
            &TransferRequest {
                from_account_id: account,
                to_account_id: i64::MAX,
                amount: 10,
                currency: "USD".to_string(),
            },
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "account_not_found");
}

#[tokio::test]
async fn test_get_missing_rows() {
    let app = setup_app().await;

    let (status, body) = send(&app, get(&format!("/accounts/{}", i64::MAX))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "account_not_found");

    let (status, body) = send(&app, get(&format!("/transfers/{}", i64::MAX))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "transfer_not_found");
}

#[tokio::test]
async fn test_list_accounts_page_size_bounds() {
    let app = setup_app().await;
    create_account(&app, "USD").await;

    let (status, body) = send(&app, get("/accounts?page_id=1&page_size=5")).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body.as_array().unwrap();
    assert!(!accounts.is_empty() && accounts.len() <= 5);

    let (status, body) = send(&app, get("/accounts?page_id=1&page_size=500")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");

    let uri = format!("/accounts?page_id={}&page_size=100", i64::MAX);
    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_delete_account_with_history_conflicts() {
    let app = setup_app().await;
    let account_a = create_account(&app, "USD").await;
    let account_b = create_account(&app, "USD").await;
    let account_c = create_account(&app, "USD").await;

    let (status, _) = send(
        &app,
        post_json(
            "/transfers",
            &TransferRequest {
                from_account_id: account_a,
                to_account_id: account_b,
                amount: 1,
                currency: "USD".to_string(),
            },
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let delete = |id: i64| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/accounts/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&app, delete(account_a)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "foreign_key_violation");

    let (status, _) = send(&app, delete(account_c)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/accounts/{}", account_c))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

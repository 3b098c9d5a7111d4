use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::test_support::{self, TestContext};

async fn send(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("response");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn staff_creates_and_lists_companies() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let (status, created) = send(
        &ctx,
        Method::POST,
        "/api/v1/companies",
        &token,
        Some(json!({ "name": "  Acme GmbH ", "email": "office@acme.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["name"], "Acme GmbH");
    assert_eq!(created["status"], "active");
    assert_eq!(created["email"], "office@acme.test");

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/v1/companies",
        &token,
        Some(json!({ "name": "Dormant AG", "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = send(&ctx, Method::GET, "/api/v1/companies", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let (status, inactive) =
        send(&ctx, Method::GET, "/api/v1/companies?status=inactive", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    let inactive = inactive.as_array().expect("company list");
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0]["name"], "Dormant AG");
}

#[tokio::test]
async fn create_company_rejects_invalid_payloads() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/v1/companies",
        &token,
        Some(json!({ "name": "Acme", "email": "not-an-address" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send(&ctx, Method::POST, "/api/v1/companies", &token, Some(json!({ "name": "   " })))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(test_support::count_rows(ctx.db(), "companies").await, 0);
}

#[tokio::test]
async fn company_users_cannot_manage_companies() {
    let ctx = test_support::setup_test_context().await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let token = ctx.firma_token(&acme.id);

    let (status, _) = send(&ctx, Method::GET, "/api/v1/companies", &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/v1/companies",
        &token,
        Some(json!({ "name": "Shadow Corp" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

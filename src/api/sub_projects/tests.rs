use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{AssignmentLevel, AssignmentStatus};
use crate::test_support;

#[tokio::test]
async fn assignments_use_per_company_status_and_cascade_active_ones() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let project = test_support::insert_project(ctx.db(), "Onboarding").await;
    let sub_project = test_support::insert_sub_project(ctx.db(), &project.id, "Kickoff").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/sub-projects/{}/assignments", sub_project.id),
            Some(&token),
            Some(json!({
                "assignments": [
                    { "companyId": acme.id },
                    { "companyId": globex.id, "status": "inactive" }
                ]
            })),
        ))
        .await
        .expect("assign companies");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["results"][1]["status"], "inactive");

    let autos = body["autoAssignments"].as_array().expect("auto assignments");
    assert_eq!(autos.len(), 1, "inactive rows never cascade: {body}");
    assert_eq!(autos[0]["companyId"], acme.id.as_str());
    assert_eq!(autos[0]["action"], "parent_auto_assigned");
}

#[tokio::test]
async fn assigning_to_unknown_sub_project_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let acme = test_support::insert_company(ctx.db(), "Acme").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/sub-projects/missing/assignments",
            Some(&token),
            Some(json!({ "assignments": [{ "companyId": acme.id }] })),
        ))
        .await
        .expect("assign companies");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_assignment_list_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/sub-projects/any/assignments",
            Some(&token),
            Some(json!({ "assignments": [] })),
        ))
        .await
        .expect("assign companies");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_assignment_list_is_a_bad_request() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/sub-projects/any/assignments",
            Some(&token),
            Some(json!({ "autoAssignParent": true })),
        ))
        .await
        .expect("assign companies");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn repeated_company_is_written_once_with_last_status() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();

    let project = test_support::insert_project(ctx.db(), "Migration").await;
    let sub_project = test_support::insert_sub_project(ctx.db(), &project.id, "Cutover").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/sub-projects/{}/assignments", sub_project.id),
            Some(&token),
            Some(json!({
                "assignments": [
                    { "companyId": acme.id, "status": "active" },
                    { "companyId": format!(" {} ", acme.id), "status": "inactive" }
                ]
            })),
        ))
        .await
        .expect("assign companies");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let results = body["results"].as_array().expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["action"], "created");
    assert_eq!(results[0]["status"], "inactive");
    assert_eq!(body["autoAssignments"].as_array().map(Vec::len), Some(0));
    assert_eq!(test_support::count_rows(ctx.db(), "sub_project_company_assignments").await, 1);
}

#[tokio::test]
async fn listing_reports_completion_flags_and_scopes_company_users() {
    let ctx = test_support::setup_test_context().await;
    let staff_token = ctx.staff_token();

    let project = test_support::insert_project(ctx.db(), "Delivery").await;
    let sub_project = test_support::insert_sub_project(ctx.db(), &project.id, "Wave 1").await;
    let task =
        test_support::insert_task(ctx.db(), &project.id, Some(&sub_project.id), "Install", None)
            .await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;

    for company_id in [&acme.id, &globex.id] {
        test_support::insert_assignment(
            ctx.db(),
            AssignmentLevel::SubProject,
            &sub_project.id,
            company_id,
            AssignmentStatus::Active,
        )
        .await;
    }
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::Task,
        &task.id,
        &acme.id,
        AssignmentStatus::Active,
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/tasks/{}/status", task.id),
            Some(&staff_token),
            Some(json!({ "status": "completed" })),
        ))
        .await
        .expect("complete task");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/sub-projects/{}/assignments", sub_project.id),
            Some(&staff_token),
            None,
        ))
        .await
        .expect("list assignments");
    let body = test_support::read_json(response).await;
    let rows = body.as_array().expect("rows");
    assert_eq!(rows.len(), 2);

    let acme_row = rows.iter().find(|row| row["company"]["id"] == acme.id.as_str()).expect("acme");
    assert_eq!(acme_row["allTasksCompleted"], true);
    assert_eq!(acme_row["consultantReviewRequired"], true);
    assert_eq!(acme_row["completionStatus"], "in_progress");

    let globex_row =
        rows.iter().find(|row| row["company"]["id"] == globex.id.as_str()).expect("globex");
    assert_eq!(globex_row["allTasksCompleted"], false, "no tasks means not completed");

    let firma_token = ctx.firma_token(&globex.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/sub-projects/{}/assignments", sub_project.id),
            Some(&firma_token),
            None,
        ))
        .await
        .expect("list assignments as company");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["company"]["id"], globex.id.as_str());
}

#[tokio::test]
async fn single_assignment_is_company_scoped() {
    let ctx = test_support::setup_test_context().await;

    let project = test_support::insert_project(ctx.db(), "Audit").await;
    let sub_project = test_support::insert_sub_project(ctx.db(), &project.id, "Fieldwork").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::SubProject,
        &sub_project.id,
        &acme.id,
        AssignmentStatus::Active,
    )
    .await;

    let uri = format!("/api/v1/sub-projects/{}/assignments/{}", sub_project.id, acme.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &uri,
            Some(&ctx.firma_token(&acme.id)),
            None,
        ))
        .await
        .expect("get assignment");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["company"]["name"], "Acme");
    assert_eq!(body["completionStatus"], "in_progress");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &uri,
            Some(&ctx.firma_token(&globex.id)),
            None,
        ))
        .await
        .expect("foreign assignment");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let missing = format!("/api/v1/sub-projects/{}/assignments/{}", sub_project.id, globex.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &missing,
            Some(&ctx.staff_token()),
            None,
        ))
        .await
        .expect("missing assignment");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

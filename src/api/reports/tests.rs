use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::db::models::{Company, SubProject};
use crate::db::types::{AssignmentLevel, AssignmentStatus, CompletionStatus, TaskStatus};
use crate::repositories;
use crate::services::completion_pipeline::REPORT_NOTIFICATION_KIND;
use crate::test_support::{self, TestContext};

/// Four tasks assigned to one company: three completed, one of them late.
async fn seed_sub_project(ctx: &TestContext) -> (SubProject, Company) {
    let project = test_support::insert_project(ctx.db(), "Transformation").await;
    let sub_project = test_support::insert_sub_project(ctx.db(), &project.id, "Phase 1").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::SubProject,
        &sub_project.id,
        &acme.id,
        AssignmentStatus::Active,
    )
    .await;

    let plan = [
        ("Late delivery", Some(-2), true),
        ("On time", Some(5), true),
        ("No deadline", None, true),
        ("Open", Some(10), false),
    ];
    for (title, due_in_days, completed) in plan {
        let task = test_support::insert_task(
            ctx.db(),
            &project.id,
            Some(&sub_project.id),
            title,
            due_in_days,
        )
        .await;
        test_support::insert_assignment(
            ctx.db(),
            AssignmentLevel::Task,
            &task.id,
            &acme.id,
            AssignmentStatus::Active,
        )
        .await;
        if completed {
            test_support::set_task_status(ctx.db(), &task.id, TaskStatus::Completed).await;
        }
    }

    (sub_project, acme)
}

async fn post_report(ctx: &TestContext, token: &str, body: Value) -> (StatusCode, Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/consultant/sub-project-reports",
            Some(token),
            Some(body),
        ))
        .await
        .expect("create report");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn report_snapshots_task_statistics_and_closes_assignment() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;

    let (status, body) = post_report(
        &ctx,
        &token,
        json!({
            "subProjectId": sub_project.id,
            "companyId": acme.id,
            "overallRating": 8,
            "qualityScore": 7,
            "strengths": "Fast onboarding"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["success"], true);
    let report = &body["report"];
    assert_eq!(report["taskCompletionRate"], 75);
    assert_eq!(report["totalTasks"], 4);
    assert_eq!(report["completedTasks"], 3);
    assert_eq!(report["delayedTasks"], 1);
    assert_eq!(report["consultantEmail"], test_support::STAFF_EMAIL);

    let view =
        repositories::assignments::find_sub_project_view(ctx.db(), &sub_project.id, &acme.id)
            .await
            .expect("assignment view")
            .expect("assignment exists");
    assert_eq!(view.completion_status, CompletionStatus::Reported);
    assert!(!view.consultant_review_required);

    let notifications =
        repositories::notifications::list_for_company(ctx.db(), &acme.id, true, 10)
            .await
            .expect("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, REPORT_NOTIFICATION_KIND);
    assert_eq!(notifications[0].related_entity_id.as_deref(), Some(sub_project.id.as_str()));
}

#[tokio::test]
async fn report_snapshot_ignores_later_task_updates() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;

    let (status, _) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 7 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let open_task: String =
        sqlx::query_scalar("SELECT id FROM tasks WHERE sub_project_id = $1 AND title = 'Open'")
            .bind(&sub_project.id)
            .fetch_one(ctx.db())
            .await
            .expect("open task");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/tasks/{open_task}/status"),
            Some(&token),
            Some(json!({ "status": "completed" })),
        ))
        .await
        .expect("complete open task");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!(
                "/api/v1/consultant/sub-project-reports?subProjectId={}&companyId={}",
                sub_project.id, acme.id
            ),
            Some(&token),
            None,
        ))
        .await
        .expect("list reports");
    let body = test_support::read_json(response).await;
    let reports = body.as_array().expect("report list");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["taskCompletionRate"], 75);
    assert_eq!(reports[0]["completedTasks"], 3);
    assert_eq!(reports[0]["totalTasks"], 4);
}

#[tokio::test]
async fn second_report_for_the_same_pair_conflicts() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;
    let body = json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 6 });

    let (status, _) = post_report(&ctx, &token, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = post_report(&ctx, &token, body).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {response}");
    assert_eq!(test_support::count_rows(ctx.db(), "sub_project_completion_reports").await, 1);
}

#[tokio::test]
async fn report_requires_rating_and_an_active_assignment() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;
    let stranger = test_support::insert_company(ctx.db(), "Stranger").await;

    let (status, body) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");

    let (status, body) =
        post_report(&ctx, &token, json!({ "companyId": acme.id, "overallRating": 7 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["status"], 400);

    let (status, _) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 12 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": stranger.id, "overallRating": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let firma_token = ctx.firma_token(&acme.id);
    let (status, _) = post_report(
        &ctx,
        &firma_token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn company_users_only_list_their_own_reports() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;
    let (status, _) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 9 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let globex = test_support::insert_company(ctx.db(), "Globex").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/consultant/sub-project-reports",
            Some(&ctx.firma_token(&acme.id)),
            None,
        ))
        .await
        .expect("list own reports");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/consultant/sub-project-reports",
            Some(&ctx.firma_token(&globex.id)),
            None,
        ))
        .await
        .expect("list other company reports");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/consultant/sub-project-reports?companyId={}", acme.id),
            Some(&ctx.firma_token(&globex.id)),
            None,
        ))
        .await
        .expect("list foreign reports");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn feedback_is_editable_and_deletion_is_admin_only() {
    let ctx = test_support::setup_test_context().await;
    let token = ctx.staff_token();
    let (sub_project, acme) = seed_sub_project(&ctx).await;
    let (_, created) = post_report(
        &ctx,
        &token,
        json!({ "subProjectId": sub_project.id, "companyId": acme.id, "overallRating": 4 }),
    )
    .await;
    let report_id = created["report"]["id"].as_str().expect("report id").to_string();
    let report_uri = format!("/api/v1/consultant/sub-project-reports/{report_id}");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &report_uri,
            Some(&token),
            Some(json!({ "overallRating": 6, "recommendations": "Add weekly syncs" })),
        ))
        .await
        .expect("update report");
    let body = test_support::read_json(response).await;
    assert_eq!(body["overallRating"], 6);
    assert_eq!(body["recommendations"], "Add weekly syncs");
    assert_eq!(body["taskCompletionRate"], 75, "snapshot is frozen");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &report_uri, Some(&token), None))
        .await
        .expect("delete as consultant");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &report_uri,
            Some(&ctx.admin_token()),
            None,
        ))
        .await
        .expect("delete as admin");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &report_uri,
            Some(&ctx.admin_token()),
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

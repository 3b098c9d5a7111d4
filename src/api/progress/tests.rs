use axum::http::{Method, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::db::types::{AssignmentLevel, AssignmentStatus, TaskCompletionStatus, TaskStatus};
use crate::services::completion_pipeline::{self, SubmitCompletion};
use crate::test_support::{self, TestContext};

async fn get_json(ctx: &TestContext, uri: &str, token: &str) -> (StatusCode, Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, uri, Some(token), None))
        .await
        .expect("response");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

async fn approved_completion(
    ctx: &TestContext,
    task_id: &str,
    company_id: &str,
    hours: f64,
    quality: f64,
) {
    let completion = completion_pipeline::submit_completion(
        ctx.db(),
        SubmitCompletion {
            task_id,
            company_id,
            completed_by: "owner@company.test",
            note: None,
            actual_hours: Some(hours),
        },
    )
    .await
    .expect("submit completion");
    completion_pipeline::review_completion(
        ctx.db(),
        &completion.id,
        TaskCompletionStatus::Approved,
        Some(quality),
        test_support::STAFF_EMAIL,
    )
    .await
    .expect("approve completion");
}

#[tokio::test]
async fn empty_company_progress_is_all_zero() {
    let ctx = test_support::setup_test_context().await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;

    let (status, body) = get_json(&ctx, "/api/v1/firma/progress", &ctx.firma_token(&acme.id)).await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["companyId"], acme.id.as_str());
    assert_eq!(body["timeRangeDays"], 30);
    assert_eq!(body["overview"]["totalTasks"], 0);
    assert_eq!(body["overview"]["completionRate"], 0);
    assert_eq!(body["overview"]["averageQualityScore"], 0.0);
    assert_eq!(body["overview"]["totalHours"], 0.0);
    assert_eq!(body["statusDistribution"]["pending"], 0);

    let trend = body["monthlyTrend"].as_array().expect("monthly trend");
    assert_eq!(trend.len(), 6);
    assert!(trend.iter().all(|point| point["count"] == 0));
}

#[tokio::test]
async fn company_progress_aggregates_assigned_work() {
    let ctx = test_support::setup_test_context().await;

    let project = test_support::insert_project(ctx.db(), "Rollout").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::Project,
        &project.id,
        &acme.id,
        AssignmentStatus::Active,
    )
    .await;

    let mut task_ids = Vec::new();
    for title in ["Plan", "Build", "Test", "Ship"] {
        let task = test_support::insert_task(ctx.db(), &project.id, None, title, None).await;
        test_support::insert_assignment(
            ctx.db(),
            AssignmentLevel::Task,
            &task.id,
            &acme.id,
            AssignmentStatus::Active,
        )
        .await;
        task_ids.push(task.id);
    }
    let unassigned = test_support::insert_task(ctx.db(), &project.id, None, "Other", None).await;
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::Task,
        &unassigned.id,
        &globex.id,
        AssignmentStatus::Active,
    )
    .await;

    test_support::set_task_status(ctx.db(), &task_ids[0], TaskStatus::Completed).await;
    test_support::set_task_status(ctx.db(), &task_ids[1], TaskStatus::InProgress).await;
    approved_completion(&ctx, &task_ids[0], &acme.id, 5.0, 8.0).await;
    approved_completion(&ctx, &task_ids[1], &acme.id, 2.5, 7.0).await;
    completion_pipeline::submit_completion(
        ctx.db(),
        SubmitCompletion {
            task_id: &task_ids[2],
            company_id: &acme.id,
            completed_by: "owner@acme.test",
            note: None,
            actual_hours: None,
        },
    )
    .await
    .expect("pending completion");

    let (status, body) = get_json(
        &ctx,
        &format!("/api/v1/firma/progress?companyId={}&timeRange=90", acme.id),
        &ctx.staff_token(),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["timeRangeDays"], 90);
    let overview = &body["overview"];
    assert_eq!(overview["totalProjects"], 1);
    assert_eq!(overview["activeProjects"], 1);
    assert_eq!(overview["totalTasks"], 4);
    assert_eq!(overview["completedTasks"], 1);
    assert_eq!(overview["inProgressTasks"], 1);
    assert_eq!(overview["completionRate"], 25);
    assert_eq!(overview["averageQualityScore"], 7.5);
    assert_eq!(overview["totalHours"], 7.5);
    assert_eq!(overview["pendingApprovals"], 1);

    assert_eq!(body["statusDistribution"]["pending"], 2);
    assert_eq!(body["projects"][0]["projectId"], project.id.as_str());
    assert_eq!(body["projects"][0]["completionRate"], 25);

    assert_eq!(body["monthlyTrend"][5]["count"], 2);
}

async fn backdate(ctx: &TestContext, table: &str, column: &str, key: &str, id: &str, days: i32) {
    sqlx::query(&format!(
        "UPDATE {table} SET {column} = {column} - make_interval(days => $2) WHERE {key} = $1"
    ))
    .bind(id)
    .bind(days)
    .execute(ctx.db())
    .await
    .expect("backdate rows");
}

async fn assigned_task(
    ctx: &TestContext,
    project_id: &str,
    company_id: &str,
    title: &str,
) -> String {
    let task = test_support::insert_task(ctx.db(), project_id, None, title, None).await;
    test_support::insert_assignment(
        ctx.db(),
        AssignmentLevel::Task,
        &task.id,
        company_id,
        AssignmentStatus::Active,
    )
    .await;
    task.id
}

#[tokio::test]
async fn time_window_excludes_older_activity_but_not_backlog() {
    let ctx = test_support::setup_test_context().await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;

    let legacy = test_support::insert_project(ctx.db(), "Legacy").await;
    let current = test_support::insert_project(ctx.db(), "Current").await;
    for project_id in [&legacy.id, &current.id] {
        test_support::insert_assignment(
            ctx.db(),
            AssignmentLevel::Project,
            project_id,
            &acme.id,
            AssignmentStatus::Active,
        )
        .await;
    }

    let old_done = assigned_task(&ctx, &legacy.id, &acme.id, "Archive").await;
    let old_waiting = assigned_task(&ctx, &legacy.id, &acme.id, "Handover").await;
    assigned_task(&ctx, &current.id, &acme.id, "Kickoff").await;

    test_support::set_task_status(ctx.db(), &old_done, TaskStatus::Completed).await;
    approved_completion(&ctx, &old_done, &acme.id, 4.0, 9.0).await;
    completion_pipeline::submit_completion(
        ctx.db(),
        SubmitCompletion {
            task_id: &old_waiting,
            company_id: &acme.id,
            completed_by: "owner@acme.test",
            note: None,
            actual_hours: Some(1.0),
        },
    )
    .await
    .expect("pending completion");

    backdate(&ctx, "projects", "created_at", "id", &legacy.id, 60).await;
    backdate(&ctx, "tasks", "created_at", "project_id", &legacy.id, 60).await;
    for task_id in [&old_done, &old_waiting] {
        backdate(&ctx, "task_completions", "completion_date", "task_id", task_id, 60).await;
    }

    let token = ctx.firma_token(&acme.id);
    let (status, recent) = get_json(&ctx, "/api/v1/firma/progress?timeRange=30", &token).await;
    assert_eq!(status, StatusCode::OK, "response: {recent}");
    let overview = &recent["overview"];
    assert_eq!(overview["totalProjects"], 1);
    assert_eq!(overview["totalTasks"], 1);
    assert_eq!(overview["completedTasks"], 0);
    assert_eq!(overview["completionRate"], 0);
    assert_eq!(overview["totalHours"], 0.0);
    assert_eq!(overview["averageQualityScore"], 0.0);
    assert_eq!(overview["pendingApprovals"], 1);
    assert_eq!(recent["statusDistribution"]["completed"], 1);
    assert_eq!(recent["statusDistribution"]["pending"], 2);

    let (status, wide) = get_json(&ctx, "/api/v1/firma/progress?timeRange=90", &token).await;
    assert_eq!(status, StatusCode::OK, "response: {wide}");
    let overview = &wide["overview"];
    assert_eq!(overview["totalProjects"], 2);
    assert_eq!(overview["totalTasks"], 3);
    assert_eq!(overview["completedTasks"], 1);
    assert_eq!(overview["completionRate"], 33);
    assert_eq!(overview["totalHours"], 4.0);
    assert_eq!(overview["averageQualityScore"], 9.0);
    assert_eq!(overview["pendingApprovals"], 1);

    let (status, dashboard) =
        get_json(&ctx, "/api/v1/progress/dashboard?timeRange=30", &ctx.staff_token()).await;
    assert_eq!(status, StatusCode::OK, "response: {dashboard}");
    assert_eq!(dashboard["overview"]["totalTasks"], 1);
    assert_eq!(dashboard["overview"]["pendingApprovals"], 1);
    assert_eq!(dashboard["statusDistribution"]["completed"], 1);
}

#[tokio::test]
async fn company_progress_is_pinned_and_validated() {
    let ctx = test_support::setup_test_context().await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;

    let (status, _) = get_json(
        &ctx,
        &format!("/api/v1/firma/progress?companyId={}", globex.id),
        &ctx.firma_token(&acme.id),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get_json(&ctx, "/api/v1/firma/progress", &ctx.staff_token()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "companyId is required");

    let (status, _) =
        get_json(&ctx, "/api/v1/firma/progress?timeRange=soon", &ctx.firma_token(&acme.id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&ctx, "/api/v1/firma/progress", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_ranks_companies_for_staff_only() {
    let ctx = test_support::setup_test_context().await;

    let project = test_support::insert_project(ctx.db(), "Platform").await;
    let acme = test_support::insert_company(ctx.db(), "Acme").await;
    let globex = test_support::insert_company(ctx.db(), "Globex").await;
    let task = test_support::insert_task(ctx.db(), &project.id, None, "Deploy", None).await;
    for company_id in [&acme.id, &globex.id] {
        test_support::insert_assignment(
            ctx.db(),
            AssignmentLevel::Task,
            &task.id,
            company_id,
            AssignmentStatus::Active,
        )
        .await;
    }
    test_support::set_task_status(ctx.db(), &task.id, TaskStatus::Completed).await;

    let (status, body) = get_json(&ctx, "/api/v1/progress/dashboard", &ctx.staff_token()).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["overview"]["totalCompanies"], 2);
    assert_eq!(body["overview"]["totalProjects"], 1);
    assert_eq!(body["overview"]["completionRate"], 100);
    assert_eq!(body["statusDistribution"]["completed"], 1);
    assert_eq!(body["monthlyTrend"].as_array().map(Vec::len), Some(12));
    assert_eq!(body["monthlyTrend"][11]["count"], 1);
    assert_eq!(body["companies"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["companies"][0]["completionRate"], 100);

    let (status, _) =
        get_json(&ctx, "/api/v1/progress/dashboard", &ctx.firma_token(&acme.id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

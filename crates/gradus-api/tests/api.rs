use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use gradus_api::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, AppState, TokenBucketLimiter, build_router};
use gradus_config::{AlertConfig, RateLimitConfig};
use gradus_service::ThesisService;
use gradus_store::SqliteStore;

fn app_with_limits(rate_limit: RateLimitConfig) -> (TempDir, Router) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open(temp.path()).expect("open store");
    let service = ThesisService::new(store, AlertConfig::default());
    let state = AppState::new(service, Arc::new(TokenBucketLimiter::new(rate_limit)));
    (temp, build_router(state))
}

fn test_app() -> (TempDir, Router) {
    app_with_limits(RateLimitConfig::default())
}

fn request(
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, id)
            .header(ACTOR_ROLE_HEADER, role);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, body)
}

async fn create_user(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "role": role,
                "program": "Computer Science",
                "cohort": "2024",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("user id").to_owned()
}

// Advisor + student + one assigned thesis, all through the HTTP surface.
async fn assigned_thesis(app: &Router) -> (String, String, String) {
    let advisor_id = create_user(app, "Advisor One", "advisor@uni.edu", "advisor").await;
    let student_id = create_user(app, "Student One", "student@uni.edu", "student").await;

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/theses/assign",
            Some((&advisor_id, "advisor")),
            Some(json!({
                "student_email": "student@uni.edu",
                "title": "Compiler Optimization Study",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let thesis_id = body["id"].as_str().expect("thesis id").to_owned();

    (advisor_id, student_id, thesis_id)
}

async fn chapter_ids(app: &Router, student_id: &str) -> Vec<String> {
    let (status, body) = send(
        app,
        request("GET", "/api/theses/mine", Some((student_id, "student")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["chapters"]
        .as_array()
        .expect("chapters array")
        .iter()
        .map(|entry| entry["chapter"]["id"].as_str().expect("chapter id").to_owned())
        .collect()
}

async fn fill_chapters(app: &Router, student_id: &str, chapters: &[String]) {
    for (chapter_id, pct) in chapters.iter().zip([100, 80, 60, 30, 0]) {
        let (status, _) = send(
            app,
            request(
                "PATCH",
                &format!("/api/chapters/{chapter_id}/percentage"),
                Some((student_id, "student")),
                Some(json!({ "percentage": pct })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn health_is_open() {
    let (_temp, app) = test_app();

    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn identity_is_required_for_protected_routes() {
    let (_temp, app) = test_app();

    let (status, body) = send(&app, request("GET", "/api/theses/mine", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("x-actor-id")
    );

    let (status, _) = send(
        &app,
        request("GET", "/api/theses/mine", Some(("u1", "registrar")), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn assignment_builds_the_default_template() {
    let (_temp, app) = test_app();
    let (advisor_id, _student_id, thesis_id) = assigned_thesis(&app).await;

    let (status, body) = send(
        &app,
        request(
            "GET",
            &format!("/api/theses/{thesis_id}"),
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["thesis"]["overall_percentage"], 0);
    assert_eq!(body["thesis"]["state"], "in_progress");

    let chapters = body["chapters"].as_array().expect("chapters");
    assert_eq!(chapters.len(), 5);
    assert_eq!(chapters[0]["chapter"]["title"], "Introduction");
    assert_eq!(
        chapters[4]["chapter"]["title"],
        "Discussion and Conclusions"
    );

    let milestones = body["milestones"].as_array().expect("milestones");
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0]["title"], "Proposal submission");
}

#[tokio::test]
async fn chapter_updates_drive_the_rollup_end_to_end() {
    let (_temp, app) = test_app();
    let (advisor_id, student_id, thesis_id) = assigned_thesis(&app).await;

    let chapters = chapter_ids(&app, &student_id).await;
    fill_chapters(&app, &student_id, &chapters).await;

    let (status, body) = send(
        &app,
        request(
            "GET",
            &format!("/api/theses/{thesis_id}"),
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["thesis"]["overall_percentage"], 54);

    let (status, feed) = send(
        &app,
        request(
            "GET",
            &format!("/api/theses/{thesis_id}/activity?kind=chapter_update&limit=2"),
            Some((&student_id, "student")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["total"], 5);
    assert_eq!(feed["items"].as_array().expect("items").len(), 2);
    assert_eq!(feed["limit"], 2);

    let (status, report) = send(
        &app,
        request(
            "GET",
            &format!("/api/theses/{thesis_id}/activity/report"),
            Some((&student_id, "student")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["total"], 5);
    assert_eq!(report["daily"].as_array().expect("daily").len(), 30);
}

#[tokio::test]
async fn advisor_override_adjusts_the_rollup_and_leaves_a_trail() {
    let (_temp, app) = test_app();
    let (advisor_id, student_id, thesis_id) = assigned_thesis(&app).await;
    let chapters = chapter_ids(&app, &student_id).await;
    fill_chapters(&app, &student_id, &chapters).await;

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/theses/{thesis_id}/percentage"),
            Some((&student_id, "student")),
            Some(json!({ "percentage": 40, "justification": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/theses/{thesis_id}/percentage"),
            Some((&advisor_id, "advisor")),
            Some(json!({
                "percentage": 40,
                "justification": "Adjusted for field work delays",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_percentage"], 40);

    let (status, detail) = send(
        &app,
        request(
            "GET",
            "/api/theses/mine",
            Some((&student_id, "student")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first_comments = detail["chapters"][0]["comments"]
        .as_array()
        .expect("comments");
    assert_eq!(first_comments.len(), 1);
    let note = first_comments[0]["body"].as_str().expect("comment body");
    assert!(note.contains("Previous percentage: 54%"));
    assert!(note.contains("New percentage: 40%"));
    assert!(note.contains("Adjusted for field work delays"));

    let (status, feed) = send(
        &app,
        request(
            "GET",
            &format!("/api/theses/{thesis_id}/activity?kind=percentage_update"),
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["total"], 1);
}

#[tokio::test]
async fn validation_conflict_and_missing_map_to_their_statuses() {
    let (_temp, app) = test_app();
    let (advisor_id, _student_id, _thesis_id) = assigned_thesis(&app).await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/theses/assign",
            Some((&advisor_id, "advisor")),
            Some(json!({ "student_email": "student@uni.edu", "title": "abc" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "name": "Duplicate",
                "email": "student@uni.edu",
                "role": "student",
                "program": "Computer Science",
                "cohort": "2024",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/api/theses/missing",
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn milestones_flow_over_http() {
    let (_temp, app) = test_app();
    let (advisor_id, student_id, thesis_id) = assigned_thesis(&app).await;

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/api/milestones",
            Some((&advisor_id, "advisor")),
            Some(json!({
                "thesis_id": thesis_id,
                "title": "Literature review",
                "due_at": "2026-10-01T12:00:00Z",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["due_at"].is_i64());
    let milestone_id = created["id"].as_str().expect("milestone id").to_owned();

    let (status, completed) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/milestones/{milestone_id}/complete"),
            Some((&student_id, "student")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["completed"], true);
    assert!(completed["completed_at"].is_i64());

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/milestones",
            Some((&advisor_id, "advisor")),
            Some(json!({
                "thesis_id": thesis_id,
                "title": "Defense",
                "due_at": "next Tuesday",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/milestones/{milestone_id}"),
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn comments_and_approval_over_http() {
    let (_temp, app) = test_app();
    let (advisor_id, student_id, _thesis_id) = assigned_thesis(&app).await;
    let chapters = chapter_ids(&app, &student_id).await;

    let (status, comment) = send(
        &app,
        request(
            "POST",
            "/api/comments",
            Some((&advisor_id, "advisor")),
            Some(json!({
                "chapter_id": chapters[1],
                "body": "Please expand the related work section.",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author_id"].as_str(), Some(advisor_id.as_str()));

    let (status, approved) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/chapters/{}/approve", chapters[0]),
            Some((&advisor_id, "advisor")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["approved"], true);
    assert!(approved["approved_at"].is_i64());
}

#[tokio::test]
async fn ranking_is_public_and_filterable() {
    let (_temp, app) = test_app();
    let advisor_id = create_user(&app, "Advisor One", "advisor@uni.edu", "advisor").await;
    for (name, email, title) in [
        ("Ana Torres", "ana@uni.edu", "Graph Databases"),
        ("Bruno Silva", "bruno@uni.edu", "Query Planners"),
    ] {
        create_user(&app, name, email, "student").await;
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/theses/assign",
                Some((&advisor_id, "advisor")),
                Some(json!({ "student_email": email, "title": title })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, view) = send(&app, request("GET", "/api/ranking", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = view["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    // Both sit at 0%, so names break the tie.
    assert_eq!(entries[0]["student_name"], "Ana Torres");
    assert_eq!(view["statistics"]["participants"], 2);
    assert_eq!(view["programs"], json!(["Computer Science"]));

    let (status, filtered) = send(
        &app,
        request("GET", "/api/ranking?search=bruno", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["entries"].as_array().expect("entries").len(), 1);
    assert_eq!(filtered["entries"][0]["student_name"], "Bruno Silva");
}

#[tokio::test]
async fn files_endpoint_is_a_stub() {
    let (_temp, app) = test_app();

    let (status, body) = send(
        &app,
        request("POST", "/api/files", None, Some(json!({ "name": "draft.pdf" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(body["error"].as_str().expect("error").contains("not implemented"));
}

#[tokio::test]
async fn rate_limit_trips_with_retry_after() {
    let (_temp, app) = app_with_limits(RateLimitConfig {
        enabled: true,
        capacity: 2.0,
        refill_per_sec: 0.001,
    });

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            request("GET", "/health", Some(("rl-probe", "student")), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/health",
            Some(("rl-probe", "student")),
            None,
        ))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .expect("retry-after header")
        .to_str()
        .expect("ascii header")
        .parse::<u64>()
        .expect("whole seconds");
    assert!(retry_after >= 1);
}

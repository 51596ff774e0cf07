use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum::routing::put;
use dailytrackr::api::activities::{ActivitiesApi, CreateActivityRequest};
use dailytrackr::api::ai::AiApi;
use dailytrackr::api::auth::AuthApi;
use dailytrackr::api::habits::{CreateHabitRequest, HabitStatus, HabitsApi, UpdateHabitRequest};
use dailytrackr::api::{ApiClient, ApiError};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct Recorded {
    hits: Arc<AtomicU64>,
    last_auth: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
}

impl Recorded {
    fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

fn sample_activity_json(id: i64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user_id": 1,
        "title": title,
        "start_time": "2025-01-01T06:00:00Z",
        "duration_mins": 120,
        "cost": 15000,
        "photo_url": "",
        "note": "",
        "created_at": "2025-01-01T06:00:00Z",
        "updated_at": "2025-01-01T06:00:00Z"
    })
}

async fn record_create_activity(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    recorded.hits.fetch_add(1, Ordering::SeqCst);
    *recorded.last_auth.lock().await = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let title = body
        .get("title")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string();
    *recorded.last_body.lock().await = Some(body);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Activity created",
            "data": sample_activity_json(42, &title)
        })),
    )
}

async fn record_login(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(_body): Json<serde_json::Value>,
) -> impl IntoResponse {
    recorded.hits.fetch_add(1, Ordering::SeqCst);
    *recorded.last_auth.lock().await = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    Json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": "issued-jwt",
            "user": {
                "id": 1,
                "username": "tester",
                "email": "tester@example.com",
                "bio": "",
                "profile_photo": "",
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            }
        }
    }))
}

async fn html_error_page() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html("<html><body>upstream down</body></html>"),
    )
}

async fn habit_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "success": false, "message": "Habit not found" })),
    )
}

/// Stub gateway serving the already-rewritten proxy paths, the way the
/// real reverse proxy mounts them.
async fn spawn_gateway(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn create_activity_posts_once_to_the_rewritten_path() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route(
            "/api/activities/api/v1/activities",
            post(record_create_activity),
        )
        .with_state(recorded.clone());
    let base_url = spawn_gateway(router).await;

    let api = ActivitiesApi::with_client(ApiClient::with_base_url(base_url));
    let request = CreateActivityRequest {
        title: "Belajar Rust".to_string(),
        start_time: "2025-01-01T06:00:00Z".to_string(),
        duration_mins: 120,
        cost: Some(15000),
        note: String::new(),
    };
    let activity = api.create("jwt-abc", &request).await.expect("create");

    assert_eq!(recorded.hits(), 1);
    assert_eq!(activity.id, 42);
    assert_eq!(activity.title, "Belajar Rust");

    let auth = recorded.last_auth.lock().await.clone();
    assert_eq!(auth.as_deref(), Some("Bearer jwt-abc"));

    let body = recorded.last_body.lock().await.clone().unwrap();
    assert_eq!(body["title"], "Belajar Rust");
    assert_eq!(body["duration_mins"], 120);
    assert_eq!(body["cost"], 15000);
    // Empty optional fields stay off the wire entirely.
    assert!(body.get("note").is_none());
}

#[tokio::test]
async fn login_goes_to_the_gateway_root_without_credentials() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/auth/login", post(record_login))
        .with_state(recorded.clone());
    let base_url = spawn_gateway(router).await;

    let api = AuthApi::with_client(ApiClient::with_base_url(base_url));
    let payload = api.login("tester@example.com", "hunter22").await.expect("login");

    assert_eq!(recorded.hits(), 1);
    assert_eq!(payload.token, "issued-jwt");
    assert_eq!(payload.user.username, "tester");

    // No token yet, so no Authorization header may be attached.
    let auth = recorded.last_auth.lock().await.clone();
    assert!(auth.is_none());
}

#[tokio::test]
async fn html_error_page_becomes_a_synthesized_failure() {
    let router = Router::new().route("/api/habits/api/v1/habits", get(html_error_page));
    let base_url = spawn_gateway(router).await;

    let api = HabitsApi::with_client(ApiClient::with_base_url(base_url));
    let err = api.list("jwt-abc", false).await.unwrap_err();

    match err {
        ApiError::RequestFailed { status, message, body } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service not available (503)");
            let body = body.expect("synthesized body");
            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().contains("upstream down"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn json_error_envelope_message_is_surfaced() {
    let router = Router::new().route("/api/habits/api/v1/habits/999", get(habit_not_found));
    let base_url = spawn_gateway(router).await;

    let api = HabitsApi::with_client(ApiClient::with_base_url(base_url));
    let err = api.get("jwt-abc", 999).await.unwrap_err();

    assert_eq!(err.status(), 404);
    match err {
        ApiError::RequestFailed { message, .. } => assert_eq!(message, "Habit not found"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_gateway_is_network_unavailable_with_status_zero() {
    let api = ActivitiesApi::with_client(ApiClient::with_base_url(unused_base_url()));
    let err = api.list("jwt-abc", 1, 20).await.unwrap_err();

    assert!(err.is_network_unavailable());
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn invalid_habit_dates_never_reach_the_gateway() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/api/habits/api/v1/habits", post(record_create_activity))
        .with_state(recorded.clone());
    let base_url = spawn_gateway(router).await;

    let api = HabitsApi::with_client(ApiClient::with_base_url(base_url));
    let request = CreateHabitRequest {
        title: "Morning Exercise".to_string(),
        start_date: "2025-03-31".to_string(),
        end_date: "2025-03-01".to_string(),
        reminder_time: String::new(),
    };
    let err = api.create("jwt-abc", &request).await.unwrap_err();

    match err {
        ApiError::Validation(message) => {
            assert_eq!(message, "End date must be after the start date");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(recorded.hits(), 0);
}

#[tokio::test]
async fn habit_update_logs_and_stats_use_the_habits_segment() {
    async fn updated_habit(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
        Json(serde_json::json!({
            "success": true,
            "message": "Habit updated",
            "data": {
                "id": 7,
                "user_id": 1,
                "title": body["title"],
                "start_date": "2025-03-01T00:00:00Z",
                "end_date": "2025-03-31T00:00:00Z",
                "reminder_time": "06:30",
                "created_at": "2025-03-01T00:00:00Z",
                "updated_at": "2025-03-05T00:00:00Z"
            }
        }))
    }

    async fn habit_logs() -> impl IntoResponse {
        Json(serde_json::json!({
            "success": true,
            "message": "",
            "data": [{
                "id": 1,
                "habit_id": 7,
                "date": "2025-03-02T00:00:00Z",
                "status": "SKIPPED",
                "photo_url": "",
                "note": "travel day",
                "created_at": "2025-03-02T00:00:00Z",
                "updated_at": "2025-03-02T00:00:00Z"
            }]
        }))
    }

    async fn habit_stats() -> impl IntoResponse {
        Json(serde_json::json!({
            "success": true,
            "message": "",
            "data": {
                "total_days": 31,
                "completed_days": 4,
                "skipped_days": 1,
                "failed_days": 0,
                "success_rate": 80.0,
                "current_streak": 2,
                "longest_streak": 3
            }
        }))
    }

    let router = Router::new()
        .route("/api/habits/api/v1/habits/7", put(updated_habit))
        .route("/api/habits/api/v1/habits/7/logs", get(habit_logs))
        .route("/api/habits/api/v1/habits/7/stats", get(habit_stats));
    let base_url = spawn_gateway(router).await;

    let api = HabitsApi::with_client(ApiClient::with_base_url(base_url));

    let request = UpdateHabitRequest {
        title: Some("Evening Exercise".to_string()),
        reminder_time: Some("06:30".to_string()),
    };
    let habit = api.update("jwt-abc", 7, &request).await.expect("update");
    assert_eq!(habit.title, "Evening Exercise");
    assert_eq!(habit.reminder_time, "06:30");

    let logs = api.list_logs("jwt-abc", 7).await.expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, HabitStatus::Skipped);
    assert_eq!(logs[0].note, "travel day");

    let stats = api.stats("jwt-abc", 7).await.expect("stats");
    assert_eq!(stats.completed_days, 4);
    assert_eq!(stats.current_streak, 2);
}

#[tokio::test]
async fn daily_summary_is_a_bodyless_post_to_the_ai_segment() {
    async fn generated_summary(headers: HeaderMap) -> impl IntoResponse {
        // The generation endpoints take no body; anything else is a bug
        // in the caller.
        let length = headers
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        if length > 0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "success": false, "message": "unexpected body" })),
            );
        }
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Summary generated",
                "data": {
                    "id": 3,
                    "user_id": 1,
                    "date": "2025-07-16T00:00:00Z",
                    "summary_text": "A productive day.",
                    "ai_generated": true,
                    "created_at": "2025-07-16T21:00:00Z",
                    "updated_at": "2025-07-16T21:00:00Z"
                }
            })),
        )
    }

    let router = Router::new().route("/api/ai/api/v1/ai/daily-summary", post(generated_summary));
    let base_url = spawn_gateway(router).await;

    let api = AiApi::with_client(ApiClient::with_base_url(base_url));
    let summary = api.daily_summary("jwt-abc", None).await.expect("summary");

    assert_eq!(summary.summary_text, "A productive day.");
    assert!(summary.ai_generated);
}

#[tokio::test]
async fn successful_envelope_without_data_still_fails() {
    async fn empty_success() -> impl IntoResponse {
        Json(serde_json::json!({ "success": true, "message": "ok" }))
    }

    let router = Router::new().route("/api/activities/api/v1/activities/7", get(empty_success));
    let base_url = spawn_gateway(router).await;

    let api = ActivitiesApi::with_client(ApiClient::with_base_url(base_url));
    let err = api.get("jwt-abc", 7).await.unwrap_err();

    match err {
        ApiError::RequestFailed { status, message, .. } => {
            assert_eq!(status, 200);
            assert_eq!(message, "ok");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

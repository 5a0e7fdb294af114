#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use syllabi::api::router;
use syllabi::auth::Claims;
use syllabi::config::AppConfig;
use syllabi::db;
use syllabi::state::AppState;

pub const SECRET: &str = "test-secret";

pub const DANA: i64 = 1;
pub const YOSSI: i64 = 2;
pub const RIVKA: i64 = 3;

pub async fn setup_state() -> AppState {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db");
    seed(&pool).await;

    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        jwt_secret: SECRET.to_string(),
    };
    AppState::new(pool, config)
}

async fn seed(pool: &SqlitePool) {
    sqlx::query(
        r#"
        INSERT INTO users (name, email, role, created_at) VALUES
            ('Dana Levi', 'dana@example.ac.il', 'Instructor', '2025-01-01T00:00:00+00:00'),
            ('Yossi Cohen', 'yossi@example.ac.il', 'Instructor', '2025-01-01T00:00:00+00:00'),
            ('Rivka Katz', 'rivka@example.ac.il', 'Manager', '2025-01-01T00:00:00+00:00')
        "#,
    )
    .execute(pool)
    .await
    .expect("Failed to insert users");

    sqlx::query("INSERT INTO departments (name) VALUES ('Mathematics'), ('Physics')")
        .execute(pool)
        .await
        .expect("Failed to insert departments");

    sqlx::query("INSERT INTO courses (name, department_id) VALUES ('Calculus I', 1), ('Mechanics', 2)")
        .execute(pool)
        .await
        .expect("Failed to insert courses");
}

pub fn app(state: &AppState) -> Router {
    router(state.clone())
}

pub fn token(user_id: i64) -> String {
    let now = Utc::now().timestamp();
    encode(
        &Header::default(),
        &Claims {
            sub: user_id,
            iat: now,
            exp: now + 3600,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

pub fn get(uri: &str, user_id: i64) -> Request<Body> {
    request("GET", uri, user_id, None)
}

pub fn delete(uri: &str, user_id: i64) -> Request<Body> {
    request("DELETE", uri, user_id, None)
}

pub fn post_form(uri: &str, user_id: i64, body: &str) -> Request<Body> {
    request("POST", uri, user_id, Some(body))
}

fn request(method: &str, uri: &str, user_id: i64, form: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", format!("jwt={}", token(user_id)));

    match form {
        Some(body) => builder
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("request failed")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// Status stored for a syllabus record.
pub async fn stored_status(state: &AppState, id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM syllabi WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await
        .expect("Failed to read status")
}

/// Inserts a record directly, bypassing the draft flow.
pub async fn insert_syllabus(state: &AppState, lecturer_id: i64, course_id: i64, status: &str, date: &str) -> i64 {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO syllabi (course_id, lecturer_id, status, submission_date, created_at, updated_at, data)
        VALUES (?, ?, ?, ?, ?, ?, '{"credits":"3"}')
        "#,
    )
    .bind(course_id)
    .bind(lecturer_id)
    .bind(status)
    .bind(date)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .expect("Failed to insert syllabus")
    .last_insert_rowid()
}

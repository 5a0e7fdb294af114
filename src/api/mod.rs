mod dashboard;
mod drafts;
mod syllabi;

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Router, extract::State};
use tower_http::trace::TraceLayer;

use crate::auth::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/logout", post(logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/filter", post(dashboard::filter))
        .route("/trash", get(syllabi::trash))
        .route("/syllabus/create", get(drafts::create_page))
        .route("/syllabus/update", post(drafts::update))
        .route("/update-syllabus", post(drafts::update))
        .route("/syllabus/save", post(drafts::save))
        .route("/syllabus/submit", post(drafts::submit))
        .route("/syllabus/resume", get(drafts::resume))
        .route("/syllabus/{id}", delete(syllabi::soft_delete))
        .route("/syllabus/{id}/edit", get(drafts::edit))
        .route("/syllabus/{id}/preview", get(syllabi::preview))
        .route("/syllabus/{id}/permanent", delete(syllabi::permanent_delete))
        .route("/syllabus/{id}/approve", post(syllabi::approve))
        .route(
            "/syllabus/{id}/comments",
            get(syllabi::comments).post(syllabi::add_comment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let signed_in = auth::session_token(&headers)
        .is_some_and(|token| auth::validate_token(token, &state.config.jwt_secret).is_ok());

    if signed_in {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

async fn logout() -> Response {
    let expired = format!("{}=; Path=/; Max-Age=0; HttpOnly", SESSION_COOKIE);
    (
        StatusCode::OK,
        [("hx-redirect", "/login".to_string()), (SET_COOKIE.as_str(), expired)],
        "Redirecting to login page...",
    )
        .into_response()
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::db::{repository, syllabi};
use crate::draft::Draft;
use crate::error::AppError;
use crate::models::{
    CardFilter, CommentEntry, CommentThread, NewCommentRequest, Syllabus, SyllabusStatus, User,
};
use crate::services::{DashboardService, PageData};
use crate::state::AppState;
use crate::view::{self, View};

/// The record, provided `user` owns it or manages syllabi.
async fn visible_syllabus(state: &AppState, user: &User, id: i64) -> Result<Syllabus, AppError> {
    let syllabus = syllabi::find_syllabus(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if syllabus.lecturer_id != user.id && !user.is_manager() {
        return Err(AppError::Forbidden);
    }
    Ok(syllabus)
}

fn check_transition(syllabus: &Syllabus, next: SyllabusStatus) -> Result<(), AppError> {
    if syllabus.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "syllabus {} cannot move from {} to {}",
            syllabus.id, syllabus.status, next
        )))
    }
}

/// Drops cached drafts that still point at a record which can no longer be
/// edited, so the next visit to the form starts a fresh draft.
async fn release_cached_drafts(state: &AppState, syllabus: &Syllabus, caller: &User) {
    state.drafts.discard_record(syllabus.lecturer_id, syllabus.id).await;
    if caller.id != syllabus.lecturer_id {
        state.drafts.discard_record(caller.id, syllabus.id).await;
    }
}

pub async fn preview(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let syllabus = visible_syllabus(&state, &user, id).await?;
    let draft = Draft::from_json(syllabus.id, &syllabus.data)?;

    Ok(view::render(View::Preview, &draft))
}

/// Moves a syllabus to the trash.
pub async fn soft_delete(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let syllabus = visible_syllabus(&state, &user, id).await?;
    check_transition(&syllabus, SyllabusStatus::Deleted)?;

    syllabi::set_status(&state.db, id, SyllabusStatus::Deleted).await?;
    release_cached_drafts(&state, &syllabus, &user).await;
    info!("user {} moved syllabus {} to trash", user.id, id);

    Ok(StatusCode::OK)
}

pub async fn permanent_delete(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let syllabus = visible_syllabus(&state, &user, id).await?;
    if syllabus.status != SyllabusStatus::Deleted {
        return Err(AppError::Conflict(format!(
            "syllabus {} must be in the trash before it is deleted",
            id
        )));
    }

    syllabi::delete_syllabus(&state.db, id).await?;
    release_cached_drafts(&state, &syllabus, &user).await;
    info!("user {} permanently deleted syllabus {}", user.id, id);

    Ok(StatusCode::OK)
}

pub async fn trash(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Response, AppError> {
    let filter = CardFilter {
        deleted: true,
        ..CardFilter::default()
    };
    let content = DashboardService::new(state.db.clone())
        .overview(&user, filter)
        .await?;

    Ok(view::render(View::Trash, &PageData::new("Trash", &user, content)))
}

pub async fn approve(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Syllabus>, AppError> {
    if !user.is_manager() {
        return Err(AppError::Forbidden);
    }

    let mut syllabus = syllabi::find_syllabus(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    check_transition(&syllabus, SyllabusStatus::Approved)?;

    syllabi::set_status(&state.db, id, SyllabusStatus::Approved).await?;
    syllabus.status = SyllabusStatus::Approved;
    release_cached_drafts(&state, &syllabus, &user).await;
    info!("user {} approved syllabus {}", user.id, id);

    Ok(Json(syllabus))
}

async fn render_thread(state: &AppState, user: &User, syllabus_id: i64) -> Result<Response, AppError> {
    let comments = repository::fetch_comments(&state.db, syllabus_id)
        .await?
        .into_iter()
        .map(|comment| CommentEntry::from_comment(comment, user.id))
        .collect();

    let thread = CommentThread {
        syllabus_id,
        comments,
    };
    Ok(view::render(View::Comments, &thread))
}

pub async fn comments(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    visible_syllabus(&state, &user, id).await?;
    render_thread(&state, &user, id).await
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
    Form(req): Form<NewCommentRequest>,
) -> Result<Response, AppError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment content cannot be empty".to_string()));
    }

    visible_syllabus(&state, &user, id).await?;
    repository::insert_comment(&state.db, id, &user, content).await?;

    render_thread(&state, &user, id).await
}

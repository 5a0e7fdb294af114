//! Handlers that edit the signed-in user's current draft.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Form, Json};
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::db::{repository, syllabi};
use crate::draft::{Draft, DraftAction};
use crate::error::AppError;
use crate::form::FormValues;
use crate::models::{Syllabus, User};
use crate::state::AppState;
use crate::view::{self, View};

/// Fills the department and course choices, defaulting empty selections
/// to the first option.
async fn fill_catalog(state: &AppState, draft: &mut Draft) -> Result<(), AppError> {
    let departments = repository::fetch_departments(&state.db).await?;
    let courses = repository::fetch_courses(&state.db).await?;

    draft.departments = departments.into_iter().map(|d| d.name).collect();
    draft.courses = courses.into_iter().map(|c| c.name).collect();

    if draft.syllabus_department.is_empty() {
        if let Some(first) = draft.departments.first() {
            draft.syllabus_department = first.clone();
        }
    }
    if draft.selected_course.is_empty() {
        if let Some(first) = draft.courses.first() {
            draft.selected_course = first.clone();
        }
    }
    Ok(())
}

/// Refuses to replace a draft that was never saved and has been edited.
async fn ensure_no_unsaved_work(state: &AppState, user: &User) -> Result<(), AppError> {
    let Some(shared) = state.drafts.peek(user.id) else {
        return Ok(());
    };
    let draft = shared.lock().await;
    if draft.has_unsaved_work(user) {
        return Err(AppError::Conflict(
            "save or submit the current draft first".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_page(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Response, AppError> {
    let shared = state.drafts.get(&user);
    let mut draft = shared.lock().await;
    fill_catalog(&state, &mut draft).await?;

    Ok(view::render(View::CreateSyllabus, &*draft))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let form = FormValues::from(pairs);
    let action = DraftAction::parse(form.value("action"), form.value("updateField"))?;

    let shared = state.drafts.get(&user);
    let mut draft = shared.lock().await;
    let rendered = action.apply(&mut draft, &form)?;
    debug!("applied {:?} to draft of user {}", action, user.id);

    Ok(view::render_or_empty(rendered, &*draft))
}

pub async fn save(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Syllabus>, AppError> {
    let shared = state.drafts.get(&user);
    let mut draft = shared.lock().await;

    let syllabus = state.persistence.save_draft(&user, &draft).await?;
    draft.id = syllabus.id;

    Ok(Json(syllabus))
}

pub async fn submit(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Response, AppError> {
    let shared = state.drafts.get(&user);
    {
        let draft = shared.lock().await;
        state.persistence.commit_submission(&user, &draft).await?;
    }
    state.drafts.invalidate(user.id);

    Ok(view::hx_redirect("/dashboard", "Redirecting..."))
}

/// Reopens the user's last saved draft.
pub async fn resume(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Response, AppError> {
    ensure_no_unsaved_work(&state, &user).await?;
    let mut draft = state.persistence.load_draft(&user).await?;
    fill_catalog(&state, &mut draft).await?;
    info!("user {} resumed draft {}", user.id, draft.id);

    let shared = state.drafts.replace(user.id, draft);
    let draft = shared.lock().await;
    Ok(view::render(View::CreateSyllabus, &*draft))
}

/// Loads an existing record into the user's draft slot.
pub async fn edit(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let syllabus = syllabi::find_syllabus(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if syllabus.lecturer_id != user.id && !user.is_manager() {
        return Err(AppError::Forbidden);
    }
    if !syllabus.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "syllabus {} is {} and can no longer be edited",
            syllabus.id, syllabus.status
        )));
    }

    ensure_no_unsaved_work(&state, &user).await?;
    let mut draft = Draft::from_json(syllabus.id, &syllabus.data)?;
    fill_catalog(&state, &mut draft).await?;
    info!("user {} editing syllabus {}", user.id, syllabus.id);

    let shared = state.drafts.replace(user.id, draft);
    let draft = shared.lock().await;
    Ok(view::render(View::CreateSyllabus, &*draft))
}

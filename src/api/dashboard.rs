use axum::extract::State;
use axum::response::Response;
use axum::Form;
use chrono::NaiveDate;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::form::FormValues;
use crate::models::{CardFilter, SyllabusStatus};
use crate::services::{DashboardService, PageData};
use crate::state::AppState;
use crate::view::{self, View};

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Response, AppError> {
    let content = DashboardService::new(state.db.clone())
        .overview(&user, CardFilter::default())
        .await?;

    Ok(view::render(View::Dashboard, &PageData::new("Dashboard", &user, content)))
}

pub async fn filter(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let filter = card_filter(&FormValues::from(pairs))?;
    let content = DashboardService::new(state.db.clone())
        .overview(&user, filter)
        .await?;

    Ok(view::render(View::CardSections, &content))
}

fn card_filter(form: &FormValues) -> Result<CardFilter, AppError> {
    Ok(CardFilter {
        search: form.value("search").map(str::to_string),
        from_date: filter_date(form.value("from-date"))?,
        to_date: filter_date(form.value("to-date"))?,
        // unknown labels are ignored
        statuses: form
            .values("status")
            .iter()
            .filter_map(|label| SyllabusStatus::from_filter_label(label))
            .collect(),
        ..CardFilter::default()
    })
}

/// Accepts `DD/MM/YYYY` or `YYYY-MM-DD`; a blank field means no bound.
fn filter_date(value: Option<&str>) -> Result<Option<String>, AppError> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };

    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map(|date| Some(date.format("%Y-%m-%d").to_string()))
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", value)))
}

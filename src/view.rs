//! Hand-off to the template layer.
//!
//! Handlers never build markup. They pick a named view (a full page or a
//! partial fragment) and hand it the data to render; the front end swaps the
//! returned fragment into the page.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    // full pages
    CreateSyllabus,
    Dashboard,
    Trash,
    Preview,
    Comments,
    CardSections,

    // draft form fragments
    CourseRequirements,
    LearningOutcomes,
    CourseObjectives,
    CourseStructure,
    OtherCourseStructure,
    GradeComponents,
    AssignmentsStructure,
    BibliographyRequired,
    BibliographyRecommended,
    SyllabusRows,
    SyllabusDepartment,
    CoursesDropdown,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::CreateSyllabus => "create-syllabus",
            View::Dashboard => "base",
            View::Trash => "trash-page",
            View::Preview => "syllabus-preview",
            View::Comments => "comments",
            View::CardSections => "outer-container",
            View::CourseRequirements => "courseRequirements",
            View::LearningOutcomes => "learningOutcomes",
            View::CourseObjectives => "courseObjectives",
            View::CourseStructure => "course-structure-container",
            View::OtherCourseStructure => "otherCourseInput",
            View::GradeComponents => "gradeComponents",
            View::AssignmentsStructure => "assignmentsStructure",
            View::BibliographyRequired => "bibliographyRequired",
            View::BibliographyRecommended => "bibliographyRecommended",
            View::SyllabusRows => "syllabusRows",
            View::SyllabusDepartment => "syllabusDepartment",
            View::CoursesDropdown => "coursesDropdown",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Rendered<'a, T: Serialize> {
    pub view: &'static str,
    pub data: &'a T,
}

pub fn render<T: Serialize>(view: View, data: &T) -> Response {
    Json(Rendered {
        view: view.name(),
        data,
    })
    .into_response()
}

/// Renders `view` when there is one; field updates without a fragment of
/// their own have nothing to swap in.
pub fn render_or_empty<T: Serialize>(view: Option<View>, data: &T) -> Response {
    match view {
        Some(view) => render(view, data),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub fn hx_redirect(location: &'static str, message: &'static str) -> Response {
    (StatusCode::OK, [("hx-redirect", location)], message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hx_redirect_sets_header() {
        let response = hx_redirect("/dashboard", "Redirecting...");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["hx-redirect"], "/dashboard");
    }

    #[test]
    fn test_render_or_empty_without_view_is_no_content() {
        let response = render_or_empty(None, &"ignored");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

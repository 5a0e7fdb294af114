//! The syllabus draft: an in-progress document edited one form action at a
//! time and stored as a JSON blob on its syllabus record.

pub mod action;
pub mod edit;
pub mod store;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::User;

pub use action::DraftAction;
pub use store::{DraftCache, DraftStore, InMemoryDraftCache, SharedDraft};

/// ID of a draft that has no syllabus record behind it yet.
pub const NEW_DRAFT_ID: i64 = -1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("invalid index: {0:?}")]
    InvalidIndex(String),

    #[error("unknown field: {0:?}")]
    UnknownField(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SyllabusRow {
    pub lesson_number: String,
    pub main_topic: String,
    pub lesson_topics: String,
    pub subtopics: String,
    pub reading_material: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GradeComponent {
    pub part_name: String,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    #[serde(rename = "ID")]
    pub id: i64,
    pub lecturer_name: String,
    pub lecturer_email: String,
    pub office_day: String,
    pub office_start: String,
    pub office_end: String,
    pub syllabus_department: String,
    #[serde(deserialize_with = "nullable_list")]
    pub departments: Vec<String>,
    pub selected_course: String,
    #[serde(deserialize_with = "nullable_list")]
    pub courses: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub course_requirements: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub learning_outcomes: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub course_objectives: Vec<String>,
    pub credits: String,
    pub weekly_hours: String,
    pub year: String,
    pub semester: String,
    pub prerequisites: String,
    #[serde(deserialize_with = "nullable_list")]
    pub course_structure: Vec<String>,
    pub other_course_structure: String,
    #[serde(rename = "activeLearning1")]
    pub active_learning_1: String,
    #[serde(rename = "activeLearning2")]
    pub active_learning_2: String,
    #[serde(rename = "activeLearning3")]
    pub active_learning_3: String,
    #[serde(rename = "activeLearning4")]
    pub active_learning_4: String,
    #[serde(deserialize_with = "nullable_list")]
    pub syllabus_rows: Vec<SyllabusRow>,
    #[serde(deserialize_with = "nullable_list")]
    pub grade_components: Vec<GradeComponent>,
    #[serde(deserialize_with = "nullable_list")]
    pub assignments_structure: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub bibliography_required: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub bibliography_recommended: Vec<String>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            id: NEW_DRAFT_ID,
            lecturer_name: String::new(),
            lecturer_email: String::new(),
            office_day: String::new(),
            office_start: String::new(),
            office_end: String::new(),
            syllabus_department: String::new(),
            departments: Vec::new(),
            selected_course: String::new(),
            courses: Vec::new(),
            course_requirements: Vec::new(),
            learning_outcomes: Vec::new(),
            course_objectives: Vec::new(),
            credits: String::new(),
            weekly_hours: String::new(),
            year: String::new(),
            semester: String::new(),
            prerequisites: String::new(),
            course_structure: Vec::new(),
            other_course_structure: String::new(),
            active_learning_1: String::new(),
            active_learning_2: String::new(),
            active_learning_3: String::new(),
            active_learning_4: String::new(),
            syllabus_rows: vec![SyllabusRow::default()],
            grade_components: Vec::new(),
            assignments_structure: Vec::new(),
            bibliography_required: Vec::new(),
            bibliography_recommended: Vec::new(),
        }
    }
}

impl Draft {
    /// A fresh draft for `lecturer`: identity prefilled, every list empty
    /// except the schedule, which starts with one blank row.
    pub fn for_lecturer(lecturer: &User) -> Self {
        Self {
            lecturer_name: lecturer.name.clone(),
            lecturer_email: lecturer.email.clone(),
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != NEW_DRAFT_ID
    }

    /// Whether this draft holds edits that exist nowhere but the store: it
    /// has no record yet and differs from a fresh draft. The catalog lists
    /// and first-option selections filled in by the form do not count.
    pub fn has_unsaved_work(&self, lecturer: &User) -> bool {
        if self.is_persisted() {
            return false;
        }
        let untouched = Self {
            departments: self.departments.clone(),
            courses: self.courses.clone(),
            syllabus_department: untouched_choice(&self.departments, &self.syllabus_department),
            selected_course: untouched_choice(&self.courses, &self.selected_course),
            ..Self::for_lecturer(lecturer)
        };
        *self != untouched
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a stored blob. The blob's own ID is ignored in favour of the
    /// record it was read from.
    pub fn from_json(record_id: i64, data: &str) -> Result<Self, serde_json::Error> {
        let mut draft: Draft = serde_json::from_str(data)?;
        draft.id = record_id;
        if draft.syllabus_rows.is_empty() {
            draft.syllabus_rows.push(SyllabusRow::default());
        }
        Ok(draft)
    }
}

// The selection a fresh draft would show: empty or the first option.
fn untouched_choice(options: &[String], chosen: &str) -> String {
    if options.first().is_some_and(|first| first == chosen) {
        chosen.to_string()
    } else {
        String::new()
    }
}

// Older blobs were written with `null` for lists that were never touched.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Repeated string fields of a draft that are edited as whole lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    CourseRequirements,
    LearningOutcomes,
    CourseObjectives,
    CourseStructure,
    AssignmentsStructure,
    BibliographyRequired,
    BibliographyRecommended,
}

impl ListField {
    pub const ALL: [ListField; 7] = [
        ListField::CourseRequirements,
        ListField::LearningOutcomes,
        ListField::CourseObjectives,
        ListField::CourseStructure,
        ListField::AssignmentsStructure,
        ListField::BibliographyRequired,
        ListField::BibliographyRecommended,
    ];

    /// Form key the client submits the whole list under.
    pub fn form_key(self) -> &'static str {
        match self {
            ListField::CourseRequirements => "course-requirements[]",
            ListField::LearningOutcomes => "learning-outcomes[]",
            ListField::CourseObjectives => "course-objectives[]",
            ListField::CourseStructure => "lecture-type",
            ListField::AssignmentsStructure => "assignments-structure[]",
            ListField::BibliographyRequired => "bibliography-required[]",
            ListField::BibliographyRecommended => "bibliography-recommended[]",
        }
    }
}

/// Single-valued draft attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    LecturerName,
    LecturerEmail,
    OfficeDay,
    OfficeStart,
    OfficeEnd,
    Department,
    Course,
    Credits,
    WeeklyHours,
    Year,
    Semester,
    Prerequisites,
    ActiveLearning1,
    ActiveLearning2,
    ActiveLearning3,
    ActiveLearning4,
    OtherCourseStructure,
}

impl ScalarField {
    pub fn form_key(self) -> &'static str {
        match self {
            ScalarField::LecturerName => "LecturerName",
            ScalarField::LecturerEmail => "LecturerEmail",
            ScalarField::OfficeDay => "office-day",
            ScalarField::OfficeStart => "office-start",
            ScalarField::OfficeEnd => "office-end",
            ScalarField::Department => "syllabus-department",
            ScalarField::Course => "course-dropdown",
            ScalarField::Credits => "credits",
            ScalarField::WeeklyHours => "weekly-hours",
            ScalarField::Year => "year",
            ScalarField::Semester => "semester",
            ScalarField::Prerequisites => "prerequisites",
            ScalarField::ActiveLearning1 => "active-learning-1",
            ScalarField::ActiveLearning2 => "active-learning-2",
            ScalarField::ActiveLearning3 => "active-learning-3",
            ScalarField::ActiveLearning4 => "active-learning-4",
            ScalarField::OtherCourseStructure => "other-course-structure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecturer() -> User {
        User {
            id: 7,
            name: "Dana Levi".to_string(),
            email: "dana@example.ac.il".to_string(),
            role: "Instructor".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_fresh_draft_for_lecturer() {
        let draft = Draft::for_lecturer(&lecturer());

        assert_eq!(draft.id, NEW_DRAFT_ID);
        assert!(!draft.is_persisted());
        assert_eq!(draft.lecturer_name, "Dana Levi");
        assert_eq!(draft.lecturer_email, "dana@example.ac.il");
        assert_eq!(draft.syllabus_rows, vec![SyllabusRow::default()]);
        assert!(draft.grade_components.is_empty());
        for field in ListField::ALL {
            assert!(draft.list(field).is_empty(), "{:?} should start empty", field);
        }
    }

    #[test]
    fn test_json_round_trip() {
        let mut draft = Draft::for_lecturer(&lecturer());
        draft.id = 12;
        draft.course_requirements = vec!["Linear algebra".to_string()];
        draft.active_learning_3 = "Peer review".to_string();
        draft.syllabus_rows = vec![
            SyllabusRow {
                lesson_number: "1".to_string(),
                main_topic: "Intro".to_string(),
                ..SyllabusRow::default()
            },
            SyllabusRow::default(),
        ];
        draft.grade_components = vec![GradeComponent {
            part_name: "Final".to_string(),
            percentage: "100".to_string(),
        }];

        let json = draft.to_json().expect("serialize");
        let decoded = Draft::from_json(12, &json).expect("deserialize");
        assert_eq!(decoded, draft);
    }

    #[test]
    fn test_legacy_blob_field_names_and_null_lists() {
        let json = r#"{
            "ID": 3,
            "lecturerName": "Dana",
            "courseRequirements": null,
            "activeLearning1": "Flipped class",
            "syllabusRows": [{"LessonNumber": "1", "MainTopic": "Sets"}],
            "gradeComponents": [{"PartName": "Exam", "Percentage": "70"}]
        }"#;

        let draft = Draft::from_json(41, json).expect("deserialize");
        assert_eq!(draft.id, 41);
        assert_eq!(draft.lecturer_name, "Dana");
        assert!(draft.course_requirements.is_empty());
        assert_eq!(draft.active_learning_1, "Flipped class");
        assert_eq!(draft.syllabus_rows[0].main_topic, "Sets");
        assert_eq!(draft.syllabus_rows[0].reading_material, "");
        assert_eq!(draft.grade_components[0].percentage, "70");
    }

    #[test]
    fn test_unsaved_work_ignores_catalog_defaults() {
        let dana = lecturer();
        let mut draft = Draft::for_lecturer(&dana);
        assert!(!draft.has_unsaved_work(&dana));

        draft.departments = vec!["Mathematics".to_string(), "Physics".to_string()];
        draft.syllabus_department = "Mathematics".to_string();
        draft.courses = vec!["Calculus I".to_string()];
        draft.selected_course = "Calculus I".to_string();
        assert!(!draft.has_unsaved_work(&dana));

        draft.syllabus_department = "Physics".to_string();
        assert!(draft.has_unsaved_work(&dana));
    }

    #[test]
    fn test_unsaved_work_after_edits() {
        let dana = lecturer();
        let mut draft = Draft::for_lecturer(&dana);
        draft.learning_outcomes = vec![String::new()];
        assert!(draft.has_unsaved_work(&dana));

        // persisted drafts can always be reloaded from their record
        draft.id = 3;
        assert!(!draft.has_unsaved_work(&dana));
    }

    #[test]
    fn test_blob_without_rows_gets_one_blank_row() {
        let draft = Draft::from_json(5, r#"{"syllabusRows": []}"#).expect("deserialize");
        assert_eq!(draft.syllabus_rows.len(), 1);
    }
}

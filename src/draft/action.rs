use super::{Draft, DraftError, GradeComponent, ListField, ScalarField, SyllabusRow};
use crate::form::FormValues;
use crate::view::View;

const LESSON_NUMBER_KEY: &str = "lesson-number[]";
const MAIN_TOPIC_KEY: &str = "main-topic[]";
const LESSON_TOPICS_KEY: &str = "lesson-topics[]";
const SUBTOPICS_KEY: &str = "subtopics[]";
const READING_MATERIAL_KEY: &str = "reading-material[]";
const GRADE_NAME_KEY: &str = "grade-component-name[]";
const GRADE_PERCENTAGE_KEY: &str = "grade-component-percentage[]";
const INDEX_KEY: &str = "index";

/// One editing action posted by the syllabus form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    AddEntry(ListField),
    RemoveEntry(ListField),
    AddGradeComponent,
    RemoveGradeComponent,
    UpdateSyllabusRows,
    InsertSyllabusRow,
    RemoveSyllabusRow,
    Update(FieldUpdate),
}

/// Target of a general update, picked by the `updateField` form value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    Scalar(ScalarField),
    List(ListField),
    GradeComponents,
}

impl DraftAction {
    /// Resolves the `action` form value. Anything that is not a named list
    /// action falls through to a general update of `update_field`.
    pub fn parse(action: Option<&str>, update_field: Option<&str>) -> Result<Self, DraftError> {
        let parsed = match action.unwrap_or_default() {
            "addCourseRequirement" => DraftAction::AddEntry(ListField::CourseRequirements),
            "removeCourseRequirement" => DraftAction::RemoveEntry(ListField::CourseRequirements),
            "addLearningOutcome" => DraftAction::AddEntry(ListField::LearningOutcomes),
            "removeLearningOutcome" => DraftAction::RemoveEntry(ListField::LearningOutcomes),
            "addCourseObjective" => DraftAction::AddEntry(ListField::CourseObjectives),
            "removeCourseObjective" => DraftAction::RemoveEntry(ListField::CourseObjectives),
            "addAssignmentStructure" => DraftAction::AddEntry(ListField::AssignmentsStructure),
            "removeAssignmentStructure" => {
                DraftAction::RemoveEntry(ListField::AssignmentsStructure)
            }
            "addBibliographyRequired" => DraftAction::AddEntry(ListField::BibliographyRequired),
            "removeBibliographyRequired" => {
                DraftAction::RemoveEntry(ListField::BibliographyRequired)
            }
            "addBibliographyRecommended" => {
                DraftAction::AddEntry(ListField::BibliographyRecommended)
            }
            "removeBibliographyRecommended" => {
                DraftAction::RemoveEntry(ListField::BibliographyRecommended)
            }
            "addGradeComponent" => DraftAction::AddGradeComponent,
            "removeGradeComponent" => DraftAction::RemoveGradeComponent,
            "updateSyllabusRow" => DraftAction::UpdateSyllabusRows,
            "insertSyllabusRow" => DraftAction::InsertSyllabusRow,
            "removeSyllabusRow" => DraftAction::RemoveSyllabusRow,
            _ => DraftAction::Update(FieldUpdate::parse(update_field.unwrap_or_default())?),
        };
        Ok(parsed)
    }

    /// Applies the action to `draft` and names the fragment to re-render.
    /// `None` means nothing on the page needs to change.
    pub fn apply(self, draft: &mut Draft, form: &FormValues) -> Result<Option<View>, DraftError> {
        let view = match self {
            DraftAction::AddEntry(field) => {
                draft.append_entry(field, form.values(field.form_key()));
                Some(list_view(field))
            }
            DraftAction::RemoveEntry(field) => {
                draft.remove_entry(field, parse_index(form)?);
                Some(list_view(field))
            }
            DraftAction::AddGradeComponent => {
                draft.append_grade_component(grade_components(form));
                Some(View::GradeComponents)
            }
            DraftAction::RemoveGradeComponent => {
                draft.remove_grade_component(parse_index(form)?);
                Some(View::GradeComponents)
            }
            DraftAction::UpdateSyllabusRows => {
                draft.set_rows(syllabus_rows(form));
                Some(View::SyllabusRows)
            }
            DraftAction::InsertSyllabusRow => {
                let index = parse_index(form)?;
                draft.insert_row_after(index, syllabus_rows(form));
                Some(View::SyllabusRows)
            }
            DraftAction::RemoveSyllabusRow => {
                draft.remove_row(parse_index(form)?);
                Some(View::SyllabusRows)
            }
            DraftAction::Update(FieldUpdate::Scalar(field)) => {
                draft.set_scalar(field, form.value_or_empty(field.form_key()));
                scalar_view(field)
            }
            DraftAction::Update(FieldUpdate::List(field)) => {
                draft.set_list(field, form.values(field.form_key()));
                Some(list_view(field))
            }
            DraftAction::Update(FieldUpdate::GradeComponents) => {
                draft.set_grade_components(grade_components(form));
                Some(View::GradeComponents)
            }
        };
        Ok(view)
    }
}

impl FieldUpdate {
    pub fn parse(name: &str) -> Result<Self, DraftError> {
        let update = match name {
            "LecturerName" => FieldUpdate::Scalar(ScalarField::LecturerName),
            "LecturerEmail" => FieldUpdate::Scalar(ScalarField::LecturerEmail),
            "officeDay" => FieldUpdate::Scalar(ScalarField::OfficeDay),
            "officeStart" => FieldUpdate::Scalar(ScalarField::OfficeStart),
            "officeEnd" => FieldUpdate::Scalar(ScalarField::OfficeEnd),
            "syllabus-department" => FieldUpdate::Scalar(ScalarField::Department),
            "course-dropdown" => FieldUpdate::Scalar(ScalarField::Course),
            "credits" => FieldUpdate::Scalar(ScalarField::Credits),
            "weeklyHours" => FieldUpdate::Scalar(ScalarField::WeeklyHours),
            "year" => FieldUpdate::Scalar(ScalarField::Year),
            "semester" => FieldUpdate::Scalar(ScalarField::Semester),
            "prerequisites" => FieldUpdate::Scalar(ScalarField::Prerequisites),
            "activeLearning1" => FieldUpdate::Scalar(ScalarField::ActiveLearning1),
            "activeLearning2" => FieldUpdate::Scalar(ScalarField::ActiveLearning2),
            "activeLearning3" => FieldUpdate::Scalar(ScalarField::ActiveLearning3),
            "activeLearning4" => FieldUpdate::Scalar(ScalarField::ActiveLearning4),
            "otherCourseStructure" => FieldUpdate::Scalar(ScalarField::OtherCourseStructure),
            "courseRequirements" => FieldUpdate::List(ListField::CourseRequirements),
            "learningOutcomes" => FieldUpdate::List(ListField::LearningOutcomes),
            "courseObjectives" => FieldUpdate::List(ListField::CourseObjectives),
            "courseStructure" => FieldUpdate::List(ListField::CourseStructure),
            "assignmentsStructure" => FieldUpdate::List(ListField::AssignmentsStructure),
            "bibliographyRequired" => FieldUpdate::List(ListField::BibliographyRequired),
            "bibliographyRecommended" => FieldUpdate::List(ListField::BibliographyRecommended),
            "gradeComponents" => FieldUpdate::GradeComponents,
            other => return Err(DraftError::UnknownField(other.to_string())),
        };
        Ok(update)
    }
}

fn list_view(field: ListField) -> View {
    match field {
        ListField::CourseRequirements => View::CourseRequirements,
        ListField::LearningOutcomes => View::LearningOutcomes,
        ListField::CourseObjectives => View::CourseObjectives,
        ListField::CourseStructure => View::CourseStructure,
        ListField::AssignmentsStructure => View::AssignmentsStructure,
        ListField::BibliographyRequired => View::BibliographyRequired,
        ListField::BibliographyRecommended => View::BibliographyRecommended,
    }
}

fn scalar_view(field: ScalarField) -> Option<View> {
    match field {
        ScalarField::Department => Some(View::SyllabusDepartment),
        ScalarField::Course => Some(View::CoursesDropdown),
        ScalarField::OtherCourseStructure => Some(View::OtherCourseStructure),
        _ => None,
    }
}

fn parse_index(form: &FormValues) -> Result<i64, DraftError> {
    let raw = form.value(INDEX_KEY).unwrap_or_default();
    raw.trim()
        .parse()
        .map_err(|_| DraftError::InvalidIndex(raw.to_string()))
}

/// Zips the submitted schedule columns into rows. Columns are matched by
/// position; a short column leaves the missing cells blank.
fn syllabus_rows(form: &FormValues) -> Vec<SyllabusRow> {
    let mut columns = [
        LESSON_NUMBER_KEY,
        MAIN_TOPIC_KEY,
        LESSON_TOPICS_KEY,
        SUBTOPICS_KEY,
        READING_MATERIAL_KEY,
    ]
    .map(|key| form.values(key).into_iter());
    let count = columns.iter().map(|column| column.len()).max().unwrap_or(0);

    (0..count)
        .map(|_| {
            let [lesson, main, topics, subtopics, reading] = &mut columns;
            SyllabusRow {
                lesson_number: lesson.next().unwrap_or_default(),
                main_topic: main.next().unwrap_or_default(),
                lesson_topics: topics.next().unwrap_or_default(),
                subtopics: subtopics.next().unwrap_or_default(),
                reading_material: reading.next().unwrap_or_default(),
            }
        })
        .collect()
}

fn grade_components(form: &FormValues) -> Vec<GradeComponent> {
    let names = form.values(GRADE_NAME_KEY);
    let mut percentages = form.values(GRADE_PERCENTAGE_KEY).into_iter();
    let count = names.len().max(percentages.len());
    let mut names = names.into_iter();

    (0..count)
        .map(|_| GradeComponent {
            part_name: names.next().unwrap_or_default(),
            percentage: percentages.next().unwrap_or_default(),
        })
        .collect()
}

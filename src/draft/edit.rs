//! In-place edits applied to a draft by the form actions.
//!
//! Lists are addressed by 0-based position. Appends follow the
//! re-sync-then-append pattern: the client resubmits every entry it shows,
//! the submitted list replaces the stored one, then one blank entry is added.

use super::{Draft, GradeComponent, ListField, ScalarField, SyllabusRow};

impl Draft {
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::CourseRequirements => &self.course_requirements,
            ListField::LearningOutcomes => &self.learning_outcomes,
            ListField::CourseObjectives => &self.course_objectives,
            ListField::CourseStructure => &self.course_structure,
            ListField::AssignmentsStructure => &self.assignments_structure,
            ListField::BibliographyRequired => &self.bibliography_required,
            ListField::BibliographyRecommended => &self.bibliography_recommended,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::CourseRequirements => &mut self.course_requirements,
            ListField::LearningOutcomes => &mut self.learning_outcomes,
            ListField::CourseObjectives => &mut self.course_objectives,
            ListField::CourseStructure => &mut self.course_structure,
            ListField::AssignmentsStructure => &mut self.assignments_structure,
            ListField::BibliographyRequired => &mut self.bibliography_required,
            ListField::BibliographyRecommended => &mut self.bibliography_recommended,
        }
    }

    fn scalar_mut(&mut self, field: ScalarField) -> &mut String {
        match field {
            ScalarField::LecturerName => &mut self.lecturer_name,
            ScalarField::LecturerEmail => &mut self.lecturer_email,
            ScalarField::OfficeDay => &mut self.office_day,
            ScalarField::OfficeStart => &mut self.office_start,
            ScalarField::OfficeEnd => &mut self.office_end,
            ScalarField::Department => &mut self.syllabus_department,
            ScalarField::Course => &mut self.selected_course,
            ScalarField::Credits => &mut self.credits,
            ScalarField::WeeklyHours => &mut self.weekly_hours,
            ScalarField::Year => &mut self.year,
            ScalarField::Semester => &mut self.semester,
            ScalarField::Prerequisites => &mut self.prerequisites,
            ScalarField::ActiveLearning1 => &mut self.active_learning_1,
            ScalarField::ActiveLearning2 => &mut self.active_learning_2,
            ScalarField::ActiveLearning3 => &mut self.active_learning_3,
            ScalarField::ActiveLearning4 => &mut self.active_learning_4,
            ScalarField::OtherCourseStructure => &mut self.other_course_structure,
        }
    }

    /// Overwrites a scalar attribute. Values are stored as submitted.
    pub fn set_scalar(&mut self, field: ScalarField, value: String) {
        *self.scalar_mut(field) = value;
    }

    pub fn set_list(&mut self, field: ListField, submitted: Vec<String>) {
        *self.list_mut(field) = submitted;
    }

    pub fn append_entry(&mut self, field: ListField, submitted: Vec<String>) {
        let list = self.list_mut(field);
        *list = submitted;
        list.push(String::new());
    }

    /// Removes the entry at `index`; returns false (and leaves the list
    /// alone) when the index is out of range.
    pub fn remove_entry(&mut self, field: ListField, index: i64) -> bool {
        remove_at(self.list_mut(field), index)
    }

    /// Replaces the schedule. An empty submission leaves one blank row.
    pub fn set_rows(&mut self, rows: Vec<SyllabusRow>) {
        self.syllabus_rows = rows;
        if self.syllabus_rows.is_empty() {
            self.syllabus_rows.push(SyllabusRow::default());
        }
    }

    /// Replaces the schedule with `rows`, then inserts a blank row right
    /// after `index`. Indices at or past the last row append; negative ones
    /// insert at the front.
    pub fn insert_row_after(&mut self, index: i64, rows: Vec<SyllabusRow>) {
        let mut rows = rows;
        let position = index
            .saturating_add(1)
            .clamp(0, rows.len() as i64) as usize;
        rows.insert(position, SyllabusRow::default());
        self.syllabus_rows = rows;
    }

    /// Removes a schedule row. The last remaining row is never removed.
    pub fn remove_row(&mut self, index: i64) -> bool {
        if self.syllabus_rows.len() < 2 {
            return false;
        }
        remove_at(&mut self.syllabus_rows, index)
    }

    pub fn set_grade_components(&mut self, components: Vec<GradeComponent>) {
        self.grade_components = components;
    }

    pub fn append_grade_component(&mut self, components: Vec<GradeComponent>) {
        self.grade_components = components;
        self.grade_components.push(GradeComponent::default());
    }

    pub fn remove_grade_component(&mut self, index: i64) -> bool {
        remove_at(&mut self.grade_components, index)
    }
}

fn remove_at<T>(list: &mut Vec<T>, index: i64) -> bool {
    match usize::try_from(index) {
        Ok(i) if i < list.len() => {
            list.remove(i);
            true
        }
        _ => false,
    }
}

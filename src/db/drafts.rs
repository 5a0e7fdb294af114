//! Moves drafts between the in-memory store and their syllabus records.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{repository, syllabi};
use crate::db::syllabi::NewSyllabus;
use crate::draft::Draft;
use crate::error::AppError;
use crate::models::{Syllabus, SyllabusStatus, User};

#[async_trait]
pub trait DraftPersistence: Send + Sync {
    /// The lecturer's most recent unsubmitted draft, or a blank one.
    async fn load_draft(&self, lecturer: &User) -> Result<Draft, AppError>;

    /// Stores the draft without changing its record's status. A draft with
    /// no record yet gets a new one in `Draft` status.
    async fn save_draft(&self, user: &User, draft: &Draft) -> Result<Syllabus, AppError>;

    /// Stores the draft and sends it for review.
    async fn commit_submission(&self, user: &User, draft: &Draft) -> Result<Syllabus, AppError>;
}

pub struct SqliteDraftPersistence {
    db: SqlitePool,
}

impl SqliteDraftPersistence {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn course_id(&self, draft: &Draft) -> Result<Option<i64>, AppError> {
        if draft.selected_course.is_empty() {
            return Ok(None);
        }
        let course = repository::find_course_by_name(&self.db, &draft.selected_course).await?;
        if course.is_none() {
            debug!("course {:?} not in catalog, storing without course", draft.selected_course);
        }
        Ok(course.map(|c| c.id))
    }

    /// The record behind `draft`, provided `user` may still change it.
    async fn editable_record(&self, user: &User, draft: &Draft) -> Result<Syllabus, AppError> {
        let syllabus = syllabi::find_syllabus(&self.db, draft.id)
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

        Ok(syllabus)
    }
}

#[async_trait]
impl DraftPersistence for SqliteDraftPersistence {
    async fn load_draft(&self, lecturer: &User) -> Result<Draft, AppError> {
        match syllabi::latest_with_status(&self.db, lecturer.id, SyllabusStatus::Draft).await? {
            Some(syllabus) => {
                debug!("resuming syllabus {} for user {}", syllabus.id, lecturer.id);
                Ok(Draft::from_json(syllabus.id, &syllabus.data)?)
            }
            None => Ok(Draft::for_lecturer(lecturer)),
        }
    }

    async fn save_draft(&self, user: &User, draft: &Draft) -> Result<Syllabus, AppError> {
        let data = draft.to_json()?;
        let course_id = self.course_id(draft).await?;

        if !draft.is_persisted() {
            let syllabus = syllabi::insert_syllabus(
                &self.db,
                &NewSyllabus {
                    course_id,
                    lecturer_id: user.id,
                    status: SyllabusStatus::Draft,
                    data,
                },
            )
            .await?;
            info!("created syllabus {} for user {}", syllabus.id, user.id);
            return Ok(syllabus);
        }

        let mut syllabus = self.editable_record(user, draft).await?;
        syllabus.course_id = course_id;
        syllabus.data = data;
        syllabi::update_syllabus(&self.db, &mut syllabus).await?;
        debug!("saved syllabus {}", syllabus.id);

        Ok(syllabus)
    }

    async fn commit_submission(&self, user: &User, draft: &Draft) -> Result<Syllabus, AppError> {
        let data = draft.to_json()?;
        let course_id = self.course_id(draft).await?;

        let syllabus = if draft.is_persisted() {
            let mut syllabus = self.editable_record(user, draft).await?;
            syllabus.course_id = course_id;
            syllabus.status = SyllabusStatus::InReview;
            syllabus.submission_date = syllabi::today();
            syllabus.data = data;
            syllabi::update_syllabus(&self.db, &mut syllabus).await?;
            syllabus
        } else {
            syllabi::insert_syllabus(
                &self.db,
                &NewSyllabus {
                    course_id,
                    lecturer_id: user.id,
                    status: SyllabusStatus::InReview,
                    data,
                },
            )
            .await?
        };

        info!("syllabus {} submitted for review by user {}", syllabus.id, user.id);
        Ok(syllabus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (SqlitePool, SqliteDraftPersistence, User, User) {
        let pool = crate::db::connect("sqlite::memory:", 1)
            .await
            .expect("Failed to create test db");

        sqlx::query(
            r#"
            INSERT INTO users (name, email, role, created_at) VALUES
                ('Dana Levi', 'dana@example.ac.il', 'Instructor', '2025-01-01T00:00:00+00:00'),
                ('Yossi Cohen', 'yossi@example.ac.il', 'Instructor', '2025-01-01T00:00:00+00:00')
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to insert users");
        sqlx::query("INSERT INTO departments (name) VALUES ('Mathematics')")
            .execute(&pool)
            .await
            .expect("Failed to insert department");
        sqlx::query("INSERT INTO courses (name, department_id) VALUES ('Calculus I', 1)")
            .execute(&pool)
            .await
            .expect("Failed to insert course");

        let dana = repository::find_user(&pool, 1).await.expect("query").expect("user");
        let yossi = repository::find_user(&pool, 2).await.expect("query").expect("user");
        (pool.clone(), SqliteDraftPersistence::new(pool), dana, yossi)
    }

    #[tokio::test]
    async fn test_load_without_saved_draft_is_blank() {
        let (_pool, persistence, dana, _) = setup().await;

        let draft = persistence.load_draft(&dana).await.expect("load");
        assert!(!draft.is_persisted());
        assert_eq!(draft.lecturer_name, "Dana Levi");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (_pool, persistence, dana, _) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.selected_course = "Calculus I".to_string();
        draft.credits = "4".to_string();

        let saved = persistence.save_draft(&dana, &draft).await.expect("save");
        assert_eq!(saved.status, SyllabusStatus::Draft);
        assert_eq!(saved.course_id, Some(1));

        draft.id = saved.id;
        draft.year = "2025".to_string();
        let resaved = persistence.save_draft(&dana, &draft).await.expect("save");
        assert_eq!(resaved.id, saved.id);

        let loaded = persistence.load_draft(&dana).await.expect("load");
        assert_eq!(loaded.id, saved.id);
        assert_eq!(loaded.credits, "4");
        assert_eq!(loaded.year, "2025");
    }

    #[tokio::test]
    async fn test_saved_record_reports_written_timestamp() {
        let (pool, persistence, dana, _) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.id = persistence.save_draft(&dana, &draft).await.expect("save").id;

        draft.credits = "2".to_string();
        let resaved = persistence.save_draft(&dana, &draft).await.expect("save");
        let stored = syllabi::find_syllabus(&pool, draft.id).await.expect("query").expect("syllabus");
        assert_eq!(resaved.updated_at, stored.updated_at);

        let submitted = persistence.commit_submission(&dana, &draft).await.expect("submit");
        let stored = syllabi::find_syllabus(&pool, draft.id).await.expect("query").expect("syllabus");
        assert_eq!(submitted.updated_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_course_is_stored_without_reference() {
        let (_pool, persistence, dana, _) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.selected_course = "Poetry".to_string();

        let saved = persistence.save_draft(&dana, &draft).await.expect("save");
        assert_eq!(saved.course_id, None);
    }

    #[tokio::test]
    async fn test_submit_moves_record_to_review() {
        let (pool, persistence, dana, _) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.id = persistence.save_draft(&dana, &draft).await.expect("save").id;

        let submitted = persistence.commit_submission(&dana, &draft).await.expect("submit");
        assert_eq!(submitted.id, draft.id);
        assert_eq!(submitted.status, SyllabusStatus::InReview);
        assert_eq!(submitted.submission_date, syllabi::today());

        let stored = syllabi::find_syllabus(&pool, draft.id).await.expect("query").expect("syllabus");
        assert_eq!(stored.status, SyllabusStatus::InReview);

        // submitted records are no longer resumed
        assert!(!persistence.load_draft(&dana).await.expect("load").is_persisted());
    }

    #[tokio::test]
    async fn test_submit_new_draft_inserts_record() {
        let (_pool, persistence, dana, _) = setup().await;
        let draft = Draft::for_lecturer(&dana);

        let submitted = persistence.commit_submission(&dana, &draft).await.expect("submit");
        assert_eq!(submitted.status, SyllabusStatus::InReview);
        assert_eq!(submitted.lecturer_id, dana.id);
    }

    #[tokio::test]
    async fn test_approved_record_cannot_be_saved() {
        let (pool, persistence, dana, _) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.id = persistence.save_draft(&dana, &draft).await.expect("save").id;
        syllabi::set_status(&pool, draft.id, SyllabusStatus::Approved)
            .await
            .expect("status");

        let err = persistence.save_draft(&dana, &draft).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = persistence.commit_submission(&dana, &draft).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_other_lecturers_record_is_forbidden() {
        let (_pool, persistence, dana, yossi) = setup().await;
        let mut draft = Draft::for_lecturer(&dana);
        draft.id = persistence.save_draft(&dana, &draft).await.expect("save").id;

        let err = persistence.save_draft(&yossi, &draft).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (_pool, persistence, dana, _) = setup().await;
        let draft = Draft {
            id: 404,
            ..Draft::for_lecturer(&dana)
        };

        let err = persistence.save_draft(&dana, &draft).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}

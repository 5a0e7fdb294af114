use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Comment, Course, Department, User};

pub async fn find_user(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email, role, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn fetch_departments(db: &SqlitePool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, name, department_id FROM courses ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn find_course_by_name(db: &SqlitePool, name: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, name, department_id FROM courses WHERE name = ? ORDER BY id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn fetch_comments(db: &SqlitePool, syllabus_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT
            c.id,
            c.syllabus_id,
            c.user_id,
            u.name AS author_name,
            c.content,
            c.created_at
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.syllabus_id = ?
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(syllabus_id)
    .fetch_all(db)
    .await
}

pub async fn insert_comment(
    db: &SqlitePool,
    syllabus_id: i64,
    author: &User,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        "INSERT INTO comments (syllabus_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(syllabus_id)
    .bind(author.id)
    .bind(content)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Comment {
        id,
        syllabus_id,
        user_id: author.id,
        author_name: author.name.clone(),
        content: content.to_string(),
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::syllabi::{self, NewSyllabus};
    use crate::models::SyllabusStatus;

    async fn setup_test_db() -> SqlitePool {
        let pool = crate::db::connect("sqlite::memory:", 1)
            .await
            .expect("Failed to create test db");

        sqlx::query(
            "INSERT INTO users (name, email, role, created_at) VALUES ('Dana Levi', 'dana@example.ac.il', 'Instructor', '2025-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("Failed to insert user");
        sqlx::query("INSERT INTO departments (name) VALUES ('Mathematics'), ('Physics')")
            .execute(&pool)
            .await
            .expect("Failed to insert departments");
        sqlx::query("INSERT INTO courses (name, department_id) VALUES ('Calculus I', 1), ('Mechanics', 2)")
            .execute(&pool)
            .await
            .expect("Failed to insert courses");

        pool
    }

    #[tokio::test]
    async fn test_find_user() {
        let pool = setup_test_db().await;

        let user = find_user(&pool, 1).await.expect("query").expect("user");
        assert_eq!(user.name, "Dana Levi");
        assert!(!user.is_manager());

        assert!(find_user(&pool, 99).await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_catalog_lookups() {
        let pool = setup_test_db().await;

        let departments = fetch_departments(&pool).await.expect("departments");
        assert_eq!(departments.len(), 2);
        assert_eq!(departments[0].name, "Mathematics");

        let courses = fetch_courses(&pool).await.expect("courses");
        assert_eq!(courses.len(), 2);

        let mechanics = find_course_by_name(&pool, "Mechanics")
            .await
            .expect("query")
            .expect("course");
        assert_eq!(mechanics.department_id, 2);
        assert!(find_course_by_name(&pool, "Poetry").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_insert_and_fetch_comments() {
        let pool = setup_test_db().await;
        let author = find_user(&pool, 1).await.expect("query").expect("user");
        let syllabus = syllabi::insert_syllabus(
            &pool,
            &NewSyllabus {
                course_id: Some(1),
                lecturer_id: author.id,
                status: SyllabusStatus::InReview,
                data: "{}".to_string(),
            },
        )
        .await
        .expect("Failed to insert syllabus");

        insert_comment(&pool, syllabus.id, &author, "First pass looks good")
            .await
            .expect("Failed to insert comment");
        insert_comment(&pool, syllabus.id, &author, "Fix the reading list")
            .await
            .expect("Failed to insert comment");

        let comments = fetch_comments(&pool, syllabus.id).await.expect("comments");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "First pass looks good");
        assert_eq!(comments[1].author_name, "Dana Levi");
    }
}

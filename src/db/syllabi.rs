use chrono::{NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Card, CardFilter, Syllabus, SyllabusStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, FromRow)]
struct SyllabusRecord {
    id: i64,
    course_id: Option<i64>,
    lecturer_id: i64,
    status: String,
    submission_date: String,
    created_at: String,
    updated_at: String,
    data: String,
}

impl TryFrom<SyllabusRecord> for Syllabus {
    type Error = sqlx::Error;

    fn try_from(record: SyllabusRecord) -> Result<Self, Self::Error> {
        let status = record
            .status
            .parse::<SyllabusStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Syllabus {
            id: record.id,
            course_id: record.course_id,
            lecturer_id: record.lecturer_id,
            status,
            submission_date: record.submission_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
            data: record.data,
        })
    }
}

#[derive(Debug, FromRow)]
struct CardRecord {
    id: i64,
    status: String,
    submission_date: String,
    course_name: String,
    department_name: String,
    lecturer_name: String,
}

impl TryFrom<CardRecord> for Card {
    type Error = sqlx::Error;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        let status = record
            .status
            .parse::<SyllabusStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let submitted_on = NaiveDate::parse_from_str(&record.submission_date, DATE_FORMAT)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Card {
            id: record.id,
            title: record.course_name,
            date: submitted_on.format("%d/%m/%Y").to_string(),
            submitted_on,
            lecturer: record.lecturer_name,
            field: record.department_name,
            status,
        })
    }
}

/// Values for a record that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewSyllabus {
    pub course_id: Option<i64>,
    pub lecturer_id: i64,
    pub status: SyllabusStatus,
    pub data: String,
}

pub fn today() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

pub async fn find_syllabus(db: &SqlitePool, id: i64) -> Result<Option<Syllabus>, sqlx::Error> {
    sqlx::query_as::<_, SyllabusRecord>(
        r#"
        SELECT id, course_id, lecturer_id, status, submission_date, created_at, updated_at, data
        FROM syllabi
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .map(Syllabus::try_from)
    .transpose()
}

/// Most recently touched record of `lecturer_id` in the given status.
pub async fn latest_with_status(
    db: &SqlitePool,
    lecturer_id: i64,
    status: SyllabusStatus,
) -> Result<Option<Syllabus>, sqlx::Error> {
    sqlx::query_as::<_, SyllabusRecord>(
        r#"
        SELECT id, course_id, lecturer_id, status, submission_date, created_at, updated_at, data
        FROM syllabi
        WHERE lecturer_id = ? AND status = ?
        ORDER BY updated_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(lecturer_id)
    .bind(status.as_str())
    .fetch_optional(db)
    .await?
    .map(Syllabus::try_from)
    .transpose()
}

pub async fn insert_syllabus(db: &SqlitePool, new: &NewSyllabus) -> Result<Syllabus, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let submission_date = today();

    let id = sqlx::query(
        r#"
        INSERT INTO syllabi (course_id, lecturer_id, status, submission_date, created_at, updated_at, data)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.course_id)
    .bind(new.lecturer_id)
    .bind(new.status.as_str())
    .bind(&submission_date)
    .bind(&now)
    .bind(&now)
    .bind(&new.data)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Syllabus {
        id,
        course_id: new.course_id,
        lecturer_id: new.lecturer_id,
        status: new.status,
        submission_date,
        created_at: now.clone(),
        updated_at: now,
        data: new.data.clone(),
    })
}

/// Writes back the mutable columns of `syllabus` and bumps `updated_at`,
/// on the struct as well as in the table.
pub async fn update_syllabus(db: &SqlitePool, syllabus: &mut Syllabus) -> Result<bool, sqlx::Error> {
    syllabus.updated_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE syllabi
        SET course_id = ?, status = ?, submission_date = ?, updated_at = ?, data = ?
        WHERE id = ?
        "#,
    )
    .bind(syllabus.course_id)
    .bind(syllabus.status.as_str())
    .bind(&syllabus.submission_date)
    .bind(&syllabus.updated_at)
    .bind(&syllabus.data)
    .bind(syllabus.id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_status(
    db: &SqlitePool,
    id: i64,
    status: SyllabusStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE syllabi SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Removes the record for good. Its comments go with it.
pub async fn delete_syllabus(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM syllabi WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Makes `%`, `_` and `\` in user input match literally under `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Dashboard cards matching `filter`, newest submission first.
pub async fn fetch_cards(db: &SqlitePool, filter: &CardFilter) -> Result<Vec<Card>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            s.id,
            s.status,
            s.submission_date,
            COALESCE(c.name, '') AS course_name,
            COALESCE(d.name, '') AS department_name,
            u.name AS lecturer_name
        FROM syllabi s
        JOIN users u ON u.id = s.lecturer_id
        LEFT JOIN courses c ON c.id = s.course_id
        LEFT JOIN departments d ON d.id = c.department_id
        "#,
    );

    if filter.deleted {
        query.push(" WHERE s.status = 'Deleted'");
    } else {
        query.push(" WHERE s.status <> 'Deleted'");
    }

    if let Some(lecturer_id) = filter.lecturer_id {
        query.push(" AND s.lecturer_id = ").push_bind(lecturer_id);
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        query
            .push(" AND (c.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR d.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR u.name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(from) = &filter.from_date {
        query.push(" AND s.submission_date >= ").push_bind(from.clone());
    }
    if let Some(to) = &filter.to_date {
        query.push(" AND s.submission_date <= ").push_bind(to.clone());
    }

    if !filter.statuses.is_empty() {
        query.push(" AND s.status IN (");
        let mut statuses = query.separated(", ");
        for status in &filter.statuses {
            statuses.push_bind(status.as_str());
        }
        statuses.push_unseparated(")");
    }

    query.push(" ORDER BY s.submission_date DESC, s.id DESC");

    query
        .build_query_as::<CardRecord>()
        .fetch_all(db)
        .await?
        .into_iter()
        .map(Card::try_from)
        .collect()
}

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A comment joined with its author's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub syllabus_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentEntry {
    pub name: String,
    pub message: String,
    pub time: String,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub syllabus_id: i64,
    pub comments: Vec<CommentEntry>,
}

impl CommentEntry {
    pub fn from_comment(comment: Comment, current_user_id: i64) -> Self {
        Self {
            is_current_user: comment.user_id == current_user_id,
            name: comment.author_name,
            message: comment.content,
            time: display_time(&comment.created_at),
        }
    }
}

fn display_time(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

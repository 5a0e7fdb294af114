use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_INSTRUCTOR: &str = "Instructor";
pub const ROLE_MANAGER: &str = "Manager";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    /// Managers see and approve every lecturer's syllabi.
    pub fn is_manager(&self) -> bool {
        self.role == ROLE_MANAGER
    }
}

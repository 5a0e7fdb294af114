use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::{DraftPersistence, SqliteDraftPersistence};
use crate::draft::DraftStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub drafts: DraftStore,
    pub persistence: Arc<dyn DraftPersistence>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State backed by `db` for both the catalog and draft records.
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            persistence: Arc::new(SqliteDraftPersistence::new(db.clone())),
            drafts: DraftStore::in_memory(),
            config: Arc::new(config),
            db,
        }
    }
}

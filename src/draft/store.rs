//! Per-user drafts held between form actions.
//!
//! Every user has at most one cached draft. Each draft sits behind its own
//! async mutex, so overlapping requests for the same user (two browser tabs)
//! apply their edits one after the other. Edits can still be lost at the
//! form level: list actions resubmit the whole list, and the later request
//! overwrites whatever the earlier one wrote.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::debug;

use super::Draft;
use crate::models::User;

pub type SharedDraft = Arc<Mutex<Draft>>;

/// Backing map for [`DraftStore`].
pub trait DraftCache: Send + Sync {
    /// Returns the entry for `user_id`, inserting `make()` first when there
    /// is none. Lookup and insert happen atomically.
    fn get_or_insert_with(&self, user_id: i64, make: &mut dyn FnMut() -> Draft) -> SharedDraft;

    fn get(&self, user_id: i64) -> Option<SharedDraft>;

    fn insert(&self, user_id: i64, draft: SharedDraft);

    fn remove(&self, user_id: i64) -> Option<SharedDraft>;

    /// Removes the entry for `user_id` only while it is still `draft`.
    fn remove_if_same(&self, user_id: i64, draft: &SharedDraft) -> bool;
}

#[derive(Default)]
pub struct InMemoryDraftCache {
    drafts: RwLock<HashMap<i64, SharedDraft>>,
}

impl InMemoryDraftCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftCache for InMemoryDraftCache {
    fn get_or_insert_with(&self, user_id: i64, make: &mut dyn FnMut() -> Draft) -> SharedDraft {
        // a panicking writer cannot leave the map half-updated, so poisoning is ignored
        if let Some(draft) = self
            .drafts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
        {
            return draft.clone();
        }

        self.drafts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(make())))
            .clone()
    }

    fn get(&self, user_id: i64) -> Option<SharedDraft> {
        self.drafts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
            .cloned()
    }

    fn insert(&self, user_id: i64, draft: SharedDraft) {
        self.drafts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id, draft);
    }

    fn remove(&self, user_id: i64) -> Option<SharedDraft> {
        self.drafts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&user_id)
    }

    fn remove_if_same(&self, user_id: i64, draft: &SharedDraft) -> bool {
        let mut drafts = self
            .drafts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match drafts.get(&user_id) {
            Some(current) if Arc::ptr_eq(current, draft) => {
                drafts.remove(&user_id);
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct DraftStore {
    cache: Arc<dyn DraftCache>,
}

impl DraftStore {
    pub fn new(cache: Arc<dyn DraftCache>) -> Self {
        Self { cache }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDraftCache::new()))
    }

    /// The user's draft, created blank on first access.
    pub fn get(&self, user: &User) -> SharedDraft {
        self.cache.get_or_insert_with(user.id, &mut || {
            debug!("creating new draft for user {}", user.id);
            Draft::for_lecturer(user)
        })
    }

    /// Makes `draft` the user's current draft, dropping any previous one.
    pub fn replace(&self, user_id: i64, draft: Draft) -> SharedDraft {
        let shared = Arc::new(Mutex::new(draft));
        self.cache.insert(user_id, shared.clone());
        shared
    }

    /// The user's cached draft, without creating one.
    pub fn peek(&self, user_id: i64) -> Option<SharedDraft> {
        self.cache.get(user_id)
    }

    /// Drops the user's cached draft if it is backed by `record_id`.
    pub async fn discard_record(&self, user_id: i64, record_id: i64) -> bool {
        let Some(shared) = self.cache.get(user_id) else {
            return false;
        };
        let draft = shared.lock().await;
        if draft.id != record_id {
            return false;
        }

        let removed = self.cache.remove_if_same(user_id, &shared);
        if removed {
            debug!("dropped cached draft of user {} backed by syllabus {}", user_id, record_id);
        }
        removed
    }

    pub fn invalidate(&self, user_id: i64) {
        if self.cache.remove(user_id).is_some() {
            debug!("invalidated cached draft for user {}", user_id);
        }
    }
}

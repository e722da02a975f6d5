use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::model::entity::{ProfileUpdate, UserRecord};
use crate::model::error::{DatabaseError, DatabaseResult};
use crate::model::store::{MergeFn, UserStore};

/// Process-local store. The map lock is held across read-merge-write, the
/// merge itself never awaits.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> DatabaseError {
    DatabaseError::LockPoisoned(e.to_string())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, user_id: &str) -> DatabaseResult<Option<UserRecord>> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get(user_id).cloned())
    }

    async fn create(&self, record: UserRecord) -> DatabaseResult<UserRecord> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if guard.contains_key(record.id()) {
            return Err(DatabaseError::Conflict(record.id().to_string()));
        }
        guard.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        data: ProfileUpdate,
    ) -> DatabaseResult<Option<UserRecord>> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get_mut(user_id).map(|record| {
            record.apply_profile(&data);
            record.clone()
        }))
    }

    async fn update_atomic(
        &self,
        user_id: &str,
        merge: MergeFn,
    ) -> DatabaseResult<Option<UserRecord>> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let Some(record) = guard.get_mut(user_id) else {
            return Ok(None);
        };

        let next = merge(record.ledger());
        record.set_ledger(next);
        Ok(Some(record.clone()))
    }
}

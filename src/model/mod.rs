mod access;
pub use access::{AccessError, AccessResult, check_access};

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult, ValidationError, ValidationResult};

pub mod ledger;

mod repo;
pub use repo::{ResourceType, ResourceTyped};

mod store;
pub use store::{MemoryUserStore, MergeFn, PgUserStore, UserStore};

use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ModelManager {
    store: Arc<dyn UserStore>,
}

impl ModelManager {
    pub fn new<S: UserStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }
}

//! Record store backends.
//!
//! Every backend has to make [`UserStore::update_atomic`] a single logical
//! unit per user: two concurrent calls for the same id must observe each
//! other's writes, never the same pre-update state.

use async_trait::async_trait;

use crate::model::entity::{ProfileUpdate, UserRecord};
use crate::model::error::DatabaseResult;
use crate::model::ledger::LedgerState;

mod memory;
pub use memory::MemoryUserStore;

mod postgres;
pub use postgres::PgUserStore;

/// Receives the current ledger fields and returns the new ones.
pub type MergeFn = Box<dyn FnOnce(LedgerState) -> LedgerState + Send>;

#[async_trait]
pub trait UserStore: std::fmt::Debug + Send + Sync {
    async fn get(&self, user_id: &str) -> DatabaseResult<Option<UserRecord>>;

    /// Fails with [`crate::model::DatabaseError::Conflict`] if the id is taken.
    async fn create(&self, record: UserRecord) -> DatabaseResult<UserRecord>;

    async fn update_profile(
        &self,
        user_id: &str,
        data: ProfileUpdate,
    ) -> DatabaseResult<Option<UserRecord>>;

    /// Runs `merge` against the stored ledger and persists the result
    /// atomically. `None` if no record exists for `user_id`.
    async fn update_atomic(
        &self,
        user_id: &str,
        merge: MergeFn,
    ) -> DatabaseResult<Option<UserRecord>>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::types::Json;

use crate::model::DbConnection;
use crate::model::entity::{ProfileUpdate, UserRecord};
use crate::model::error::{DatabaseError, DatabaseResult};
use crate::model::ledger::{LedgerState, LessonRef, ProgressMap};
use crate::model::store::{MergeFn, UserStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: Option<String>,
    selected_avatar: Option<String>,
    progress: Json<ProgressMap>,
    total_score: i64,
    last_active_lesson: Option<Json<LessonRef>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        let ledger = LedgerState {
            progress: row.progress.0,
            total_score: row.total_score,
            last_active_lesson: row.last_active_lesson.map(|l| l.0),
        };
        UserRecord::from_parts(row.id, row.email, row.selected_avatar, ledger, row.created_at)
    }
}

/// `users` table backend. Progress updates lock the row with
/// `SELECT ... FOR UPDATE` inside a transaction.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: DbConnection,
}

impl PgUserStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, user_id: &str) -> DatabaseResult<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn create(&self, record: UserRecord) -> DatabaseResult<UserRecord> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"INSERT INTO users (id, email, selected_avatar, progress, total_score, created_at, last_active_lesson)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            RETURNING *"#,
        )
        .bind(record.id())
        .bind(record.email())
        .bind(record.selected_avatar())
        .bind(Json(record.progress()))
        .bind(record.total_score())
        .bind(record.created_at())
        .bind(record.last_active_lesson().map(Json))
        .fetch_optional(self.db.pool())
        .await?;

        row.map(UserRecord::from)
            .ok_or_else(|| DatabaseError::Conflict(record.id().to_string()))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        data: ProfileUpdate,
    ) -> DatabaseResult<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users SET selected_avatar = $1, email = COALESCE($2, email) WHERE id = $3 RETURNING *",
        )
        .bind(data.selected_avatar())
        .bind(data.email())
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(UserRecord::from))
    }

    #[tracing::instrument(skip(self, merge))]
    async fn update_atomic(
        &self,
        user_id: &str,
        merge: MergeFn,
    ) -> DatabaseResult<Option<UserRecord>> {
        let mut tx = self.db.pool().begin().await?;

        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let next = merge(UserRecord::from(row).ledger());

        let row: UserRow = sqlx::query_as(
            r#"UPDATE users
            SET progress = $1, total_score = $2, last_active_lesson = $3
            WHERE id = $4
            RETURNING *"#,
        )
        .bind(Json(&next.progress))
        .bind(next.total_score)
        .bind(next.last_active_lesson.as_ref().map(Json))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::trace!("ledger committed");

        Ok(Some(UserRecord::from(row)))
    }
}

use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Rejected request input. Maps to `InvalidRequest` on the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("moduleId is required")]
    MissingModuleId,
    #[error("topicId is required")]
    MissingTopicId,
    #[error("completed is required and must be a boolean")]
    MissingCompleted,
    #[error("score must be non-negative, got {0}")]
    NegativeScore(i64),
    #[error("selectedAvatar is required")]
    MissingAvatar,
}

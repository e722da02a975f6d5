use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::error::{DatabaseError, ValidationError, ValidationResult};
use crate::model::ledger::{self, CompletionEvent, LedgerState, LessonRef, ProgressMap};
use crate::model::repo::ResourceTyped;
use crate::model::{DatabaseResult, ModelManager};
use crate::web::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    id: String,
    email: Option<String>,
    selected_avatar: Option<String>,
    #[schema(value_type = Object)]
    progress: ProgressMap,
    total_score: i64,
    last_active_lesson: Option<LessonRef>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for UserRecord {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::UserRecord
    }
}

impl UserRecord {
    pub(crate) fn from_parts(
        id: String,
        email: Option<String>,
        selected_avatar: Option<String>,
        ledger: LedgerState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            selected_avatar,
            progress: ledger.progress,
            total_score: ledger.total_score,
            last_active_lesson: ledger.last_active_lesson,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn selected_avatar(&self) -> Option<&str> {
        self.selected_avatar.as_deref()
    }

    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    pub fn last_active_lesson(&self) -> Option<&LessonRef> {
        self.last_active_lesson.as_ref()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn ledger(&self) -> LedgerState {
        LedgerState {
            progress: self.progress.clone(),
            total_score: self.total_score,
            last_active_lesson: self.last_active_lesson.clone(),
        }
    }

    pub(crate) fn set_ledger(&mut self, ledger: LedgerState) {
        self.progress = ledger.progress;
        self.total_score = ledger.total_score;
        self.last_active_lesson = ledger.last_active_lesson;
    }

    pub(crate) fn apply_profile(&mut self, data: &ProfileUpdate) {
        self.selected_avatar = Some(data.selected_avatar.clone());
        if let Some(email) = &data.email {
            self.email = Some(email.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRecordCreate {
    pub id: String,
    pub email: String,
    pub selected_avatar: Option<String>,
}

impl UserRecordCreate {
    /// Email falls back to the token's email claim, then to an empty string.
    pub fn new(
        actor: &AuthenticatedUser,
        email: Option<String>,
        selected_avatar: Option<String>,
    ) -> Self {
        let email = email
            .or_else(|| actor.email().map(str::to_string))
            .unwrap_or_default();

        Self {
            id: actor.user_id().to_string(),
            email,
            selected_avatar,
        }
    }

    pub fn into_record(self, created_at: DateTime<Utc>) -> UserRecord {
        UserRecord::from_parts(
            self.id,
            Some(self.email),
            self.selected_avatar,
            LedgerState::default(),
            created_at,
        )
    }
}

/// Changes allowed on an existing profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    selected_avatar: String,
    email: Option<String>,
}

impl ProfileUpdate {
    pub fn new(selected_avatar: Option<String>, email: Option<String>) -> ValidationResult<Self> {
        let selected_avatar = selected_avatar
            .filter(|a| !a.is_empty())
            .ok_or(ValidationError::MissingAvatar)?;

        Ok(Self {
            selected_avatar,
            email: email.filter(|e| !e.is_empty()),
        })
    }

    pub fn selected_avatar(&self) -> &str {
        &self.selected_avatar
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl UserRecord {
    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: &str,
    ) -> DatabaseResult<Option<Self>> {
        mm.store().get(id).await
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserRecordCreate,
    ) -> DatabaseResult<Self> {
        mm.store().create(data.into_record(Utc::now())).await
    }

    /// First-contact create. If another request created the record in the
    /// meantime, the same body is applied to that record instead: the avatar
    /// (and email) when an avatar is given, otherwise the stored record is
    /// returned unchanged.
    pub async fn create_or_update(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        email: Option<String>,
        selected_avatar: Option<String>,
    ) -> DatabaseResult<Self> {
        let create = UserRecordCreate::new(actor, email.clone(), selected_avatar.clone());

        match Self::create(mm, actor, create).await {
            Err(DatabaseError::Conflict(id)) => {
                tracing::debug!(user_id = %id, "record created concurrently, updating instead");
                let current = match ProfileUpdate::new(selected_avatar, email) {
                    Ok(update) => mm.store().update_profile(&id, update).await?,
                    Err(_) => mm.store().get(&id).await?,
                };
                current.ok_or(DatabaseError::Conflict(id))
            }
            other => other,
        }
    }

    pub async fn update_profile(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ProfileUpdate,
    ) -> DatabaseResult<Option<Self>> {
        mm.store().update_profile(&self.id, data).await
    }

    /// Merges `event` into the stored ledger as one atomic unit.
    /// Returns `None` when the record does not exist.
    #[tracing::instrument(skip(mm, _actor))]
    pub async fn record_completion(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: &str,
        event: CompletionEvent,
    ) -> DatabaseResult<Option<Self>> {
        let user_id = id.to_string();
        mm.store()
            .update_atomic(
                id,
                Box::new(move |state| {
                    let outcome = ledger::merge_completion(state, &event, Utc::now());
                    if outcome.credited > 0 {
                        tracing::debug!(
                            user_id = %user_id,
                            module_id = event.module_id(),
                            topic_id = event.topic_id(),
                            credited = outcome.credited,
                            "topic credited"
                        );
                    }
                    outcome.state
                }),
            )
            .await
    }
}

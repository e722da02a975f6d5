use serde::Deserialize;

use crate::model::{ValidationError, ledger::CompletionEvent};

/// Body of `PUT /api/users/{user_id}/progress`.
///
/// Every field is optional at the JSON level so that missing values surface
/// as a [`ValidationError`] instead of a generic deserialization failure.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateRequest {
    pub module_id: Option<String>,
    pub topic_id: Option<String>,
    pub completed: Option<bool>,
    /// Credited to the total only when this event first completes the topic
    pub score: Option<i64>,
}

impl TryFrom<ProgressUpdateRequest> for CompletionEvent {
    type Error = ValidationError;

    fn try_from(req: ProgressUpdateRequest) -> Result<Self, Self::Error> {
        CompletionEvent::new(req.module_id, req.topic_id, req.completed, req.score)
    }
}

//! Progress ledger: merges completion events into a user's progress tree.
//!
//! The merge is a pure function over [`LedgerState`]. Stores call it while
//! holding whatever lock makes the read-merge-write sequence atomic for one
//! user, see [`crate::model::UserStore::update_atomic`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::error::{ValidationError, ValidationResult};

/// topicId -> status
pub type ModuleProgress = BTreeMap<String, TopicStatus>;

/// moduleId -> topicId -> status
pub type ProgressMap = BTreeMap<String, ModuleProgress>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicStatus {
    pub completed: bool,
    pub score: i64,
    /// First moment the topic was completed. Never overwritten.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub module_id: String,
    pub topic_id: String,
}

/// A validated "mark topic" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    module_id: String,
    topic_id: String,
    completed: bool,
    score: Option<i64>,
}

impl CompletionEvent {
    pub fn new(
        module_id: Option<String>,
        topic_id: Option<String>,
        completed: Option<bool>,
        score: Option<i64>,
    ) -> ValidationResult<Self> {
        let module_id = module_id
            .filter(|m| !m.is_empty())
            .ok_or(ValidationError::MissingModuleId)?;
        let topic_id = topic_id
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTopicId)?;
        let completed = completed.ok_or(ValidationError::MissingCompleted)?;

        if let Some(score) = score {
            if score < 0 {
                return Err(ValidationError::NegativeScore(score));
            }
        }

        Ok(Self {
            module_id,
            topic_id,
            completed,
            score,
        })
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn score(&self) -> Option<i64> {
        self.score
    }
}

/// The three fields a progress update is allowed to touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub progress: ProgressMap,
    pub total_score: i64,
    pub last_active_lesson: Option<LessonRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub state: LedgerState,
    /// Score added to the total by this event, 0 on replays.
    pub credited: i64,
}

/// Applies `event` to `state`.
///
/// Crediting only happens on the not-completed -> completed transition, so
/// replaying the same event any number of times credits the topic once.
/// The `completed` flag is sticky: a `completed: false` event keeps an already
/// completed topic completed, otherwise a later replay could credit it again.
pub fn merge_completion(
    mut state: LedgerState,
    event: &CompletionEvent,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let module = state
        .progress
        .entry(event.module_id.clone())
        .or_default();
    let current = module.get(&event.topic_id).cloned().unwrap_or_default();

    let is_new_completion = event.completed && !current.completed;

    let completed_at = match current.completed_at {
        Some(at) => Some(at),
        None if event.completed => Some(now),
        None => None,
    };

    let updated = TopicStatus {
        completed: current.completed || event.completed,
        score: event.score.unwrap_or(current.score),
        completed_at,
    };
    module.insert(event.topic_id.clone(), updated);

    let credited = match (is_new_completion, event.score) {
        (true, Some(score)) => score,
        _ => 0,
    };
    state.total_score = state.total_score.saturating_add(credited);

    state.last_active_lesson = Some(LessonRef {
        module_id: event.module_id.clone(),
        topic_id: event.topic_id.clone(),
    });

    MergeOutcome { state, credited }
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn event(module: &str, topic: &str, completed: bool, score: Option<i64>) -> CompletionEvent {
        CompletionEvent::new(
            Some(module.to_string()),
            Some(topic.to_string()),
            Some(completed),
            score,
        )
        .unwrap()
    }

    fn status(state: &LedgerState, module: &str, topic: &str) -> TopicStatus {
        state.progress[module][topic].clone()
    }

    #[test]
    fn test_first_completion_credits_score() {
        let t1 = Utc::now();
        let out = merge_completion(LedgerState::default(), &event("m1", "t1", true, Some(5)), t1);

        assert_eq!(out.credited, 5);
        assert_eq!(out.state.total_score, 5);
        assert_eq!(
            status(&out.state, "m1", "t1"),
            TopicStatus {
                completed: true,
                score: 5,
                completed_at: Some(t1),
            }
        );
    }

    #[test]
    fn test_replay_is_idempotent() {
        let t1 = Utc::now();
        let ev = event("m1", "t1", true, Some(10));

        let first = merge_completion(LedgerState::default(), &ev, t1);
        let second = merge_completion(first.state, &ev, t1 + Duration::minutes(5));

        assert_eq!(second.credited, 0);
        assert_eq!(second.state.total_score, 10);
        assert_eq!(status(&second.state, "m1", "t1").completed_at, Some(t1));
    }

    #[test]
    fn test_score_correction_does_not_credit() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(30);
        let t3 = t2 + Duration::seconds(30);

        let out = merge_completion(LedgerState::default(), &event("m1", "t1", true, Some(5)), t1);
        let out = merge_completion(out.state, &event("m1", "t1", true, Some(5)), t2);
        assert_eq!(out.state.total_score, 5);

        let out = merge_completion(out.state, &event("m1", "t1", true, Some(9)), t3);
        let topic = status(&out.state, "m1", "t1");
        assert_eq!(topic.score, 9);
        assert_eq!(topic.completed_at, Some(t1));
        assert_eq!(out.state.total_score, 5);
    }

    #[test]
    fn test_uncomplete_event_keeps_completion() {
        let t1 = Utc::now();
        let out = merge_completion(LedgerState::default(), &event("m1", "t1", true, Some(7)), t1);
        let out = merge_completion(out.state, &event("m1", "t1", false, None), t1 + Duration::hours(1));

        let topic = status(&out.state, "m1", "t1");
        assert!(topic.completed);
        assert_eq!(topic.completed_at, Some(t1));
        assert_eq!(topic.score, 7);

        // re-completing must not credit a second time
        let out = merge_completion(out.state, &event("m1", "t1", true, Some(7)), t1 + Duration::hours(2));
        assert_eq!(out.credited, 0);
        assert_eq!(out.state.total_score, 7);
    }

    #[test]
    fn test_incomplete_event_records_without_credit() {
        let now = Utc::now();
        let out = merge_completion(LedgerState::default(), &event("m1", "t1", false, Some(3)), now);

        assert_eq!(out.credited, 0);
        assert_eq!(out.state.total_score, 0);
        assert_eq!(
            status(&out.state, "m1", "t1"),
            TopicStatus {
                completed: false,
                score: 3,
                completed_at: None,
            }
        );

        // completion after a scored attempt credits the completing event's score only
        let out = merge_completion(out.state, &event("m1", "t1", true, None), now);
        assert_eq!(out.credited, 0);
        assert_eq!(status(&out.state, "m1", "t1").score, 3);
        assert_eq!(status(&out.state, "m1", "t1").completed_at, Some(now));
    }

    #[test]
    fn test_lazy_structure_leaves_other_entries_untouched() {
        let now = Utc::now();
        let out = merge_completion(LedgerState::default(), &event("m1", "t1", true, Some(1)), now);
        let before = out.state.progress.clone();

        let out = merge_completion(out.state, &event("m2", "t9", false, None), now);

        assert_eq!(out.state.progress.len(), 2);
        assert_eq!(out.state.progress["m1"], before["m1"]);
        assert_eq!(out.state.progress["m2"].len(), 1);
        assert_eq!(status(&out.state, "m2", "t9"), TopicStatus::default());
    }

    #[test]
    fn test_last_active_always_updates() {
        let now = Utc::now();
        let out = merge_completion(LedgerState::default(), &event("m1", "t1", true, Some(1)), now);
        let out = merge_completion(out.state, &event("m3", "t2", false, None), now);

        assert_eq!(
            out.state.last_active_lesson,
            Some(LessonRef {
                module_id: "m3".to_string(),
                topic_id: "t2".to_string(),
            })
        );
    }

    #[test]
    fn test_event_validation() {
        let missing_module = CompletionEvent::new(None, Some("t".into()), Some(true), None);
        assert_eq!(missing_module, Err(ValidationError::MissingModuleId));

        let empty_topic = CompletionEvent::new(Some("m".into()), Some(String::new()), Some(true), None);
        assert_eq!(empty_topic, Err(ValidationError::MissingTopicId));

        let missing_completed = CompletionEvent::new(Some("m".into()), Some("t".into()), None, None);
        assert_eq!(missing_completed, Err(ValidationError::MissingCompleted));

        let negative = CompletionEvent::new(Some("m".into()), Some("t".into()), Some(true), Some(-1));
        assert_eq!(negative, Err(ValidationError::NegativeScore(-1)));
    }

    #[test]
    fn test_topic_status_wire_format() {
        let json = serde_json::json!({ "completed": true, "score": 4, "completedAt": null });
        let status: TopicStatus = serde_json::from_value(json).unwrap();
        assert!(status.completed);
        assert_eq!(status.score, 4);

        // rows written before scores existed
        let partial: TopicStatus = serde_json::from_value(serde_json::json!({ "completed": false })).unwrap();
        assert_eq!(partial, TopicStatus::default());
    }
}

use super::board::{QuestBoard, QuestView};
use super::rate_limit::ListenRateLimiter;
use crate::catalog::Catalog;
use serde::Serialize;
use std::sync::Mutex;

/// Expected operational rejections of a listen event. Authentication
/// failures are rejected upstream by the session extractor, before any
/// lookup happens.
#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error("recording \"{0}\" not found")]
    RecordingNotFound(String),
    #[error("listen quota exceeded, retry in {retry_after_sec}s")]
    RateLimited { retry_after_sec: u32 },
}

#[derive(Serialize, Debug)]
pub struct ListenReport {
    pub recording_id: String,
    pub quests: Vec<QuestView>,
    pub newly_completed: Vec<String>,
    /// Malformed quests hit by this event, stringified for the caller.
    /// Already logged where they occurred.
    pub data_errors: Vec<String>,
}

/// The listen event entry point: rate limit, recording lookup, then one
/// atomic pass over the quest board. The board lock spans the whole
/// read-apply sequence, so concurrent events serialize and no partial
/// update is ever visible. Persistence is not touched here; the flush task
/// picks the mutation up later.
pub fn process_listen_event(
    catalog: &Catalog,
    board: &Mutex<QuestBoard>,
    limiter: &ListenRateLimiter,
    identity: &str,
    recording_id: &str,
) -> Result<ListenReport, ListenError> {
    limiter
        .check_and_record(identity)
        .map_err(|retry_after_sec| ListenError::RateLimited { retry_after_sec })?;

    let recording = catalog
        .get_recording(recording_id)
        .ok_or_else(|| ListenError::RecordingNotFound(recording_id.to_owned()))?;

    let mut board = board.lock().unwrap();
    let update = board.handle_listen(recording);
    Ok(ListenReport {
        recording_id: recording.id.clone(),
        quests: board.quest_views(catalog),
        newly_completed: update.newly_completed,
        data_errors: update.data_errors.iter().map(|e| e.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::model::test_fixtures::artist_quest;
    use crate::quest::model::QuestStatus;
    use crate::quest::rate_limit::ListenRateLimitConfig;
    use crate::quest::store::{MemoryQuestStore, QuestDump};
    use std::time::Duration;

    fn setup(quota: u32) -> (Catalog, Mutex<QuestBoard>, ListenRateLimiter) {
        let catalog = Catalog::dummy();
        let dump = QuestDump {
            templates: vec![],
            quests: vec![artist_quest("qst_1", "art_1", 2)],
        };
        let board =
            Mutex::new(QuestBoard::initialize(Box::new(MemoryQuestStore::with_dump(dump))).unwrap());
        let limiter = ListenRateLimiter::new(ListenRateLimitConfig {
            quota,
            window: Duration::from_secs(60),
        });
        (catalog, board, limiter)
    }

    #[test]
    fn listen_advances_matching_quests_and_reports_views() {
        let (catalog, board, limiter) = setup(10);

        let report = process_listen_event(&catalog, &board, &limiter, "user:alice", "rec_1").unwrap();
        assert_eq!(report.quests[0].done, 1);
        assert_eq!(report.quests[0].status, QuestStatus::Active);
        assert!(report.newly_completed.is_empty());

        let report = process_listen_event(&catalog, &board, &limiter, "user:alice", "rec_2").unwrap();
        assert_eq!(report.quests[0].done, 2);
        assert_eq!(report.quests[0].status, QuestStatus::Completed);
        assert_eq!(report.newly_completed, vec!["qst_1".to_owned()]);
    }

    #[test]
    fn unknown_recording_is_rejected_without_touching_state() {
        let (catalog, board, limiter) = setup(10);

        let result = process_listen_event(&catalog, &board, &limiter, "user:alice", "rec_404");
        assert!(matches!(result, Err(ListenError::RecordingNotFound(_))));
        assert_eq!(board.lock().unwrap().quests()[0].done(), 0);
    }

    #[test]
    fn exceeding_the_quota_rejects_before_any_lookup() {
        let (catalog, board, limiter) = setup(1);

        process_listen_event(&catalog, &board, &limiter, "user:alice", "rec_1").unwrap();
        let result = process_listen_event(&catalog, &board, &limiter, "user:alice", "rec_2");
        assert!(matches!(result, Err(ListenError::RateLimited { .. })));
        assert_eq!(board.lock().unwrap().quests()[0].done(), 1);

        // A different identity still has its own quota.
        assert!(process_listen_event(&catalog, &board, &limiter, "user:bob", "rec_2").is_ok());
    }
}

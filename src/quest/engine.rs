use super::matching::matches;
use super::model::{Quest, QuestDataError, QuestStatus};
use crate::catalog::Recording;

/// What a single listen event did to a single quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Quest is terminal, nothing can change it.
    Frozen,
    /// The recording was already counted; repeated events never double-count.
    AlreadyCounted,
    /// The constraint set rejected the recording.
    NoMatch,
    /// The recording was counted, the quest stays active.
    Progressed,
    /// The recording was counted and filled the quota; the quest is now
    /// completed and its reward (if any) unlocked.
    Completed,
}

impl ListenOutcome {
    pub fn changed_state(&self) -> bool {
        matches!(self, ListenOutcome::Progressed | ListenOutcome::Completed)
    }
}

/// Applies one listen event to one quest, in place. Exactly one logical
/// transition per call; progress is monotonic and completion is terminal.
///
/// A quest that fails its integrity check is left untouched and the error
/// is returned so the caller can surface it.
pub fn apply_listen_event(
    quest: &mut Quest,
    recording: &Recording,
) -> Result<ListenOutcome, QuestDataError> {
    quest.check_integrity()?;

    if quest.state.status != QuestStatus::Active {
        return Ok(ListenOutcome::Frozen);
    }
    if quest.state.matched.contains(&recording.id) {
        return Ok(ListenOutcome::AlreadyCounted);
    }
    if !matches(recording, &quest.params) {
        return Ok(ListenOutcome::NoMatch);
    }

    quest.state.matched.insert(&recording.id);
    if quest.state.matched.len() == quest.params.required_count {
        quest.state.status = QuestStatus::Completed;
        return Ok(ListenOutcome::Completed);
    }
    Ok(ListenOutcome::Progressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures::recording;
    use crate::quest::model::test_fixtures::{artist_quest, quest};
    use crate::quest::model::QuestParams;

    #[test]
    fn two_matching_listens_complete_a_two_count_quest() {
        let mut quest = artist_quest("qst_1", "art_1", 2);
        let rec_1 = recording("rec_1", &["art_1"], Some(2000));
        let rec_2 = recording("rec_2", &["art_1"], Some(2003));

        let outcome = apply_listen_event(&mut quest, &rec_1).unwrap();
        assert_eq!(outcome, ListenOutcome::Progressed);
        assert_eq!(quest.state.matched.iter().collect::<Vec<_>>(), vec!["rec_1"]);
        assert_eq!(quest.state.status, QuestStatus::Active);

        let outcome = apply_listen_event(&mut quest, &rec_2).unwrap();
        assert_eq!(outcome, ListenOutcome::Completed);
        assert_eq!(
            quest.state.matched.iter().collect::<Vec<_>>(),
            vec!["rec_1", "rec_2"]
        );
        assert_eq!(quest.state.status, QuestStatus::Completed);
    }

    #[test]
    fn reapplying_the_same_event_is_a_noop() {
        let mut quest = artist_quest("qst_1", "art_1", 2);
        let rec_1 = recording("rec_1", &["art_1"], Some(2000));

        apply_listen_event(&mut quest, &rec_1).unwrap();
        let snapshot = quest.clone();

        let outcome = apply_listen_event(&mut quest, &rec_1).unwrap();
        assert_eq!(outcome, ListenOutcome::AlreadyCounted);
        assert_eq!(quest, snapshot);
    }

    #[test]
    fn completed_quest_is_frozen() {
        let mut quest = artist_quest("qst_1", "art_1", 1);
        apply_listen_event(&mut quest, &recording("rec_1", &["art_1"], None)).unwrap();
        assert_eq!(quest.state.status, QuestStatus::Completed);
        let snapshot = quest.clone();

        // A fresh matching recording must not touch a terminal quest.
        let outcome =
            apply_listen_event(&mut quest, &recording("rec_2", &["art_1"], None)).unwrap();
        assert_eq!(outcome, ListenOutcome::Frozen);
        assert_eq!(quest, snapshot);
    }

    #[test]
    fn year_range_rejection_records_nothing() {
        let mut quest = quest(
            "qst_1",
            QuestParams {
                start_year: Some(1990),
                end_year: Some(1999),
                ..QuestParams::default()
            },
        );
        let outcome = apply_listen_event(&mut quest, &recording("rec_1", &[], Some(2005))).unwrap();
        assert_eq!(outcome, ListenOutcome::NoMatch);
        assert!(quest.state.matched.is_empty());
    }

    #[test]
    fn matched_count_never_exceeds_required_count() {
        let mut quest = artist_quest("qst_1", "art_1", 3);
        for i in 0..10 {
            let rec = recording(&format!("rec_{}", i), &["art_1"], None);
            apply_listen_event(&mut quest, &rec).unwrap();
            assert!(quest.state.matched.len() <= quest.params.required_count);
        }
        assert_eq!(quest.state.matched.len(), 3);
        assert_eq!(quest.state.status, QuestStatus::Completed);
    }

    #[test]
    fn progress_is_monotonic_across_arbitrary_events() {
        let mut quest = artist_quest("qst_1", "art_1", 4);
        let events = [
            recording("rec_1", &["art_1"], Some(1991)),
            recording("rec_1", &["art_1"], Some(1991)),
            recording("rec_2", &["art_9"], None),
            recording("rec_3", &["art_1"], None),
            recording("rec_2", &["art_9"], None),
            recording("rec_4", &["art_1"], Some(2020)),
        ];
        let mut last_len = 0;
        for event in events.iter() {
            apply_listen_event(&mut quest, event).unwrap();
            assert!(quest.state.matched.len() >= last_len);
            last_len = quest.state.matched.len();
        }
        assert_eq!(last_len, 3);
    }

    #[test]
    fn malformed_quest_is_surfaced_and_untouched() {
        let mut bad = artist_quest("qst_1", "art_1", 2);
        bad.params.required_count = 0;
        let snapshot = bad.clone();

        let result = apply_listen_event(&mut bad, &recording("rec_1", &["art_1"], None));
        assert!(result.is_err());
        assert_eq!(bad, snapshot);
    }
}

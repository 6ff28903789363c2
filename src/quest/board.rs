use super::engine::apply_listen_event;
use super::model::{Quest, QuestDataError, QuestReward, QuestState, QuestStatus, QuestTemplateType};
use super::store::{QuestDump, QuestStore};
use super::title::render_title;
use crate::catalog::{Catalog, Recording};
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, error};

/// Everything a presentation layer needs to render a quest without
/// reimplementing matching logic.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestView {
    pub id: String,
    pub title: String,
    pub done: usize,
    pub total: usize,
    pub status: QuestStatus,
    pub reward: Option<QuestReward>,
}

/// Result of fanning one listen event out over the whole board.
#[derive(Debug, Default)]
pub struct ListenUpdate {
    /// Ids of quests this event completed.
    pub newly_completed: Vec<String>,
    /// Malformed quests encountered while applying the event. Each one
    /// halted processing of that quest only.
    pub data_errors: Vec<QuestDataError>,
    pub changed: bool,
}

/// The quest board: the ordered quest list plus its template table, loaded
/// once from an injected store and mutated only here. Callers wrap it in a
/// mutex and hold the lock across read-apply-mark, which gives the
/// single-writer discipline concurrent listen events need.
pub struct QuestBoard {
    store: Box<dyn QuestStore>,
    dump: QuestDump,
    dirty: bool,
}

impl QuestBoard {
    pub fn initialize(store: Box<dyn QuestStore>) -> Result<QuestBoard> {
        let dump = store.load()?;
        debug!(
            "Quest board loaded: {} templates, {} quests",
            dump.templates.len(),
            dump.quests.len()
        );
        Ok(QuestBoard {
            store,
            dump,
            dirty: false,
        })
    }

    pub fn quests(&self) -> &[Quest] {
        &self.dump.quests
    }

    fn template_type_of(&self, quest: &Quest) -> QuestTemplateType {
        self.dump
            .templates
            .iter()
            .find(|t| t.id == quest.template_id)
            .map(|t| t.template_type)
            .unwrap_or(QuestTemplateType::Unknown)
    }

    /// Applies one listen event to every quest, in stable order. Quests are
    /// independent; a malformed one is reported and skipped, the rest
    /// continue.
    pub fn handle_listen(&mut self, recording: &Recording) -> ListenUpdate {
        let mut update = ListenUpdate::default();
        for quest in self.dump.quests.iter_mut() {
            match apply_listen_event(quest, recording) {
                Ok(outcome) => {
                    if outcome.changed_state() {
                        update.changed = true;
                    }
                    if outcome == super::engine::ListenOutcome::Completed {
                        update.newly_completed.push(quest.id.clone());
                    }
                }
                Err(data_error) => {
                    error!("Skipping malformed quest: {}", data_error);
                    update.data_errors.push(data_error);
                }
            }
        }
        if update.changed {
            self.dirty = true;
        }
        update
    }

    /// Quests whose reward unlocks the given recording. Read-only, input
    /// order preserved.
    pub fn quests_granting_recording(&self, recording_id: &str) -> Vec<&Quest> {
        self.dump
            .quests
            .iter()
            .filter(|quest| match &quest.reward {
                Some(QuestReward::Song { entity_id }) => entity_id == recording_id,
                None => false,
            })
            .collect()
    }

    pub fn quest_views(&self, catalog: &Catalog) -> Vec<QuestView> {
        self.dump
            .quests
            .iter()
            .map(|quest| QuestView {
                id: quest.id.clone(),
                title: render_title(quest, self.template_type_of(quest), catalog),
                done: quest.done(),
                total: quest.total(),
                status: quest.state.status,
                reward: quest.reward.clone(),
            })
            .collect()
    }

    /// Administrative full reset: every quest back to active with empty
    /// progress.
    pub fn reset_all(&mut self) {
        for quest in self.dump.quests.iter_mut() {
            quest.state = QuestState::default();
        }
        self.dirty = true;
    }

    /// Persists the quest set if anything changed since the last flush.
    /// Returns whether a write happened.
    pub fn flush_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.store.save(&self.dump)?;
        self.dirty = false;
        Ok(true)
    }
}

use super::matched::MatchedRecordings;
use serde::{Deserialize, Serialize};

/// Semantic type of a quest, used to pick a title rendering. Matching is
/// uniform across types; the type never alters which events count.
///
/// Params fields each type reads for its title:
///
/// | type                | params read                          |
/// |---------------------|--------------------------------------|
/// | listen_count        | required_count                       |
/// | listen_by_year      | required_count, start_year, end_year |
/// | listen_by_genre     | required_count, genre_id             |
/// | listen_between_time | required_count, start_time, end_time |
/// | listen_to_album     | required_count, album_id             |
/// | travel_amount       | required_count                       |
/// | unknown             | required_count                       |
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestTemplateType {
    ListenCount,
    ListenByYear,
    ListenByGenre,
    ListenBetweenTime,
    ListenToAlbum,
    TravelAmount,
    #[serde(other)]
    Unknown,
}

/// Static reference data, read-only.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct QuestTemplate {
    pub id: String,
    #[serde(rename = "type")]
    pub template_type: QuestTemplateType,
}

fn default_required_count() -> usize {
    1
}

/// Constraint set of a quest. Absent fields impose no restriction.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct QuestParams {
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub genre_id: Option<String>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub start_year: Option<u16>,
    #[serde(default)]
    pub end_year: Option<u16>,
    /// Time of day, "HH:MM".
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default = "default_required_count")]
    pub required_count: usize,
}

impl Default for QuestParams {
    fn default() -> Self {
        QuestParams {
            artist_id: None,
            genre_id: None,
            album_id: None,
            start_year: None,
            end_year: None,
            start_time: None,
            end_time: None,
            required_count: default_required_count(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestReward {
    Song { entity_id: String },
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Active,
    /// Terminal, never reverts to Active except through a full reset.
    Completed,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct QuestState {
    pub status: QuestStatus,
    #[serde(default)]
    pub matched: MatchedRecordings,
}

impl Default for QuestState {
    fn default() -> Self {
        QuestState {
            status: QuestStatus::Active,
            matched: MatchedRecordings::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestDataError {
    #[error("quest \"{quest_id}\" has required_count 0")]
    ZeroRequiredCount { quest_id: String },
    #[error("quest \"{quest_id}\" has {matched} matched recordings but required_count is {required}")]
    OverMatched {
        quest_id: String,
        matched: usize,
        required: usize,
    },
    #[error("quest \"{quest_id}\" status {status:?} is inconsistent with {matched}/{required} progress")]
    StatusMismatch {
        quest_id: String,
        status: QuestStatus,
        matched: usize,
        required: usize,
    },
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Quest {
    pub id: String,
    pub template_id: String,
    #[serde(default)]
    pub params: QuestParams,
    #[serde(default)]
    pub state: QuestState,
    #[serde(default)]
    pub reward: Option<QuestReward>,
}

impl Quest {
    pub fn done(&self) -> usize {
        self.state.matched.len()
    }

    pub fn total(&self) -> usize {
        self.params.required_count
    }

    /// Consistency check run before every mutation. A violation means the
    /// seed or persisted data is corrupt; the caller must surface it, not
    /// swallow it.
    pub fn check_integrity(&self) -> Result<(), QuestDataError> {
        let matched = self.state.matched.len();
        let required = self.params.required_count;
        if required == 0 {
            return Err(QuestDataError::ZeroRequiredCount {
                quest_id: self.id.clone(),
            });
        }
        if matched > required {
            return Err(QuestDataError::OverMatched {
                quest_id: self.id.clone(),
                matched,
                required,
            });
        }
        let should_be_completed = matched >= required;
        let is_completed = self.state.status == QuestStatus::Completed;
        if should_be_completed != is_completed {
            return Err(QuestDataError::StatusMismatch {
                quest_id: self.id.clone(),
                status: self.state.status,
                matched,
                required,
            });
        }
        Ok(())
    }
}

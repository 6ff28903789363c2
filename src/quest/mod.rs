mod board;
mod engine;
mod listen;
mod matched;
mod matching;
mod model;
mod rate_limit;
mod store;
mod title;

pub use board::{ListenUpdate, QuestBoard, QuestView};
pub use engine::{apply_listen_event, ListenOutcome};
pub use listen::{process_listen_event, ListenError, ListenReport};
pub use matched::MatchedRecordings;
pub use matching::matches;
pub use model::{
    Quest, QuestDataError, QuestParams, QuestReward, QuestState, QuestStatus, QuestTemplate,
    QuestTemplateType,
};
pub use rate_limit::{ListenRateLimitConfig, ListenRateLimiter};
pub use store::{FileQuestStore, MemoryQuestStore, QuestDump, QuestStore};

#[cfg(test)]
pub use model::test_fixtures;

use super::model::{Quest, QuestTemplate};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::PathBuf,
};

/// Full contents of the quest store: static templates plus the ordered
/// quest list with its progress state.
#[derive(Serialize, Deserialize, Default, Clone)]
pub struct QuestDump {
    pub templates: Vec<QuestTemplate>,
    pub quests: Vec<Quest>,
}

/// Durable storage for the quest set. The board loads once at startup and
/// writes the full set back; batching writes is the caller's concern.
pub trait QuestStore: Send + Sync {
    fn load(&self) -> Result<QuestDump>;
    fn save(&self, dump: &QuestDump) -> Result<()>;
}

/// Flat JSON file store. A missing file loads as an empty dump.
pub struct FileQuestStore {
    file_path: PathBuf,
}

impl FileQuestStore {
    pub fn new(file_path: PathBuf) -> FileQuestStore {
        FileQuestStore { file_path }
    }
}

impl QuestStore for FileQuestStore {
    fn load(&self) -> Result<QuestDump> {
        let mut file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(QuestDump::default())
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Could not open {}", self.file_path.display()))
            }
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Could not parse {}", self.file_path.display()))
    }

    fn save(&self, dump: &QuestDump) -> Result<()> {
        let json_string = serde_json::to_string_pretty(dump)?;
        let mut file = File::create(&self.file_path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryQuestStore {
    dump: std::sync::Mutex<QuestDump>,
}

impl MemoryQuestStore {
    pub fn with_dump(dump: QuestDump) -> MemoryQuestStore {
        MemoryQuestStore {
            dump: std::sync::Mutex::new(dump),
        }
    }
}

impl QuestStore for MemoryQuestStore {
    fn load(&self) -> Result<QuestDump> {
        Ok(self.dump.lock().unwrap().clone())
    }

    fn save(&self, dump: &QuestDump) -> Result<()> {
        *self.dump.lock().unwrap() = dump.clone();
        Ok(())
    }
}

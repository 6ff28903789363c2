use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genre_ids: Vec<String>,
}

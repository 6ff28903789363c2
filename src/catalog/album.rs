use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub year: Option<u16>,
    /// Recording ids in album order.
    pub recording_ids: Vec<String>,
}

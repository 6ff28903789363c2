use serde::{Deserialize, Serialize};

#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Debug)]
pub enum AudioFormat {
    OggVorbis,
    Mp3,
    Aac,
    Flac,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AudioInfo {
    pub duration_sec: u32,
    pub format: AudioFormat,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Spotify,
    Youtube,
    Bandcamp,
    Soundcloud,
    Other,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PlatformLink {
    pub platform: Platform,
    pub url: String,
}

/// A single recording (song). Read-only reference data as far as the quest
/// engine is concerned.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Recording {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub variant: Option<String>,
    /// Release year; older imports may not carry one.
    #[serde(default)]
    pub year: Option<u16>,
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub audio: Option<AudioInfo>,
    #[serde(default)]
    pub links: Vec<PlatformLink>,
}

use super::{Album, Artist, Genre, Recording};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Problem {
    MalformedId { id: String },
    DuplicateId { id: String },
    DanglingArtistRef { from: String, artist_id: String },
    DanglingAlbumRef { from: String, album_id: String },
    DanglingGenreRef { from: String, genre_id: String },
    DanglingRecordingRef { from: String, recording_id: String },
}

pub struct CatalogBuildResult {
    pub catalog: Option<Catalog>,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    artists: HashMap<String, Artist>,
    albums: HashMap<String, Album>,
    genres: HashMap<String, Genre>,
    recordings: HashMap<String, Recording>,
}

fn parse_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file_text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&file_text).with_context(|| format!("Could not parse {}", path.display()))
}

fn index_by_id<T, F: Fn(&T) -> &str>(
    items: Vec<T>,
    id_of: F,
    id_regex: &Regex,
    problems: &mut Vec<Problem>,
) -> HashMap<String, T> {
    let mut out = HashMap::new();
    for item in items {
        let id = id_of(&item).to_owned();
        if !id_regex.is_match(&id) {
            problems.push(Problem::MalformedId { id });
            continue;
        }
        if out.contains_key(&id) {
            problems.push(Problem::DuplicateId { id });
            continue;
        }
        out.insert(id, item);
    }
    out
}

impl Catalog {
    pub fn build(root_dir: &Path) -> Result<CatalogBuildResult> {
        let id_regex =
            Regex::new("^[a-z]+_\\w+$").expect("Invalid Regex, this should be fixed at runtime.");
        let mut problems = vec![];

        let artists = index_by_id(
            parse_json_file::<Artist>(&root_dir.join("artists.json"))?,
            |a| &a.id,
            &id_regex,
            &mut problems,
        );
        let albums = index_by_id(
            parse_json_file::<Album>(&root_dir.join("albums.json"))?,
            |a| &a.id,
            &id_regex,
            &mut problems,
        );
        let genres = index_by_id(
            parse_json_file::<Genre>(&root_dir.join("genres.json"))?,
            |g| &g.id,
            &id_regex,
            &mut problems,
        );
        let recordings = index_by_id(
            parse_json_file::<Recording>(&root_dir.join("recordings.json"))?,
            |r| &r.id,
            &id_regex,
            &mut problems,
        );

        let fatal = problems
            .iter()
            .any(|p| matches!(p, Problem::MalformedId { .. } | Problem::DuplicateId { .. }));

        let catalog = Catalog {
            artists,
            albums,
            genres,
            recordings,
        };

        #[cfg(not(feature = "no_checks"))]
        catalog.check_references(&mut problems);

        Ok(CatalogBuildResult {
            catalog: if fatal { None } else { Some(catalog) },
            problems,
        })
    }

    #[cfg(not(feature = "no_checks"))]
    fn check_references(&self, problems: &mut Vec<Problem>) {
        for recording in self.recordings.values() {
            for artist_id in recording.artist_ids.iter() {
                if !self.artists.contains_key(artist_id) {
                    problems.push(Problem::DanglingArtistRef {
                        from: recording.id.clone(),
                        artist_id: artist_id.clone(),
                    });
                }
            }
            for genre_id in recording.genre_ids.iter() {
                if !self.genres.contains_key(genre_id) {
                    problems.push(Problem::DanglingGenreRef {
                        from: recording.id.clone(),
                        genre_id: genre_id.clone(),
                    });
                }
            }
            if let Some(album_id) = &recording.album_id {
                if !self.albums.contains_key(album_id) {
                    problems.push(Problem::DanglingAlbumRef {
                        from: recording.id.clone(),
                        album_id: album_id.clone(),
                    });
                }
            }
        }
        for album in self.albums.values() {
            for artist_id in album.artist_ids.iter() {
                if !self.artists.contains_key(artist_id) {
                    problems.push(Problem::DanglingArtistRef {
                        from: album.id.clone(),
                        artist_id: artist_id.clone(),
                    });
                }
            }
            for recording_id in album.recording_ids.iter() {
                if !self.recordings.contains_key(recording_id) {
                    problems.push(Problem::DanglingRecordingRef {
                        from: album.id.clone(),
                        recording_id: recording_id.clone(),
                    });
                }
            }
        }
    }

    pub fn infer_path() -> Option<PathBuf> {
        let mut current_dir = std::env::current_dir().ok()?;
        loop {
            let candidate = current_dir.join("catalog");
            if candidate.join("recordings.json").is_file() {
                return Some(candidate);
            }
            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }
        None
    }

    pub fn get_artist(&self, id: &str) -> Option<&Artist> {
        self.artists.get(id)
    }

    pub fn get_album(&self, id: &str) -> Option<&Album> {
        self.albums.get(id)
    }

    pub fn get_genre(&self, id: &str) -> Option<&Genre> {
        self.genres.get(id)
    }

    pub fn get_recording(&self, id: &str) -> Option<&Recording> {
        self.recordings.get(id)
    }

    pub fn iter_artists(&self) -> impl Iterator<Item = &Artist> {
        self.artists.values()
    }

    pub fn iter_albums(&self) -> impl Iterator<Item = &Album> {
        self.albums.values()
    }

    pub fn iter_genres(&self) -> impl Iterator<Item = &Genre> {
        self.genres.values()
    }

    pub fn iter_recordings(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.values()
    }

    pub fn get_artists_count(&self) -> usize {
        self.artists.len()
    }

    pub fn get_albums_count(&self) -> usize {
        self.albums.len()
    }

    pub fn get_genres_count(&self) -> usize {
        self.genres.len()
    }

    pub fn get_recordings_count(&self) -> usize {
        self.recordings.len()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn seed_minimal(dir: &Path) {
        write_file(
            dir,
            "artists.json",
            r#"[{ "id": "art_1", "name": "First Artist" }]"#,
        );
        write_file(
            dir,
            "albums.json",
            r#"[{ "id": "alb_1", "title": "First Album", "artist_ids": ["art_1"], "recording_ids": ["rec_1"] }]"#,
        );
        write_file(dir, "genres.json", r#"[{ "id": "gen_1", "name": "Ambient" }]"#);
        write_file(
            dir,
            "recordings.json",
            r#"[{ "id": "rec_1", "title": "Opener", "artist_ids": ["art_1"], "album_id": "alb_1", "genre_ids": ["gen_1"], "year": 1998 }]"#,
        );
    }

    #[test]
    fn builds_catalog_from_flat_files() {
        let dir = tempfile::tempdir().unwrap();
        seed_minimal(dir.path());

        let result = Catalog::build(dir.path()).unwrap();
        assert!(result.problems.is_empty());
        let catalog = result.catalog.unwrap();
        assert_eq!(catalog.get_artists_count(), 1);
        assert_eq!(catalog.get_recording("rec_1").unwrap().year, Some(1998));
    }

    #[test]
    fn duplicate_id_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        seed_minimal(dir.path());
        write_file(
            dir.path(),
            "artists.json",
            r#"[{ "id": "art_1", "name": "A" }, { "id": "art_1", "name": "B" }]"#,
        );

        let result = Catalog::build(dir.path()).unwrap();
        assert!(result.catalog.is_none());
        assert!(result
            .problems
            .iter()
            .any(|p| matches!(p, Problem::DuplicateId { id } if id == "art_1")));
    }

    #[test]
    fn dangling_reference_is_reported_but_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        seed_minimal(dir.path());
        write_file(
            dir.path(),
            "recordings.json",
            r#"[{ "id": "rec_1", "title": "Opener", "artist_ids": ["art_404"] }]"#,
        );

        let result = Catalog::build(dir.path()).unwrap();
        assert!(result.catalog.is_some());
        assert!(result
            .problems
            .iter()
            .any(|p| matches!(p, Problem::DanglingArtistRef { artist_id, .. } if artist_id == "art_404")));
    }
}

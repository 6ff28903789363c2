use crate::catalog::Catalog;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchItemType {
    Artist,
    Album,
    Genre,
    Recording,
}

struct IndexedItem {
    item_type: SearchItemType,
    item_id: String,
    name: String,
    lowercase_name: String,
}

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct SearchResult {
    pub item_type: SearchItemType,
    pub item_id: String,
    pub name: String,
}

/// Linear substring search over catalog names. No scoring or ranking;
/// results come back in index order, truncated at the caller's limit.
pub struct SearchVault {
    items: Vec<IndexedItem>,
}

impl SearchVault {
    pub fn new(catalog: &Catalog) -> SearchVault {
        let mut items: Vec<IndexedItem> = vec![];

        for artist in catalog.iter_artists() {
            items.push(IndexedItem {
                item_type: SearchItemType::Artist,
                item_id: artist.id.clone(),
                name: artist.name.clone(),
                lowercase_name: artist.name.to_lowercase(),
            });
        }

        for album in catalog.iter_albums() {
            items.push(IndexedItem {
                item_type: SearchItemType::Album,
                item_id: album.id.clone(),
                name: album.title.clone(),
                lowercase_name: album.title.to_lowercase(),
            });
        }

        for genre in catalog.iter_genres() {
            items.push(IndexedItem {
                item_type: SearchItemType::Genre,
                item_id: genre.id.clone(),
                name: genre.name.clone(),
                lowercase_name: genre.name.to_lowercase(),
            });
        }

        for recording in catalog.iter_recordings() {
            items.push(IndexedItem {
                item_type: SearchItemType::Recording,
                item_id: recording.id.clone(),
                name: recording.title.clone(),
                lowercase_name: recording.title.to_lowercase(),
            });
        }

        SearchVault { items }
    }

    pub fn search<T: AsRef<str>>(&self, query: T, limit: usize) -> Vec<SearchResult> {
        let query = query.as_ref().trim().to_lowercase();
        if query.is_empty() {
            return vec![];
        }
        self.items
            .iter()
            .filter(|item| item.lowercase_name.contains(&query))
            .take(limit)
            .map(|item| SearchResult {
                item_type: item.item_type,
                item_id: item.item_id.clone(),
                name: item.name.clone(),
            })
            .collect()
    }
}

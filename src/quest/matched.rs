use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered set of recording ids a quest has counted so far. Insertion order
/// is preserved, containment is O(1), and a recording id can only ever be
/// inserted once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MatchedRecordings {
    order: Vec<String>,
    index: HashSet<String>,
}

impl MatchedRecordings {
    pub fn new() -> MatchedRecordings {
        MatchedRecordings::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, recording_id: &str) -> bool {
        self.index.contains(recording_id)
    }

    /// Returns false without modifying anything if the id is already present.
    pub fn insert(&mut self, recording_id: &str) -> bool {
        if !self.index.insert(recording_id.to_owned()) {
            return false;
        }
        self.order.push(recording_id.to_owned());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }
}

impl TryFrom<Vec<String>> for MatchedRecordings {
    type Error = String;

    fn try_from(order: Vec<String>) -> Result<Self, Self::Error> {
        let mut index = HashSet::with_capacity(order.len());
        for id in order.iter() {
            if !index.insert(id.clone()) {
                return Err(format!("duplicate matched recording id \"{}\"", id));
            }
        }
        Ok(MatchedRecordings { order, index })
    }
}

impl From<MatchedRecordings> for Vec<String> {
    fn from(matched: MatchedRecordings) -> Vec<String> {
        matched.order
    }
}

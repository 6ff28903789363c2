use super::model::QuestParams;
use crate::catalog::Recording;

/// Decides whether a listen event for `recording` satisfies `params`. All
/// present constraints must hold; absent constraints impose no restriction,
/// so an empty constraint set matches everything.
///
/// A recording without a year never satisfies a year bound.
///
/// TODO: extend matching to genre_id, album_id and the start_time/end_time
/// window; listen_by_genre, listen_to_album and listen_between_time
/// templates declare them but only artist and year constraints are checked
/// today, and quests were seeded against that behavior.
pub fn matches(recording: &Recording, params: &QuestParams) -> bool {
    if let Some(artist_id) = &params.artist_id {
        if !recording.artist_ids.iter().any(|id| id == artist_id) {
            return false;
        }
    }
    if let Some(start_year) = params.start_year {
        match recording.year {
            Some(year) if year >= start_year => {}
            _ => return false,
        }
    }
    if let Some(end_year) = params.end_year {
        match recording.year {
            Some(year) if year <= end_year => {}
            _ => return false,
        }
    }
    true
}

use super::model::{Quest, QuestTemplateType};
use crate::catalog::Catalog;

fn songs(count: usize) -> String {
    if count == 1 {
        "a song".to_owned()
    } else {
        format!("{} songs", count)
    }
}

/// Renders a human readable quest title. Exhaustive over the template type
/// with an explicit fallback arm; entity names are resolved through the
/// catalog and fall back to the raw id when the reference is dangling.
pub fn render_title(quest: &Quest, template_type: QuestTemplateType, catalog: &Catalog) -> String {
    let count = quest.params.required_count;
    match template_type {
        QuestTemplateType::ListenCount => format!("Listen to {}", songs(count)),
        QuestTemplateType::ListenByYear => {
            match (quest.params.start_year, quest.params.end_year) {
                (Some(start), Some(end)) => {
                    format!("Listen to {} released between {} and {}", songs(count), start, end)
                }
                (Some(start), None) => {
                    format!("Listen to {} released in {} or later", songs(count), start)
                }
                (None, Some(end)) => {
                    format!("Listen to {} released in {} or earlier", songs(count), end)
                }
                (None, None) => format!("Listen to {}", songs(count)),
            }
        }
        QuestTemplateType::ListenByGenre => {
            let genre = quest
                .params
                .genre_id
                .as_deref()
                .map(|id| {
                    catalog
                        .get_genre(id)
                        .map(|g| g.name.clone())
                        .unwrap_or_else(|| id.to_owned())
                })
                .unwrap_or_else(|| "any genre".to_owned());
            format!("Listen to {} of {}", songs(count), genre)
        }
        QuestTemplateType::ListenBetweenTime => {
            match (&quest.params.start_time, &quest.params.end_time) {
                (Some(start), Some(end)) => {
                    format!("Listen to {} between {} and {}", songs(count), start, end)
                }
                _ => format!("Listen to {}", songs(count)),
            }
        }
        QuestTemplateType::ListenToAlbum => {
            let album = quest
                .params
                .album_id
                .as_deref()
                .map(|id| {
                    catalog
                        .get_album(id)
                        .map(|a| a.title.clone())
                        .unwrap_or_else(|| id.to_owned())
                })
                .unwrap_or_else(|| "an album".to_owned());
            format!("Listen to {} from \"{}\"", songs(count), album)
        }
        QuestTemplateType::TravelAmount => {
            format!("Travel through the catalog with {}", songs(count))
        }
        QuestTemplateType::Unknown => format!("Complete {} listens", count),
    }
}

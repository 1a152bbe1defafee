//! Tile search within one category.

use crate::model::board::{Category, Tile};

/// Tiles whose label, spoken text or emoji contain `query`.
///
/// Matching is case-insensitive; a blank query returns every tile in order.
pub fn search_tiles<'a>(category: &'a Category, query: &str) -> Vec<&'a Tile> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return category.tiles.iter().collect();
    }

    category
        .tiles
        .iter()
        .filter(|tile| {
            tile.label.to_lowercase().contains(&query)
                || tile
                    .speak
                    .as_deref()
                    .is_some_and(|speak| speak.to_lowercase().contains(&query))
                || tile
                    .emoji
                    .as_deref()
                    .is_some_and(|emoji| emoji.contains(&query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::search_tiles;
    use crate::model::board::{Category, Tile};

    fn category() -> Category {
        let mut done = Tile::with_id("done", "all done");
        done.speak = Some("Finished".to_string());
        done.emoji = Some("✅".to_string());
        Category::new("core", "Core").with_tiles(vec![Tile::with_id("want", "Want"), done])
    }

    #[test]
    fn matches_label_speak_and_emoji() {
        let category = category();
        let ids = |query: &str| -> Vec<String> {
            search_tiles(&category, query)
                .into_iter()
                .map(|tile| tile.id.clone())
                .collect()
        };
        assert_eq!(ids("WANT"), ["want"]);
        assert_eq!(ids("finish"), ["done"]);
        assert_eq!(ids("✅"), ["done"]);
        assert_eq!(ids("  "), ["want", "done"]);
        assert!(ids("zebra").is_empty());
    }
}

//! Starter board shown on first run.

use crate::model::board::{Board, Category, Tile};

/// Builds the first-run board.
pub fn demo_board() -> Board {
    Board::new(
        "My Quick Board",
        vec![
            Category::new("core", "Core").with_tiles(vec![
                tile("i", "I", "🧑", Some("#e2e8f0")),
                tile("want", "want", "🤲", Some("#fde68a")),
                tile("help", "help", "🆘", Some("#fecaca")),
                tile("please", "please", "🙏", Some("#bbf7d0")),
                tile("yes", "yes", "👍", Some("#d9f99d")),
                tile("no", "no", "👎", Some("#fecdd3")),
                tile("more", "more", "➕", Some("#e9d5ff")),
                tile("done", "all done", "✅", Some("#bae6fd")),
            ]),
            Category::new("feel", "Feelings").with_tiles(vec![
                tile("happy", "happy", "😊", None),
                tile("sad", "sad", "😢", None),
                tile("angry", "angry", "😠", None),
                tile("tired", "tired", "😴", None),
                tile("hurt", "hurt", "🤕", None),
            ]),
            Category::new("food", "Food & Drink").with_tiles(vec![
                tile("water", "water", "💧", None),
                tile("juice", "juice", "🧃", None),
                tile("milk", "milk", "🥛", None),
                tile("apple", "apple", "🍎", None),
                tile("banana", "banana", "🍌", None),
                tile("sandwich", "sandwich", "🥪", None),
            ]),
        ],
    )
}

fn tile(id: &str, label: &str, emoji: &str, color: Option<&str>) -> Tile {
    let mut tile = Tile::with_id(id, label);
    tile.emoji = Some(emoji.to_string());
    tile.color = color.map(str::to_string);
    tile
}

use proptest::prelude::*;
use speaktiles_core::service::share_codec::{decode, encode, share_link};
use speaktiles_core::{
    demo_board, import_from_url, Board, BoardError, BoardStore, Category, MemoryKvRepository, Tile,
};
use url::Url;

fn non_blank(pattern: &'static str) -> impl Strategy<Value = String> {
    pattern.prop_filter("must not be blank", |value: &String| !value.trim().is_empty())
}

fn tile_strategy() -> impl Strategy<Value = Tile> {
    (
        non_blank("\\PC{1,8}"),
        non_blank("\\PC{1,12}"),
        proptest::option::of("\\PC{0,4}"),
        proptest::option::of("\\PC{0,24}"),
        proptest::option::of("\\PC{0,9}"),
        proptest::option::of("\\PC{0,20}"),
    )
        .prop_map(|(id, label, emoji, image_url, color, speak)| {
            let mut tile = Tile::with_id(id, label);
            tile.emoji = emoji;
            tile.image_url = image_url;
            tile.color = color;
            tile.speak = speak;
            tile
        })
}

fn category_strategy() -> impl Strategy<Value = Category> {
    (
        non_blank("\\PC{1,8}"),
        "\\PC{0,12}",
        proptest::collection::vec(tile_strategy(), 0..5),
    )
        .prop_map(|(id, name, tiles)| Category::new(id, name).with_tiles(tiles))
}

fn board_strategy() -> impl Strategy<Value = Board> {
    (
        "\\PC{0,16}",
        proptest::collection::vec(category_strategy(), 1..5),
    )
        .prop_map(|(name, categories)| {
            let mut category_ids = std::collections::HashSet::new();
            let mut tile_ids = std::collections::HashSet::new();
            let categories = categories
                .into_iter()
                .filter(|category| category_ids.insert(category.id.clone()))
                .map(|category| {
                    let tiles = category
                        .tiles
                        .iter()
                        .filter(|tile| tile_ids.insert(tile.id.clone()))
                        .cloned()
                        .collect();
                    Category::new(category.id, category.name).with_tiles(tiles)
                })
                .collect();
            Board::new(name, categories)
        })
}

proptest! {
    #[test]
    fn any_valid_board_survives_the_link(board in board_strategy()) {
        let token = encode(&board).unwrap();
        prop_assert!(token.is_ascii());
        prop_assert_eq!(decode(&token).unwrap(), board);
    }
}

#[test]
fn demo_board_round_trips_through_share_link() {
    let page = Url::parse("https://tiles.example/").unwrap();
    let link = share_link(&page, &demo_board()).unwrap();

    let repo = MemoryKvRepository::new();
    let mut store = BoardStore::open(&repo);
    let _ = store.delete_category("food").unwrap();

    let import = import_from_url(&mut store, &link).unwrap();
    assert!(import.outcome.is_ok());
    assert_eq!(import.cleaned_url.as_str(), "https://tiles.example/");
    assert_eq!(*store.board(), demo_board());
}

#[test]
fn bad_token_is_rejected_but_fragment_still_stripped() {
    let repo = MemoryKvRepository::new();
    let mut store = BoardStore::open(&repo);
    let before = store.snapshot();

    let url = Url::parse("https://tiles.example/app?x=1#board=%%%").unwrap();
    let import = import_from_url(&mut store, &url).unwrap();
    assert!(matches!(import.outcome, Err(BoardError::InvalidFormat(_))));
    assert_eq!(import.cleaned_url.as_str(), "https://tiles.example/app?x=1");
    assert_eq!(*store.snapshot(), *before);
}

#[test]
fn url_without_token_is_left_alone() {
    let repo = MemoryKvRepository::new();
    let mut store = BoardStore::open(&repo);
    let url = Url::parse("https://tiles.example/#settings").unwrap();
    assert!(import_from_url(&mut store, &url).is_none());
}

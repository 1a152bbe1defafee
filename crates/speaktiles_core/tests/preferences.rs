use speaktiles_core::db::open_db_in_memory;
use speaktiles_core::service::preferences_service::{
    SHOW_EMOJI_KEY, TILE_SIZE_KEY, VOICE_NAME_KEY,
};
use speaktiles_core::{
    KeyValueRepository, MemoryKvRepository, Preferences, PreferencesService, SqliteKvRepository,
};

#[test]
fn empty_store_loads_defaults() {
    let service = PreferencesService::new(MemoryKvRepository::new());
    assert_eq!(service.load(), Preferences::default());
}

#[test]
fn stored_values_round_trip_through_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let service = PreferencesService::new(SqliteKvRepository::new(&conn));

    assert_eq!(service.set_tile_size(200).unwrap(), 200);
    service.set_voice_name("  Samantha ").unwrap();
    service.set_show_emoji(false).unwrap();
    service.set_show_labels(false).unwrap();

    let reloaded = PreferencesService::new(SqliteKvRepository::new(&conn)).load();
    assert_eq!(reloaded.tile_size, 200);
    assert_eq!(reloaded.voice_name, "Samantha");
    assert!(!reloaded.show_emoji);
    assert!(!reloaded.show_labels);
    assert_eq!(reloaded.selected_voice(), Some("Samantha"));
}

#[test]
fn tile_size_is_snapped_before_storing() {
    let repo = MemoryKvRepository::new();
    let service = PreferencesService::new(&repo);

    assert_eq!(service.set_tile_size(5).unwrap(), 120);
    assert_eq!(repo.get(TILE_SIZE_KEY).unwrap().as_deref(), Some("120"));
    assert_eq!(service.set_tile_size(10_000).unwrap(), 260);
    assert_eq!(service.set_tile_size(144).unwrap(), 140);
}

#[test]
fn corrupt_field_falls_back_alone() {
    let repo = MemoryKvRepository::new();
    repo.put(SHOW_EMOJI_KEY, "not json").unwrap();
    repo.put(VOICE_NAME_KEY, "\"Daniel\"").unwrap();
    repo.put(TILE_SIZE_KEY, "999").unwrap();

    let loaded = PreferencesService::new(&repo).load();
    assert!(loaded.show_emoji);
    assert_eq!(loaded.voice_name, "Daniel");
    assert_eq!(loaded.tile_size, 260);
}

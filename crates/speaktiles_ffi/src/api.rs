//! Board, sharing and preference calls exposed to Dart.
//!
//! # Responsibility
//! - Expose board, share-link and preference use cases to Dart via FRB.
//! - Turn every core error into a plain envelope the UI can show.
//!
//! # Invariants
//! - No exported function panics.
//! - Each call opens the database, runs one use case and returns the
//!   resulting board.

use log::warn;
use speaktiles_core::db::open_db;
use speaktiles_core::service::share_codec::share_link;
use speaktiles_core::{
    core_version as core_version_inner, export_file_name, export_json, import_from_url,
    import_json, init_logging as init_logging_inner, ping as ping_inner, search_tiles,
    BoardStore, Commit, KeyValueRepository, Preferences, PreferencesService, SqliteKvRepository,
    StorageResult, StoreResult, Tile,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use url::Url;

const BOARD_DB_FILE_NAME: &str = "speaktiles.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Liveness probe for the Dart side; returns `"pong"`.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// `speaktiles_core` package version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Starts rolling file logs under the absolute `log_dir`.
///
/// Returns an empty string on success, otherwise the reason. Calling again
/// with the same arguments succeeds; other arguments are refused.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Board envelope returned by every board use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    /// Whether the request was accepted.
    pub ok: bool,
    /// Whether the board changed.
    pub changed: bool,
    /// Outcome text shown in the UI.
    pub message: String,
    /// Canonical board JSON after the call; empty when the DB could not open.
    pub board_json: String,
    /// Category the UI should show after the call.
    pub active_category_id: String,
}

impl BoardResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            message: message.into(),
            board_json: String::new(),
            active_category_id: String::new(),
        }
    }

    fn from_outcome<R: KeyValueRepository>(
        operation: &str,
        store: &BoardStore<R>,
        outcome: StoreResult<Commit>,
    ) -> Self {
        let (ok, changed, message) = match outcome {
            Ok(Commit::Unchanged) => (true, false, "No changes.".to_string()),
            Ok(Commit::Persisted) => (true, true, "Saved.".to_string()),
            Ok(Commit::PersistFailed(err)) => (
                true,
                true,
                format!("Changes applied but could not be saved: {err}"),
            ),
            Err(err) => (false, false, format!("{operation} failed: {err}")),
        };
        let board_json = match serde_json::to_string(store.board()) {
            Ok(json) => json,
            Err(err) => {
                return Self::failure(format!("{operation} failed: board is not serializable: {err}"))
            }
        };
        Self {
            ok,
            changed,
            message,
            board_json,
            active_category_id: store.active_category_id().to_string(),
        }
    }
}

/// Tile fields as entered in the tile editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileDraft {
    /// Existing tile id; `None` or blank creates a new tile.
    pub id: Option<String>,
    pub label: String,
    pub emoji: Option<String>,
    pub image_url: Option<String>,
    pub color: Option<String>,
    pub speak: Option<String>,
}

impl TileDraft {
    fn into_tile(self) -> Tile {
        let label = self.label.trim().to_string();
        let mut tile = match non_blank(self.id) {
            Some(id) => Tile::with_id(id, label),
            None => Tile::new(label),
        };
        tile.emoji = non_blank(self.emoji);
        tile.image_url = non_blank(self.image_url);
        tile.color = non_blank(self.color);
        tile.speak = non_blank(self.speak);
        tile
    }
}

/// Export file envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardExportResponse {
    pub ok: bool,
    pub message: String,
    /// Suggested download name, e.g. `my-board-board.json`.
    pub file_name: String,
    pub contents: String,
}

/// Share-link envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinkResponse {
    pub ok: bool,
    pub message: String,
    pub link: String,
}

/// Result of applying a shared link on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareImportResponse {
    /// Whether the URL carried a share token at all.
    pub handled: bool,
    /// Address to replace the current history entry with.
    pub cleaned_url: String,
    pub board: BoardResponse,
}

/// Search hits in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSearchResponse {
    pub ok: bool,
    pub message: String,
    /// Matching tile ids in board order.
    pub tile_ids: Vec<String>,
}

/// Preference envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesResponse {
    pub ok: bool,
    pub message: String,
    pub tile_size: u32,
    pub voice_name: String,
    pub show_emoji: bool,
    pub show_labels: bool,
    /// Grid columns derived from `tile_size`.
    pub grid_columns: u32,
}

impl PreferencesResponse {
    fn from_preferences(message: impl Into<String>, ok: bool, preferences: Preferences) -> Self {
        Self {
            ok,
            message: message.into(),
            grid_columns: preferences.grid_columns(),
            tile_size: preferences.tile_size,
            voice_name: preferences.voice_name,
            show_emoji: preferences.show_emoji,
            show_labels: preferences.show_labels,
        }
    }
}

/// Loads the current board.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardResponse {
    with_board_store("board_snapshot", |_| Ok(Commit::Unchanged))
}

/// Appends a `New N` category and makes it active.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_category() -> BoardResponse {
    with_board_store("board_add_category", |store| Ok(store.add_category().1))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_category(cat_id: String, name: String) -> BoardResponse {
    with_board_store("board_rename_category", |store| {
        store.set_active_category(&cat_id);
        Ok(store.rename_category(&cat_id, &name))
    })
}

/// Deletes a category; `active_category_id` is the category the UI shows.
///
/// # FFI contract
/// - Deleting the last category is rejected with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_category(cat_id: String, active_category_id: String) -> BoardResponse {
    with_board_store("board_delete_category", |store| {
        store.set_active_category(&active_category_id);
        store.delete_category(&cat_id)
    })
}

/// Replaces the tile with the same id, or appends a new tile.
#[flutter_rust_bridge::frb(sync)]
pub fn board_save_tile(cat_id: String, draft: TileDraft) -> BoardResponse {
    with_board_store("board_save_tile", |store| {
        store.set_active_category(&cat_id);
        store.save_tile(&cat_id, draft.into_tile())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_tile(cat_id: String, tile_id: String) -> BoardResponse {
    with_board_store("board_delete_tile", |store| {
        store.set_active_category(&cat_id);
        Ok(store.delete_tile(&cat_id, &tile_id))
    })
}

/// Moves a tile within its category; out-of-range indices are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn board_reorder_tiles(cat_id: String, from_index: u32, to_index: u32) -> BoardResponse {
    with_board_store("board_reorder_tiles", |store| {
        store.set_active_category(&cat_id);
        Ok(store.reorder_tiles(&cat_id, from_index as usize, to_index as usize))
    })
}

/// Moves a tile into another category at `to_index` (clamped).
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_tile(
    from_cat_id: String,
    to_cat_id: String,
    tile_id: String,
    to_index: u32,
) -> BoardResponse {
    with_board_store("board_move_tile", |store| {
        store.set_active_category(&to_cat_id);
        Ok(store.move_tile(&from_cat_id, &to_cat_id, &tile_id, to_index as usize))
    })
}

/// Replaces the board with an imported file's contents.
///
/// # FFI contract
/// - Invalid files return `ok=false`; the stored board is untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn board_import_json(contents: String) -> BoardResponse {
    with_board_store("board_import_json", |store| import_json(store, &contents))
}

/// Returns the current board as a downloadable JSON file.
#[flutter_rust_bridge::frb(sync)]
pub fn board_export_json() -> BoardExportResponse {
    let exported = open_board_db().and_then(|conn| {
        let store = BoardStore::open(SqliteKvRepository::new(&conn));
        let contents = export_json(store.board())
            .map_err(|err| format!("board_export_json failed: {err}"))?;
        Ok((export_file_name(&store.board().name), contents))
    });
    match exported {
        Ok((file_name, contents)) => BoardExportResponse {
            ok: true,
            message: "Board exported.".to_string(),
            file_name,
            contents,
        },
        Err(message) => BoardExportResponse {
            ok: false,
            message,
            file_name: String::new(),
            contents: String::new(),
        },
    }
}

/// Builds a share link for the current board from the page URL.
#[flutter_rust_bridge::frb(sync)]
pub fn board_share_link(page_url: String) -> ShareLinkResponse {
    let link = Url::parse(page_url.trim())
        .map_err(|err| format!("board_share_link failed: invalid page url: {err}"))
        .and_then(|page| {
            let conn = open_board_db()?;
            let store = BoardStore::open(SqliteKvRepository::new(&conn));
            share_link(&page, store.board()).map_err(|err| format!("board_share_link failed: {err}"))
        });
    match link {
        Ok(link) => ShareLinkResponse {
            ok: true,
            message: "Share link created.".to_string(),
            link: link.into(),
        },
        Err(message) => ShareLinkResponse {
            ok: false,
            message,
            link: String::new(),
        },
    }
}

/// Applies a `#board=` link once on load.
///
/// # FFI contract
/// - `handled=false` when the URL carries no share token; nothing changes.
/// - When handled, `cleaned_url` never carries the share fragment, whether
///   or not the token was valid.
#[flutter_rust_bridge::frb(sync)]
pub fn board_import_from_url(url: String) -> ShareImportResponse {
    let parsed = match Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(err) => {
            return ShareImportResponse {
                handled: false,
                cleaned_url: url,
                board: BoardResponse::failure(format!(
                    "board_import_from_url failed: invalid url: {err}"
                )),
            }
        }
    };

    let conn = match open_board_db() {
        Ok(conn) => conn,
        Err(message) => {
            return ShareImportResponse {
                handled: false,
                cleaned_url: url,
                board: BoardResponse::failure(message),
            }
        }
    };
    let mut store = BoardStore::open(SqliteKvRepository::new(&conn));
    match import_from_url(&mut store, &parsed) {
        Some(import) => ShareImportResponse {
            handled: true,
            cleaned_url: import.cleaned_url.into(),
            board: BoardResponse::from_outcome("board_import_from_url", &store, import.outcome),
        },
        None => ShareImportResponse {
            handled: false,
            cleaned_url: parsed.into(),
            board: BoardResponse::from_outcome("board_import_from_url", &store, Ok(Commit::Unchanged)),
        },
    }
}

/// Filters one category's tiles by label, spoken text or emoji.
#[flutter_rust_bridge::frb(sync)]
pub fn board_search_tiles(cat_id: String, query: String) -> TileSearchResponse {
    let found = open_board_db().and_then(|conn| {
        let store = BoardStore::open(SqliteKvRepository::new(&conn));
        let category = store
            .board()
            .category(&cat_id)
            .ok_or_else(|| format!("board_search_tiles failed: unknown category `{cat_id}`"))?;
        Ok(search_tiles(category, &query)
            .into_iter()
            .map(|tile| tile.id.clone())
            .collect::<Vec<_>>())
    });
    match found {
        Ok(tile_ids) => TileSearchResponse {
            ok: true,
            message: format!("Found {} tile(s).", tile_ids.len()),
            tile_ids,
        },
        Err(message) => TileSearchResponse {
            ok: false,
            message,
            tile_ids: Vec::new(),
        },
    }
}

/// Reads display and voice preferences.
#[flutter_rust_bridge::frb(sync)]
pub fn preferences_get() -> PreferencesResponse {
    with_preferences("preferences_get", |_| Ok(()))
}

/// Stores the tile size snapped onto the 120..=260 slider.
#[flutter_rust_bridge::frb(sync)]
pub fn preferences_set_tile_size(tile_size: u32) -> PreferencesResponse {
    with_preferences("preferences_set_tile_size", |service| {
        service.set_tile_size(tile_size).map(|_| ())
    })
}

/// Stores the synthesis voice name; blank selects the platform default.
#[flutter_rust_bridge::frb(sync)]
pub fn preferences_set_voice_name(voice_name: String) -> PreferencesResponse {
    with_preferences("preferences_set_voice_name", |service| {
        service.set_voice_name(&voice_name)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn preferences_set_show_emoji(show_emoji: bool) -> PreferencesResponse {
    with_preferences("preferences_set_show_emoji", |service| {
        service.set_show_emoji(show_emoji)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn preferences_set_show_labels(show_labels: bool) -> PreferencesResponse {
    with_preferences("preferences_set_show_labels", |service| {
        service.set_show_labels(show_labels)
    })
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("SPEAKTILES_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn open_board_db() -> Result<rusqlite::Connection, String> {
    open_db(resolve_board_db_path()).map_err(|err| format!("board DB open failed: {err}"))
}

fn with_board_store(
    operation: &str,
    f: impl FnOnce(&mut BoardStore<SqliteKvRepository<'_>>) -> StoreResult<Commit>,
) -> BoardResponse {
    let conn = match open_board_db() {
        Ok(conn) => conn,
        Err(message) => return BoardResponse::failure(format!("{operation} failed: {message}")),
    };
    let mut store = BoardStore::open(SqliteKvRepository::new(&conn));
    let outcome = f(&mut store);
    if let Ok(Commit::PersistFailed(err)) = &outcome {
        warn!("event=ffi_call module=ffi status=persist_failed operation={operation} error={err}");
    }
    BoardResponse::from_outcome(operation, &store, outcome)
}

fn with_preferences(
    operation: &str,
    f: impl FnOnce(&PreferencesService<SqliteKvRepository<'_>>) -> StorageResult<()>,
) -> PreferencesResponse {
    let conn = match open_board_db() {
        Ok(conn) => conn,
        Err(message) => {
            return PreferencesResponse::from_preferences(
                format!("{operation} failed: {message}"),
                false,
                Preferences::default(),
            )
        }
    };
    let service = PreferencesService::new(SqliteKvRepository::new(&conn));
    let (ok, message) = match f(&service) {
        Ok(()) => (true, "OK".to_string()),
        Err(err) => (false, format!("{operation} failed: {err}")),
    };
    PreferencesResponse::from_preferences(message, ok, service.load())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        board_add_category, board_delete_category, board_export_json, board_import_from_url,
        board_import_json, board_rename_category, board_save_tile, board_search_tiles,
        board_share_link, board_snapshot, core_version, init_logging, ping,
        preferences_set_tile_size, TileDraft,
    };
    use speaktiles_core::{demo_board, Board};
    use std::sync::{Mutex, MutexGuard};

    static BOARD_DB_LOCK: Mutex<()> = Mutex::new(());

    // Calls share one database file; stateful tests run one at a time.
    fn lock_board_db() -> MutexGuard<'static, ()> {
        BOARD_DB_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn snapshot_returns_valid_board_json() {
        let _guard = lock_board_db();
        let response = board_snapshot();
        assert!(response.ok, "{}", response.message);
        let board = Board::from_json(&response.board_json).expect("board json");
        assert!(board.category(&response.active_category_id).is_some());
    }

    #[test]
    fn added_category_becomes_active_and_can_be_renamed() {
        let _guard = lock_board_db();
        let added = board_add_category();
        assert!(added.ok && added.changed, "{}", added.message);
        let cat_id = added.active_category_id.clone();

        let renamed = board_rename_category(cat_id.clone(), "Places".to_string());
        assert!(renamed.ok, "{}", renamed.message);
        let board = Board::from_json(&renamed.board_json).expect("board json");
        assert_eq!(board.category(&cat_id).expect("category").name, "Places");

        let deleted = board_delete_category(cat_id.clone(), cat_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert_ne!(deleted.active_category_id, cat_id);
    }

    #[test]
    fn save_tile_rejects_blank_label() {
        let response = board_save_tile(
            "core".to_string(),
            TileDraft {
                label: "   ".to_string(),
                ..TileDraft::default()
            },
        );
        assert!(!response.ok);
        assert!(!response.changed);
    }

    #[test]
    fn import_rejects_foreign_json() {
        let response = board_import_json(r#"{"foo":1}"#.to_string());
        assert!(!response.ok);
        assert!(response.message.contains("board_import_json"));
    }

    #[test]
    fn share_link_round_trips_through_import() {
        let _guard = lock_board_db();
        let imported = board_import_json(
            serde_json::to_string(&demo_board()).expect("demo board json"),
        );
        assert!(imported.ok, "{}", imported.message);

        let link = board_share_link("https://tiles.example/app/".to_string());
        assert!(link.ok, "{}", link.message);
        assert!(link.link.contains("#board="));

        let applied = board_import_from_url(link.link);
        assert!(applied.handled);
        assert!(applied.board.ok, "{}", applied.board.message);
        assert_eq!(applied.cleaned_url, "https://tiles.example/app/");
        let board = Board::from_json(&applied.board.board_json).expect("board json");
        assert!(!board.categories.is_empty());
    }

    #[test]
    fn url_without_token_is_not_handled() {
        let response = board_import_from_url("https://tiles.example/#about".to_string());
        assert!(!response.handled);
        assert!(response.board.ok);
    }

    #[test]
    fn export_suggests_slugged_file_name() {
        let _guard = lock_board_db();
        let response = board_export_json();
        assert!(response.ok, "{}", response.message);
        assert!(response.file_name.ends_with("board.json"));
        assert!(Board::from_json(&response.contents).is_ok());
    }

    #[test]
    fn search_unknown_category_fails() {
        let response = board_search_tiles("missing-category".to_string(), "x".to_string());
        assert!(!response.ok);
        assert!(response.tile_ids.is_empty());
    }

    #[test]
    fn tile_size_is_snapped() {
        let response = preferences_set_tile_size(133);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.tile_size % 10, 0);
        assert!((120..=260).contains(&response.tile_size));
    }
}

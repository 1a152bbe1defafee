//! Board export/import as JSON files.
//!
//! File dialogs live in the host; this module only produces and consumes
//! file contents and names.

use crate::model::board::Board;
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::board_store::{BoardStore, Commit, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const EXPORT_SUFFIX: &str = "-board.json";

/// Pretty-printed canonical JSON of `board`.
pub fn export_json(board: &Board) -> serde_json::Result<String> {
    serde_json::to_string_pretty(board)
}

/// File name for an export: whitespace runs become `-`, lower-cased,
/// suffixed `-board.json`.
///
/// The name is not trimmed, so surrounding whitespace turns into edge
/// hyphens and an empty name exports as `-board.json`.
pub fn export_file_name(board_name: &str) -> String {
    let slug = WHITESPACE_RE.replace_all(board_name, "-").to_lowercase();
    format!("{slug}{EXPORT_SUFFIX}")
}

/// Replaces the store's board with the contents of an import file.
///
/// Anything without a valid `categories` list is rejected with
/// `InvalidFormat` and the current board stays.
pub fn import_json<R: KeyValueRepository>(
    store: &mut BoardStore<R>,
    contents: &str,
) -> StoreResult<Commit> {
    store.replace_board_json(contents)
}

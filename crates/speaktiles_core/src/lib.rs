//! Core domain logic for SpeakTiles.
//! This crate is the single source of truth for board invariants, offline
//! shell caching and the voice state machine.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod offline;
pub mod repo;
pub mod service;
pub mod voice;

pub use config::{CacheConfig, CacheVersion, VoiceConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    Board, BoardShapeError, Category, Tile, TileValidationError, TileVisual, PLACEHOLDER_GLYPH,
};
pub use model::demo::demo_board;
pub use model::phrase::PhraseBuffer;
pub use model::preferences::Preferences;
pub use offline::controller::{CacheController, ControllerPhase, FetchOutcome, ResponseSource};
pub use offline::request::{
    Network, NetworkError, RequestDestination, ResourceRequest, ResourceResponse,
};
pub use offline::runtime::{CacheRuntime, ControlMessage, LifecycleEvent};
pub use offline::OfflineError;
pub use repo::cache_repo::{CacheStorage, SqliteCacheRepository};
pub use repo::kv_repo::{KeyValueRepository, MemoryKvRepository, SqliteKvRepository, BOARD_KEY};
pub use repo::{StorageError, StorageResult};
pub use service::board_store::{BoardError, BoardStore, Commit, StoreResult};
pub use service::preferences_service::PreferencesService;
pub use service::search::search_tiles;
pub use service::share_codec::{import_from_url, ShareImport};
pub use service::transfer::{export_file_name, export_json, import_json};
pub use voice::engine::{RecognitionRequest, SpeechEngine, Utterance};
pub use voice::machine::VoiceController;
pub use voice::{Capability, RecognitionFailure, VoiceError, VoiceState};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Preference scalars, one durable key each.
//!
//! Reads never fail: a missing or unparsable key yields that field's default.

use crate::model::preferences::{normalize_tile_size, Preferences};
use crate::repo::kv_repo::KeyValueRepository;
use crate::repo::{StorageError, StorageResult};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const TILE_SIZE_KEY: &str = "tile-size";
pub const VOICE_NAME_KEY: &str = "voice-name";
pub const SHOW_EMOJI_KEY: &str = "show-emoji";
pub const SHOW_LABELS_KEY: &str = "show-labels";

pub struct PreferencesService<R: KeyValueRepository> {
    repo: R,
}

impl<R: KeyValueRepository> PreferencesService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads every preference, defaulting each field independently.
    pub fn load(&self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            tile_size: normalize_tile_size(self.read(TILE_SIZE_KEY, defaults.tile_size)),
            voice_name: self.read(VOICE_NAME_KEY, defaults.voice_name),
            show_emoji: self.read(SHOW_EMOJI_KEY, defaults.show_emoji),
            show_labels: self.read(SHOW_LABELS_KEY, defaults.show_labels),
        }
    }

    /// Stores the tile size snapped to the slider range; returns the stored value.
    pub fn set_tile_size(&self, value: u32) -> StorageResult<u32> {
        let normalized = normalize_tile_size(value);
        self.write(TILE_SIZE_KEY, &normalized)?;
        Ok(normalized)
    }

    pub fn set_voice_name(&self, value: &str) -> StorageResult<()> {
        self.write(VOICE_NAME_KEY, &value.trim())
    }

    pub fn set_show_emoji(&self, value: bool) -> StorageResult<()> {
        self.write(SHOW_EMOJI_KEY, &value)
    }

    pub fn set_show_labels(&self, value: bool) -> StorageResult<()> {
        self.write(SHOW_LABELS_KEY, &value)
    }

    fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.repo.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|_| {
                warn!("event=prefs_read module=prefs status=fallback reason=unparsable key={key}");
                default
            }),
            Ok(None) => default,
            Err(err) => {
                warn!("event=prefs_read module=prefs status=fallback reason=storage key={key} error={err}");
                default
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialize(err.to_string()))?;
        self.repo.put(key, &raw)
    }
}

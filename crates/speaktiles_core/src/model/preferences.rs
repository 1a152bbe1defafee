//! Display and voice preferences.
//!
//! Each field is persisted under its own key and falls back to its default
//! independently when missing or unreadable.

use serde::{Deserialize, Serialize};

pub const TILE_SIZE_MIN: u32 = 120;
pub const TILE_SIZE_MAX: u32 = 260;
pub const TILE_SIZE_STEP: u32 = 10;
pub const TILE_SIZE_DEFAULT: u32 = 140;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Tile height in logical pixels.
    pub tile_size: u32,
    /// Selected synthesis voice; empty means the platform default.
    pub voice_name: String,
    pub show_emoji: bool,
    pub show_labels: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE_DEFAULT,
            voice_name: String::new(),
            show_emoji: true,
            show_labels: true,
        }
    }
}

impl Preferences {
    /// Number of grid columns used for the current tile size.
    pub fn grid_columns(&self) -> u32 {
        if self.tile_size >= 220 {
            4
        } else if self.tile_size >= 160 {
            6
        } else {
            8
        }
    }

    /// Voice name, or `None` for the platform default.
    pub fn selected_voice(&self) -> Option<&str> {
        let trimmed = self.voice_name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Snaps a requested tile size onto the slider range and step.
pub fn normalize_tile_size(value: u32) -> u32 {
    let clamped = value.clamp(TILE_SIZE_MIN, TILE_SIZE_MAX);
    let steps = (clamped - TILE_SIZE_MIN + TILE_SIZE_STEP / 2) / TILE_SIZE_STEP;
    TILE_SIZE_MIN + steps * TILE_SIZE_STEP
}

#[cfg(test)]
mod tests {
    use super::{normalize_tile_size, Preferences};

    #[test]
    fn tile_size_snaps_to_range_and_step() {
        assert_eq!(normalize_tile_size(0), 120);
        assert_eq!(normalize_tile_size(999), 260);
        assert_eq!(normalize_tile_size(144), 140);
        assert_eq!(normalize_tile_size(145), 150);
    }

    #[test]
    fn grid_columns_follow_tile_size() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.grid_columns(), 8);
        prefs.tile_size = 160;
        assert_eq!(prefs.grid_columns(), 6);
        prefs.tile_size = 220;
        assert_eq!(prefs.grid_columns(), 4);
    }

    #[test]
    fn blank_voice_means_default() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.selected_voice(), None);
        prefs.voice_name = "Samantha".to_string();
        assert_eq!(prefs.selected_voice(), Some("Samantha"));
    }
}

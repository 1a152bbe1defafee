//! Board, category and tile model.
//!
//! # Responsibility
//! - Define the canonical board shape shared by store, codec and import paths.
//! - Validate untrusted board documents before they reach the store.
//!
//! # Invariants
//! - A valid board has at least one category.
//! - Category ids and tile ids are unique across the whole board.
//! - Tile labels are non-blank.
//! - Categories are held behind `Arc` so unchanged categories are shared
//!   between successive board snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Glyph shown when a tile has neither an image nor an emoji.
pub const PLACEHOLDER_GLYPH: &str = "🖱️";

/// Length of generated category/tile ids.
const GENERATED_ID_LEN: usize = 8;

/// One selectable word or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Spoken text override for `label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
}

/// What a tile renders as its picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileVisual<'a> {
    Image(&'a str),
    Emoji(&'a str),
    Placeholder,
}

impl Tile {
    /// Creates a tile with a generated id and the default letter emoji.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(generate_id(), label)
    }

    /// Creates a tile with a caller-provided id.
    pub fn with_id(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            emoji: Some("🔤".to_string()),
            image_url: None,
            color: None,
            speak: None,
        }
    }

    /// Text appended to the phrase buffer when the tile is tapped.
    ///
    /// A non-blank `speak` wins over `label`; the result is trimmed.
    pub fn spoken_text(&self) -> &str {
        match self.speak.as_deref().map(str::trim) {
            Some(speak) if !speak.is_empty() => speak,
            _ => self.label.trim(),
        }
    }

    /// The single visual shown for this tile. Images win over emoji.
    pub fn visual(&self) -> TileVisual<'_> {
        if let Some(url) = non_blank(self.image_url.as_deref()) {
            return TileVisual::Image(url);
        }
        if let Some(emoji) = non_blank(self.emoji.as_deref()) {
            return TileVisual::Emoji(emoji);
        }
        TileVisual::Placeholder
    }

    /// Checks field-level tile rules.
    pub fn validate(&self) -> Result<(), TileValidationError> {
        if self.id.trim().is_empty() {
            return Err(TileValidationError::EmptyId);
        }
        if self.label.trim().is_empty() {
            return Err(TileValidationError::EmptyLabel(self.id.clone()));
        }
        Ok(())
    }
}

/// Tile field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileValidationError {
    EmptyId,
    /// Carries the offending tile id.
    EmptyLabel(String),
}

impl Display for TileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "tile id must not be empty"),
            Self::EmptyLabel(id) => write!(f, "tile `{id}` label is required"),
        }
    }
}

impl Error for TileValidationError {}

/// A named, ordered group of tiles shown as one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub tiles: Vec<Tile>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tiles: Vec::new(),
        }
    }

    pub fn with_tiles(mut self, tiles: Vec<Tile>) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn tile_index(&self, tile_id: &str) -> Option<usize> {
        self.tiles.iter().position(|tile| tile.id == tile_id)
    }
}

/// The full user-customized board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    pub categories: Vec<Arc<Category>>,
}

impl Board {
    pub fn new(name: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn category(&self, cat_id: &str) -> Option<&Arc<Category>> {
        self.categories.iter().find(|category| category.id == cat_id)
    }

    pub fn category_index(&self, cat_id: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.id == cat_id)
    }

    /// Id of the category holding `tile_id`, if any.
    pub fn owner_of_tile(&self, tile_id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.tile_index(tile_id).is_some())
            .map(|category| category.id.as_str())
    }

    pub fn tile_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.tiles.len())
            .sum()
    }

    /// Checks whole-board rules for documents coming from import or share.
    pub fn validate(&self) -> Result<(), BoardShapeError> {
        if self.categories.is_empty() {
            return Err(BoardShapeError::NoCategories);
        }

        let mut category_ids = HashSet::new();
        let mut tile_ids = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(BoardShapeError::EmptyCategoryId);
            }
            if !category_ids.insert(category.id.as_str()) {
                return Err(BoardShapeError::DuplicateCategoryId(category.id.clone()));
            }
            for tile in &category.tiles {
                tile.validate().map_err(BoardShapeError::Tile)?;
                if !tile_ids.insert(tile.id.as_str()) {
                    return Err(BoardShapeError::DuplicateTileId(tile.id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Generates a category id not used by this board.
    pub fn fresh_category_id(&self) -> String {
        loop {
            let candidate = generate_id();
            if self.category(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Parses and validates an untrusted JSON board document.
    pub fn from_json(raw: &str) -> Result<Self, BoardShapeError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| BoardShapeError::Malformed(err.to_string()))?;
        Self::from_json_value(value)
    }

    /// Validates an already-parsed JSON value as a board.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, BoardShapeError> {
        match value.get("categories") {
            Some(serde_json::Value::Array(_)) => {}
            Some(_) => return Err(BoardShapeError::CategoriesNotSequence),
            None => return Err(BoardShapeError::MissingCategories),
        }
        let board: Board = serde_json::from_value(value)
            .map_err(|err| BoardShapeError::Malformed(err.to_string()))?;
        board.validate()?;
        Ok(board)
    }
}

/// Reasons a board document is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardShapeError {
    Malformed(String),
    MissingCategories,
    CategoriesNotSequence,
    NoCategories,
    EmptyCategoryId,
    DuplicateCategoryId(String),
    DuplicateTileId(String),
    Tile(TileValidationError),
}

impl Display for BoardShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(details) => write!(f, "malformed board document: {details}"),
            Self::MissingCategories => write!(f, "board document has no `categories`"),
            Self::CategoriesNotSequence => write!(f, "board `categories` must be a list"),
            Self::NoCategories => write!(f, "board must have at least one category"),
            Self::EmptyCategoryId => write!(f, "category id must not be empty"),
            Self::DuplicateCategoryId(id) => write!(f, "duplicate category id `{id}`"),
            Self::DuplicateTileId(id) => write!(f, "duplicate tile id `{id}`"),
            Self::Tile(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardShapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tile(err) => Some(err),
            _ => None,
        }
    }
}

/// Short random id in the style used by shared board links.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()[..GENERATED_ID_LEN].to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

//! Board store: the only writer of board state.
//!
//! # Responsibility
//! - Own the current board snapshot and the active category selection.
//! - Apply category/tile mutations as whole-value replacements.
//! - Persist every change through a [`KeyValueRepository`].
//!
//! # Invariants
//! - The board always has at least one category.
//! - A failed operation leaves the snapshot untouched.
//! - A failed write is reported in the returned [`Commit`] but never rolls
//!   back the in-memory board; it stays authoritative for the session.
//! - No-op operations neither replace the snapshot nor write.

use crate::model::board::{Board, BoardShapeError, Category, Tile, TileValidationError};
use crate::model::demo::demo_board;
use crate::repo::kv_repo::{KeyValueRepository, BOARD_KEY};
use crate::repo::StorageError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, BoardError>;

/// Rejected board operations. The board is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Import or share payload is not a valid board.
    InvalidFormat(String),
    /// The operation would break a board invariant.
    InvariantViolation(&'static str),
    InvalidTile(TileValidationError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(details) => write!(f, "invalid board format: {details}"),
            Self::InvariantViolation(details) => write!(f, "{details}"),
            Self::InvalidTile(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardShapeError> for BoardError {
    fn from(value: BoardShapeError) -> Self {
        Self::InvalidFormat(value.to_string())
    }
}

impl From<TileValidationError> for BoardError {
    fn from(value: TileValidationError) -> Self {
        Self::InvalidTile(value)
    }
}

/// Outcome of a board operation that did not fail.
#[must_use]
#[derive(Debug)]
pub enum Commit {
    /// Nothing to change (missing target, out-of-range index, same value).
    Unchanged,
    /// New board is live and durably stored.
    Persisted,
    /// New board is live, but the durable write failed.
    PersistFailed(StorageError),
}

impl Commit {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn persistence_error(&self) -> Option<&StorageError> {
        match self {
            Self::PersistFailed(err) => Some(err),
            _ => None,
        }
    }
}

pub struct BoardStore<R: KeyValueRepository> {
    repo: R,
    board: Arc<Board>,
    active_category_id: String,
}

impl<R: KeyValueRepository> BoardStore<R> {
    /// Loads the persisted board, falling back to the demo board when the
    /// stored value is missing, unreadable or invalid.
    pub fn open(repo: R) -> Self {
        let board = match repo.get(BOARD_KEY) {
            Ok(Some(raw)) => match Board::from_json(&raw) {
                Ok(board) => board,
                Err(err) => {
                    warn!("event=board_load module=board status=fallback reason=invalid error={err}");
                    demo_board()
                }
            },
            Ok(None) => {
                info!("event=board_load module=board status=fallback reason=first_run");
                demo_board()
            }
            Err(err) => {
                warn!("event=board_load module=board status=fallback reason=storage error={err}");
                demo_board()
            }
        };

        let active_category_id = first_category_id(&board);
        Self {
            repo,
            board: Arc::new(board),
            active_category_id,
        }
    }

    /// Current board value. Later mutations never change it.
    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_category_id(&self) -> &str {
        &self.active_category_id
    }

    pub fn active_category(&self) -> Option<&Arc<Category>> {
        self.board
            .category(&self.active_category_id)
            .or_else(|| self.board.categories.first())
    }

    /// Selects a tab. Unknown ids are ignored; returns whether it changed.
    pub fn set_active_category(&mut self, cat_id: &str) -> bool {
        if self.board.category(cat_id).is_none() || self.active_category_id == cat_id {
            return false;
        }
        self.active_category_id = cat_id.to_string();
        true
    }

    /// Appends an empty category named `New <n>` and makes it active.
    ///
    /// Returns the new category id.
    pub fn add_category(&mut self) -> (String, Commit) {
        let id = self.board.fresh_category_id();
        let name = format!("New {}", self.board.categories.len() + 1);

        let mut next = (*self.board).clone();
        next.categories.push(Arc::new(Category::new(id.clone(), name)));
        let commit = self.commit(next, "add_category");
        self.active_category_id = id.clone();
        (id, commit)
    }

    pub fn rename_category(&mut self, cat_id: &str, name: &str) -> Commit {
        let Some(index) = self.board.category_index(cat_id) else {
            return Commit::Unchanged;
        };
        if self.board.categories[index].name == name {
            return Commit::Unchanged;
        }

        let mut category = (*self.board.categories[index]).clone();
        category.name = name.to_string();
        self.commit(self.replace_category(index, category), "rename_category")
    }

    /// Removes a category; the last remaining one can never be deleted.
    pub fn delete_category(&mut self, cat_id: &str) -> StoreResult<Commit> {
        if self.board.categories.len() <= 1 {
            return Err(BoardError::InvariantViolation(
                "cannot delete the last category",
            ));
        }
        let Some(index) = self.board.category_index(cat_id) else {
            return Ok(Commit::Unchanged);
        };

        let mut next = (*self.board).clone();
        next.categories.remove(index);
        let commit = self.commit(next, "delete_category");
        if self.active_category_id == cat_id {
            self.active_category_id = first_category_id(&self.board);
        }
        Ok(commit)
    }

    /// Upserts a tile by id: replaced in place, or appended when new.
    ///
    /// # Errors
    /// - `InvalidTile` when the id or label is blank.
    /// - `InvariantViolation` when the id already belongs to another category.
    pub fn save_tile(&mut self, cat_id: &str, tile: Tile) -> StoreResult<Commit> {
        tile.validate()?;
        let Some(index) = self.board.category_index(cat_id) else {
            return Ok(Commit::Unchanged);
        };
        if let Some(owner) = self.board.owner_of_tile(&tile.id) {
            if owner != cat_id {
                return Err(BoardError::InvariantViolation(
                    "tile id already used in another category",
                ));
            }
        }

        let mut category = (*self.board.categories[index]).clone();
        match category.tile_index(&tile.id) {
            Some(position) if category.tiles[position] == tile => return Ok(Commit::Unchanged),
            Some(position) => category.tiles[position] = tile,
            None => category.tiles.push(tile),
        }
        Ok(self.commit(self.replace_category(index, category), "save_tile"))
    }

    pub fn delete_tile(&mut self, cat_id: &str, tile_id: &str) -> Commit {
        let Some(index) = self.board.category_index(cat_id) else {
            return Commit::Unchanged;
        };
        let Some(position) = self.board.categories[index].tile_index(tile_id) else {
            return Commit::Unchanged;
        };

        let mut category = (*self.board.categories[index]).clone();
        category.tiles.remove(position);
        self.commit(self.replace_category(index, category), "delete_tile")
    }

    /// Moves the tile at `from_index` to `to_index` within one category.
    ///
    /// Missing category or an index outside the tile count is a no-op.
    pub fn reorder_tiles(&mut self, cat_id: &str, from_index: usize, to_index: usize) -> Commit {
        let Some(index) = self.board.category_index(cat_id) else {
            return Commit::Unchanged;
        };
        let len = self.board.categories[index].tiles.len();
        if from_index >= len || to_index >= len || from_index == to_index {
            return Commit::Unchanged;
        }

        let mut category = (*self.board.categories[index]).clone();
        let tile = category.tiles.remove(from_index);
        category.tiles.insert(to_index, tile);
        self.commit(self.replace_category(index, category), "reorder_tiles")
    }

    /// Moves a tile into another category at `to_index`, clamped to
    /// `[0, len]` of the target.
    ///
    /// A missing category or tile is a no-op. Moving within one category
    /// reorders it.
    pub fn move_tile(
        &mut self,
        from_cat_id: &str,
        to_cat_id: &str,
        tile_id: &str,
        to_index: usize,
    ) -> Commit {
        let (Some(from), Some(to)) = (
            self.board.category_index(from_cat_id),
            self.board.category_index(to_cat_id),
        ) else {
            return Commit::Unchanged;
        };
        let Some(position) = self.board.categories[from].tile_index(tile_id) else {
            return Commit::Unchanged;
        };

        if from == to {
            let last = self.board.categories[from].tiles.len() - 1;
            return self.reorder_tiles(from_cat_id, position, to_index.min(last));
        }

        let mut source = (*self.board.categories[from]).clone();
        let mut target = (*self.board.categories[to]).clone();
        let tile = source.tiles.remove(position);
        let insert_at = to_index.min(target.tiles.len());
        target.tiles.insert(insert_at, tile);

        let mut next = (*self.board).clone();
        next.categories[from] = Arc::new(source);
        next.categories[to] = Arc::new(target);
        self.commit(next, "move_tile")
    }

    /// Replaces the whole board after validating it.
    ///
    /// The first category becomes active.
    pub fn replace_board(&mut self, candidate: Board) -> StoreResult<Commit> {
        if let Err(err) = candidate.validate() {
            warn!("event=board_replace module=board status=rejected error={err}");
            return Err(err.into());
        }
        let active = first_category_id(&candidate);
        let commit = self.commit(candidate, "replace_board");
        self.active_category_id = active;
        Ok(commit)
    }

    /// Parses an untrusted JSON document and replaces the board with it.
    pub fn replace_board_json(&mut self, raw: &str) -> StoreResult<Commit> {
        let candidate = Board::from_json(raw).map_err(|err| {
            warn!("event=board_replace module=board status=rejected error={err}");
            BoardError::from(err)
        })?;
        self.replace_board(candidate)
    }

    fn replace_category(&self, index: usize, category: Category) -> Board {
        let mut next = (*self.board).clone();
        next.categories[index] = Arc::new(category);
        next
    }

    fn commit(&mut self, next: Board, operation: &'static str) -> Commit {
        self.board = Arc::new(next);
        match self.persist() {
            Ok(()) => {
                info!(
                    "event=board_commit module=board status=ok op={operation} categories={} tiles={}",
                    self.board.categories.len(),
                    self.board.tile_count()
                );
                Commit::Persisted
            }
            Err(err) => {
                warn!(
                    "event=board_commit module=board status=persist_failed op={operation} error={err}"
                );
                Commit::PersistFailed(err)
            }
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&*self.board)
            .map_err(|err| StorageError::Serialize(err.to_string()))?;
        self.repo.put(BOARD_KEY, &raw)
    }
}

fn first_category_id(board: &Board) -> String {
    board
        .categories
        .first()
        .map(|category| category.id.clone())
        .unwrap_or_default()
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Arrow Heart.
//!
//! A [`Board`] maps every playable slot of a [`SilhouetteMask`] to either a
//! live [`Tile`] or nothing. Removals flow through [`apply`], which validates
//! the move against the current board and reports the result as [`Event`]
//! values. Read-only helpers live in [`query`].

use std::{fmt, sync::Arc};

use arrow_heart_core::{
    CellCoord, CheckMode, Command, Event, Facing, RemovalOutcome, SilhouetteMask, Tile, TileKind,
};
use thiserror::Error;

pub mod path;

/// Reasons a tile cannot be placed on a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The cell lies outside the board rectangle.
    #[error("cell {0} lies outside the board")]
    OutOfBounds(CellCoord),
    /// The cell is a gap in the silhouette.
    #[error("cell {0} is a gap in the silhouette")]
    NotPlayable(CellCoord),
    /// The cell already holds a tile.
    #[error("cell {0} already holds a tile")]
    Occupied(CellCoord),
}

/// Playable slots of a silhouette and the tiles currently occupying them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    mask: Arc<SilhouetteMask>,
    cells: Vec<Option<Tile>>,
    remaining: usize,
}

impl Board {
    /// Creates a board with every slot empty.
    #[must_use]
    pub fn empty(mask: Arc<SilhouetteMask>) -> Self {
        let cells = vec![None; mask.area()];
        Self {
            mask,
            cells,
            remaining: 0,
        }
    }

    /// Places a tile into an empty playable slot.
    pub fn place(&mut self, cell: CellCoord, tile: Tile) -> Result<(), PlacementError> {
        let Some(index) = self.mask.index(cell) else {
            return Err(PlacementError::OutOfBounds(cell));
        };
        if !self.mask.is_playable(cell) {
            return Err(PlacementError::NotPlayable(cell));
        }

        let slot = &mut self.cells[index];
        if slot.is_some() {
            return Err(PlacementError::Occupied(cell));
        }
        *slot = Some(tile);
        self.remaining += 1;
        Ok(())
    }

    /// Silhouette shaping the board.
    #[must_use]
    pub fn mask(&self) -> &SilhouetteMask {
        &self.mask
    }

    /// Shared handle to the silhouette, for building sibling boards.
    #[must_use]
    pub fn shared_mask(&self) -> Arc<SilhouetteMask> {
        Arc::clone(&self.mask)
    }

    /// Tile occupying the cell, if any.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<Tile> {
        self.mask
            .index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Number of live tiles.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reports whether every playable slot holds a tile.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.remaining == self.mask.playable_count()
    }

    /// Iterates live tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        let columns = self.mask.columns();
        self.cells.iter().enumerate().filter_map(move |(index, slot)| {
            let tile = (*slot)?;
            let index = u32::try_from(index).ok()?;
            Some((CellCoord::new(index % columns, index / columns), tile))
        })
    }

    fn take(&mut self, cell: CellCoord) -> Option<Tile> {
        let index = self.mask.index(cell)?;
        let tile = self.cells.get_mut(index)?.take()?;
        self.remaining -= 1;
        Some(tile)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.mask.rows() {
            for column in 0..self.mask.columns() {
                let cell = CellCoord::new(column, row);
                let glyph = match self.tile_at(cell) {
                    Some(tile) => tile_glyph(tile),
                    None if self.mask.is_playable(cell) => '·',
                    None => ' ',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Glyph used when printing a tile.
///
/// Straight tiles show their facing; curves show the corner they turn, from
/// their facing into their travel direction.
#[must_use]
pub const fn tile_glyph(tile: Tile) -> char {
    match (tile.kind(), tile.facing()) {
        (TileKind::Straight, Facing::Up) => '↑',
        (TileKind::Straight, Facing::Right) => '→',
        (TileKind::Straight, Facing::Down) => '↓',
        (TileKind::Straight, Facing::Left) => '←',
        (TileKind::Curve, Facing::Up) => '↱',
        (TileKind::Curve, Facing::Right) => '↴',
        (TileKind::Curve, Facing::Down) => '↲',
        (TileKind::Curve, Facing::Left) => '↰',
    }
}

/// Applies the provided command to the board.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RemoveTile { cell } => {
            let _ = remove_tile(board, cell, out_events);
        }
    }
}

/// Attempts to remove the tile at `cell`, returning the outcome directly.
///
/// Equivalent to applying [`Command::RemoveTile`] and inspecting the event.
pub fn attempt_remove(board: &mut Board, cell: CellCoord) -> RemovalOutcome {
    let mut events = Vec::new();
    remove_tile(board, cell, &mut events)
}

fn remove_tile(board: &mut Board, cell: CellCoord, out_events: &mut Vec<Event>) -> RemovalOutcome {
    let Some(tile) = board.tile_at(cell) else {
        log::debug!("ignoring removal at {cell}: no tile");
        return RemovalOutcome::Ignored;
    };

    if let Some(blocker) =
        path::first_blocker(board, cell, tile.kind(), tile.facing(), CheckMode::Play)
    {
        log::debug!("rejecting removal at {cell}: blocked by {blocker}");
        out_events.push(Event::RemovalRejected {
            cell,
            tile,
            blocker,
        });
        return RemovalOutcome::Rejected { blocker };
    }

    let _ = board.take(cell);
    let remaining = board.remaining();
    log::debug!("removed {tile:?} at {cell}; {remaining} remaining");
    out_events.push(Event::TileRemoved {
        cell,
        tile,
        remaining,
    });
    RemovalOutcome::Removed { remaining }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use arrow_heart_core::{CellCoord, CheckMode, Tile};

    use super::{path, Board};

    /// Number of cells still holding a live tile.
    #[must_use]
    pub fn remaining_count(board: &Board) -> usize {
        board.remaining()
    }

    /// Reports whether every tile has been removed.
    #[must_use]
    pub fn is_cleared(board: &Board) -> bool {
        board.remaining() == 0
    }

    /// Tile occupying the cell, if any.
    #[must_use]
    pub fn tile_at(board: &Board, cell: CellCoord) -> Option<Tile> {
        board.tile_at(cell)
    }

    /// Cells whose tiles could be removed right now, in row-major order.
    #[must_use]
    pub fn removable_cells(board: &Board) -> Vec<CellCoord> {
        board
            .tiles()
            .filter(|(cell, tile)| {
                path::is_clear(board, *cell, tile.kind(), tile.facing(), CheckMode::Play)
            })
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Removal sequence discovered for a board of unknown origin.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ClearingPlan {
        /// Cells in the order their tiles can be removed.
        pub order: Vec<CellCoord>,
        /// Cells whose tiles can never be removed.
        pub stuck: Vec<CellCoord>,
    }

    impl ClearingPlan {
        /// Reports whether the plan clears the whole board.
        #[must_use]
        pub fn is_complete(&self) -> bool {
            self.stuck.is_empty()
        }
    }

    /// Finds an order in which the board's tiles can be removed.
    ///
    /// Removing a tile never blocks another, so repeatedly taking every
    /// currently removable tile finds a full clear whenever one exists. Any
    /// tiles left over are reported as stuck.
    #[must_use]
    pub fn clearing_order(board: &Board) -> ClearingPlan {
        let mut scratch = board.clone();
        let mut order = Vec::with_capacity(board.remaining());

        loop {
            let wave = removable_cells(&scratch);
            if wave.is_empty() {
                break;
            }
            for cell in wave {
                let _ = scratch.take(cell);
                order.push(cell);
            }
        }

        let stuck = scratch.tiles().map(|(cell, _)| cell).collect();
        ClearingPlan { order, stuck }
    }
}

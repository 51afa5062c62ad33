//! Obstruction checks along a tile's travel path.
//!
//! The same checks serve the generator, which asks whether a freshly chosen
//! orientation could leave the board past the tiles placed so far, and the
//! move validator, which asks the same question of the live board.

use arrow_heart_core::{CellCoord, CheckMode, Facing, SilhouetteMask, TileKind};

use crate::Board;

/// Iterator over the cells a tile crosses on its way off the board.
///
/// The origin cell itself is never yielded. Iteration ends at the edge of
/// the mask's bounding rectangle.
#[derive(Clone, Debug)]
pub struct TravelPath<'a> {
    mask: &'a SilhouetteMask,
    cursor: CellCoord,
    direction: Facing,
}

impl Iterator for TravelPath<'_> {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self
            .cursor
            .step(self.direction)
            .filter(|cell| self.mask.contains(*cell))?;
        self.cursor = next;
        Some(next)
    }
}

/// Walks from `origin` toward `direction` until the edge of the mask.
#[must_use]
pub fn travel_path(mask: &SilhouetteMask, origin: CellCoord, direction: Facing) -> TravelPath<'_> {
    TravelPath {
        mask,
        cursor: origin,
        direction,
    }
}

/// Returns the first live tile standing in the way of a tile of `kind` and
/// `facing` leaving the board from `origin`.
///
/// Gaps in the silhouette are transparent, as is everything beyond the
/// board's rectangle. `mode` does not alter the rules; it is recorded so
/// generation-time and play-time checks can be told apart in traces.
#[must_use]
pub fn first_blocker(
    board: &Board,
    origin: CellCoord,
    kind: TileKind,
    facing: Facing,
    mode: CheckMode,
) -> Option<CellCoord> {
    let direction = kind.travel_direction(facing);
    let mask = board.mask();
    let blocker = travel_path(mask, origin, direction)
        .filter(|cell| mask.is_playable(*cell))
        .find(|cell| board.tile_at(*cell).is_some());

    log::trace!("{mode:?} path check from {origin} toward {direction:?}: blocker {blocker:?}");
    blocker
}

/// Reports whether a tile of `kind` and `facing` at `origin` could leave the
/// board unobstructed.
#[must_use]
pub fn is_clear(
    board: &Board,
    origin: CellCoord,
    kind: TileKind,
    facing: Facing,
    mode: CheckMode,
) -> bool {
    first_blocker(board, origin, kind, facing, mode).is_none()
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arrow Heart puzzle engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative board, and pure systems. Adapters submit [`Command`] values
//! describing desired removals, the board executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems
//! react to deterministically. The [`SilhouetteMask`] that shapes every board
//! is defined here as well, since it is static configuration consumed by
//! every other crate.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heart silhouette used by the game. `#` marks a playable slot, `.` a gap.
pub const HEART_SHAPE: [&str; 7] = [
    ".##.##.",
    "#######",
    "#######",
    "#######",
    ".#####.",
    "..###..",
    "...#...",
];

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell one step toward `facing`.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are not known here and are checked by the caller.
    #[must_use]
    pub fn step(self, facing: Facing) -> Option<Self> {
        let (dx, dy) = facing.unit_vector();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Direction an arrow tile points toward.
///
/// Variants are declared in clockwise order, so `index + 1 (mod 4)` is a
/// quarter turn clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
}

impl Facing {
    /// Every facing in clockwise order starting from [`Facing::Up`].
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Right, Facing::Down, Facing::Left];

    /// Numeric encoding of the facing, `0..=3`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Decodes a facing from its numeric encoding.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// The facing a quarter turn clockwise from this one.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }
}

/// Shape of an arrow tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    /// Leaves the board in the direction it faces.
    Straight,
    /// Bends once; leaves the board a quarter turn clockwise from its facing.
    Curve,
}

impl TileKind {
    /// Both kinds, straight first.
    pub const ALL: [TileKind; 2] = [TileKind::Straight, TileKind::Curve];

    /// Direction a tile of this kind travels when it leaves the board.
    #[must_use]
    pub const fn travel_direction(self, facing: Facing) -> Facing {
        match self {
            Self::Straight => facing,
            Self::Curve => facing.clockwise(),
        }
    }
}

/// Arrow tile occupying a playable slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    facing: Facing,
}

impl Tile {
    /// Creates a new tile.
    #[must_use]
    pub const fn new(kind: TileKind, facing: Facing) -> Self {
        Self { kind, facing }
    }

    /// Shape of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Stored facing of the tile.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Direction the tile travels when removed.
    #[must_use]
    pub const fn travel_direction(&self) -> Facing {
        self.kind.travel_direction(self.facing)
    }
}

/// Distinguishes path checks made while a board is built from those made
/// against a live board during play.
///
/// Both modes apply the same obstruction rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckMode {
    /// Checking against the tiles placed so far by a generator.
    Generation,
    /// Checking against the current board in response to a player move.
    Play,
}

/// One-based level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// The opening level.
    pub const FIRST: Level = Level(1);

    /// Creates a level wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The level that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons a silhouette description may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MaskError {
    /// The silhouette has no rows or no columns.
    #[error("silhouette must have at least one row and one column")]
    Empty,
    /// A row does not match the width of the first row.
    #[error("row {row} has {found} cells; expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph other than `#`, `1`, `.` or `0` was found.
    #[error("unexpected glyph '{glyph}' at column {column}, row {row}")]
    InvalidGlyph {
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
        /// The glyph that could not be interpreted.
        glyph: char,
    },
    /// The flat cell buffer does not match the declared dimensions.
    #[error("expected {expected} cells for the declared dimensions, found {found}")]
    CellCountMismatch {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells supplied.
        found: usize,
    },
}

/// Immutable grid that decides which cells may ever hold a tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SilhouetteMask {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl SilhouetteMask {
    /// Creates a mask from row-major cells.
    pub fn new(columns: u32, rows: u32, cells: Vec<bool>) -> Result<Self, MaskError> {
        if columns == 0 || rows == 0 {
            return Err(MaskError::Empty);
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if cells.len() != expected {
            return Err(MaskError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Creates a mask from a slice of equally sized rows.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, MaskError> {
        let Some(first) = rows.first() else {
            return Err(MaskError::Empty);
        };
        let width = first.as_ref().len();

        let mut cells = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(MaskError::RaggedRow {
                    row: index,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        let columns = u32::try_from(width).map_err(|_| MaskError::Empty)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| MaskError::Empty)?;
        Self::new(columns, row_count, cells)
    }

    /// Parses a textual silhouette.
    ///
    /// Each non-blank line is a row; `#` or `1` marks a playable slot and
    /// `.` or `0` marks a gap. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, MaskError> {
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let row_index = rows.len();
            let row = line
                .chars()
                .enumerate()
                .map(|(column, glyph)| match glyph {
                    '#' | '1' => Ok(true),
                    '.' | '0' => Ok(false),
                    _ => Err(MaskError::InvalidGlyph {
                        row: row_index,
                        column,
                        glyph,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// The heart silhouette from [`HEART_SHAPE`].
    #[must_use]
    pub fn heart() -> Self {
        let cells = HEART_SHAPE
            .iter()
            .flat_map(|row| row.bytes().map(|glyph| glyph == b'#'))
            .collect();
        Self {
            columns: HEART_SHAPE[0].len() as u32,
            rows: HEART_SHAPE.len() as u32,
            cells,
        }
    }

    /// A rectangle in which every cell is playable. Zero dimensions are
    /// widened to one.
    #[must_use]
    pub fn fully_playable(columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let len = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![true; len],
        }
    }

    /// Number of columns in the bounding rectangle.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the bounding rectangle.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the bounding rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is a playable slot. Off-board cells are not.
    #[must_use]
    pub fn is_playable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Playable cells in row-major order.
    #[must_use]
    pub fn playable_cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::with_capacity(self.playable_count());
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                if self.is_playable(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Number of playable slots.
    #[must_use]
    pub fn playable_count(&self) -> usize {
        self.cells.iter().filter(|playable| **playable).count()
    }

    /// Row-major index of an in-bounds cell.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Total number of cells in the bounding rectangle.
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells.len()
    }
}

impl FromStr for SilhouetteMask {
    type Err = MaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for SilhouetteMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let glyph = if self.is_playable(CellCoord::new(column, row)) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests removal of the tile occupying the provided cell.
    RemoveTile {
        /// Cell selected by the player.
        cell: CellCoord,
    },
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a tile left the board.
    TileRemoved {
        /// Cell the tile occupied.
        cell: CellCoord,
        /// The tile that was removed.
        tile: Tile,
        /// Live tiles left on the board after the removal.
        remaining: usize,
    },
    /// Reports that a removal was refused because the tile's path is blocked.
    RemovalRejected {
        /// Cell the player selected.
        cell: CellCoord,
        /// The tile that stays in place.
        tile: Tile,
        /// First live tile found along the travel path.
        blocker: CellCoord,
    },
}

/// Result of asking the board to remove a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The tile left the board.
    Removed {
        /// Live tiles left on the board.
        remaining: usize,
    },
    /// The tile's path is blocked; the board is unchanged.
    Rejected {
        /// First live tile found along the travel path.
        blocker: CellCoord,
    },
    /// The cell holds no tile; nothing happened.
    Ignored,
}

impl RemovalOutcome {
    /// Reports whether the removal was accepted.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// Remaining tile count reported by an accepted removal.
    #[must_use]
    pub const fn remaining(&self) -> Option<usize> {
        match self {
            Self::Removed { remaining } => Some(*remaining),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Facing, Level, MaskError, SilhouetteMask, Tile, TileKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn facing_indices_are_clockwise() {
        for facing in Facing::ALL {
            let next = Facing::from_index((facing.index() + 1) % 4).expect("valid index");
            assert_eq!(facing.clockwise(), next);
        }
        assert_eq!(Facing::from_index(4), None);
    }

    #[test]
    fn unit_vectors_match_screen_axes() {
        assert_eq!(Facing::Up.unit_vector(), (0, -1));
        assert_eq!(Facing::Right.unit_vector(), (1, 0));
        assert_eq!(Facing::Down.unit_vector(), (0, 1));
        assert_eq!(Facing::Left.unit_vector(), (-1, 0));
    }

    #[test]
    fn curve_travels_a_quarter_turn_clockwise() {
        assert_eq!(Tile::new(TileKind::Curve, Facing::Up).travel_direction(), Facing::Right);
        assert_eq!(Tile::new(TileKind::Curve, Facing::Left).travel_direction(), Facing::Up);
        assert_eq!(
            Tile::new(TileKind::Straight, Facing::Left).travel_direction(),
            Facing::Left
        );
    }

    #[test]
    fn step_refuses_to_underflow() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.step(Facing::Up), None);
        assert_eq!(origin.step(Facing::Left), None);
        assert_eq!(origin.step(Facing::Right), Some(CellCoord::new(1, 0)));
        assert_eq!(origin.step(Facing::Down), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn heart_has_thirty_four_slots() {
        let heart = SilhouetteMask::heart();
        assert_eq!((heart.columns(), heart.rows()), (7, 7));
        assert_eq!(heart.playable_count(), 34);
        assert!(!heart.is_playable(CellCoord::new(0, 0)));
        assert!(heart.is_playable(CellCoord::new(3, 6)));
        assert!(!heart.is_playable(CellCoord::new(7, 0)));
    }

    #[test]
    fn heart_display_parses_back() {
        let heart = SilhouetteMask::heart();
        let parsed: SilhouetteMask = heart.to_string().parse().expect("parse heart");
        assert_eq!(parsed, heart);
    }

    #[test]
    fn parse_accepts_numeric_glyphs() {
        let mask = SilhouetteMask::parse("010\n111\n").expect("parse");
        assert_eq!(mask.playable_count(), 4);
        assert_eq!(
            mask.playable_cells(),
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        assert_eq!(
            SilhouetteMask::parse("###\n##"),
            Err(MaskError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn parse_rejects_unknown_glyphs() {
        assert_eq!(
            SilhouetteMask::parse("#x#"),
            Err(MaskError::InvalidGlyph {
                row: 0,
                column: 1,
                glyph: 'x',
            })
        );
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(SilhouetteMask::parse("\n  \n"), Err(MaskError::Empty));
    }

    #[test]
    fn all_gap_mask_is_valid() {
        let mask = SilhouetteMask::parse("...\n...").expect("parse");
        assert_eq!(mask.playable_count(), 0);
        assert!(mask.playable_cells().is_empty());
    }

    #[test]
    fn new_checks_cell_count() {
        assert_eq!(
            SilhouetteMask::new(2, 2, vec![true; 3]),
            Err(MaskError::CellCountMismatch {
                expected: 4,
                found: 3,
            })
        );
    }

    #[test]
    fn level_advances() {
        assert_eq!(Level::FIRST.next(), Level::new(2));
        assert_eq!(Level::new(u32::MAX).next(), Level::new(u32::MAX));
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::new(TileKind::Curve, Facing::Down));
    }
}

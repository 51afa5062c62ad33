#![allow(clippy::missing_errors_doc)]

//! Single-line layout strings: `arrows:v1:<columns>x<rows>:<payload>`.
//!
//! The payload is base64 (no padding) over JSON holding the level, the
//! silhouette drawn with `#` and `.`, and every tile on the board. The header
//! dimensions are a checksum on the silhouette and must agree with it.

use std::sync::Arc;

use arrow_heart_board::{Board, PlacementError};
use arrow_heart_core::{CellCoord, Level, MaskError, SilhouetteMask, Tile};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "arrows";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Level and board carried by a layout string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct LayoutPayload {
    level: u32,
    mask: String,
    tiles: Vec<LayoutTile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct LayoutTile {
    cell: CellCoord,
    tile: Tile,
}

/// Errors that can occur while decoding layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    Empty,
    /// The string did not split into prefix, version, dimensions and payload.
    #[error("layout string has {0} ':'-separated fields; expected 4")]
    FieldCount(usize),
    /// The string used an unexpected prefix.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The silhouette inside the payload is malformed.
    #[error("layout silhouette is invalid: {0}")]
    InvalidMask(#[from] MaskError),
    /// The silhouette does not match the header dimensions.
    #[error("layout header declares {declared:?} but its silhouette is {found:?}")]
    DimensionMismatch {
        /// Columns and rows from the header.
        declared: (u32, u32),
        /// Columns and rows of the decoded silhouette.
        found: (u32, u32),
    },
    /// A tile could not be placed on the silhouette.
    #[error("layout tile cannot be placed: {0}")]
    InvalidTile(#[from] PlacementError),
}

/// Encodes a level's board as a layout string.
pub(crate) fn encode(level: Level, board: &Board) -> Result<String, LayoutTransferError> {
    let mask = board.mask();
    let payload = LayoutPayload {
        level: level.get(),
        mask: mask.to_string(),
        tiles: board
            .tiles()
            .map(|(cell, tile)| LayoutTile { cell, tile })
            .collect(),
    };
    encode_payload((mask.columns(), mask.rows()), &payload)
}

/// Decodes a layout string back into its level and board.
pub(crate) fn decode(value: &str) -> Result<(Level, Board), LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::Empty);
    }

    let fields: Vec<&str> = trimmed.split(FIELD_DELIMITER).collect();
    let [domain, version, dimensions, encoded] = fields.as_slice() else {
        return Err(LayoutTransferError::FieldCount(fields.len()));
    };
    if *domain != SNAPSHOT_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix((*domain).to_owned()));
    }
    if *version != SNAPSHOT_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion((*version).to_owned()));
    }
    let declared = parse_dimensions(dimensions)
        .ok_or_else(|| LayoutTransferError::InvalidDimensions((*dimensions).to_owned()))?;

    let bytes = STANDARD_NO_PAD
        .decode(encoded.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let payload: LayoutPayload =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    let mask = SilhouetteMask::parse(&payload.mask)?;
    let found = (mask.columns(), mask.rows());
    if found != declared {
        return Err(LayoutTransferError::DimensionMismatch { declared, found });
    }

    let mut board = Board::empty(Arc::new(mask));
    for LayoutTile { cell, tile } in payload.tiles {
        board.place(cell, tile)?;
    }
    Ok((Level::new(payload.level), board))
}

fn encode_payload(
    (columns, rows): (u32, u32),
    payload: &LayoutPayload,
) -> Result<String, LayoutTransferError> {
    let json = serde_json::to_vec(payload).map_err(LayoutTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SNAPSHOT_DOMAIN}:{SNAPSHOT_VERSION}:{columns}x{rows}:{encoded}"
    ))
}

/// Parses `<columns>x<rows>`; both must be positive.
fn parse_dimensions(dimensions: &str) -> Option<(u32, u32)> {
    let (columns, rows) = dimensions.split_once(['x', 'X'])?;
    let columns: u32 = columns.trim().parse().ok()?;
    let rows: u32 = rows.trim().parse().ok()?;
    (columns > 0 && rows > 0).then_some((columns, rows))
}

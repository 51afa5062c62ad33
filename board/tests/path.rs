use std::sync::Arc;

use arrow_heart_board::{path, Board};
use arrow_heart_core::{CellCoord, CheckMode, Facing, SilhouetteMask, Tile, TileKind};

fn open_board(columns: u32, rows: u32) -> Board {
    Board::empty(Arc::new(SilhouetteMask::fully_playable(columns, rows)))
}

fn place(board: &mut Board, column: u32, row: u32, kind: TileKind, facing: Facing) {
    board
        .place(CellCoord::new(column, row), Tile::new(kind, facing))
        .expect("placement on open slot");
}

#[test]
fn straight_right_checks_the_rest_of_its_row() {
    let mut board = open_board(3, 3);
    place(&mut board, 0, 0, TileKind::Straight, Facing::Right);

    let origin = CellCoord::new(0, 0);
    assert!(path::is_clear(
        &board,
        origin,
        TileKind::Straight,
        Facing::Right,
        CheckMode::Generation
    ));

    place(&mut board, 2, 0, TileKind::Straight, Facing::Up);
    assert_eq!(
        path::first_blocker(&board, origin, TileKind::Straight, Facing::Right, CheckMode::Play),
        Some(CellCoord::new(2, 0)),
        "a tile at the far end of the row still blocks",
    );
}

#[test]
fn tiles_off_the_travel_line_do_not_block() {
    let mut board = open_board(3, 3);
    place(&mut board, 0, 1, TileKind::Straight, Facing::Up);
    place(&mut board, 1, 1, TileKind::Straight, Facing::Up);
    place(&mut board, 2, 2, TileKind::Straight, Facing::Up);

    assert!(path::is_clear(
        &board,
        CellCoord::new(0, 0),
        TileKind::Straight,
        Facing::Right,
        CheckMode::Play
    ));
}

#[test]
fn curve_up_travels_right_and_is_blocked_to_its_right() {
    let mut board = open_board(3, 3);
    let origin = CellCoord::new(1, 1);
    place(&mut board, 1, 1, TileKind::Curve, Facing::Up);
    place(&mut board, 1, 0, TileKind::Straight, Facing::Up);

    assert!(
        path::is_clear(&board, origin, TileKind::Curve, Facing::Up, CheckMode::Play),
        "the cell above is not on a curve's exit path",
    );

    place(&mut board, 2, 1, TileKind::Straight, Facing::Down);
    assert!(!path::is_clear(
        &board,
        origin,
        TileKind::Curve,
        Facing::Up,
        CheckMode::Play
    ));
}

#[test]
fn gaps_are_transparent() {
    let mask = Arc::new(SilhouetteMask::parse("#.#\n###").expect("mask"));
    let mut board = Board::empty(mask);
    place(&mut board, 0, 0, TileKind::Straight, Facing::Right);

    assert!(path::is_clear(
        &board,
        CellCoord::new(0, 0),
        TileKind::Straight,
        Facing::Right,
        CheckMode::Play
    ));
}

#[test]
fn own_cell_is_never_an_obstruction() {
    let mut board = open_board(1, 1);
    place(&mut board, 0, 0, TileKind::Curve, Facing::Left);

    for kind in TileKind::ALL {
        for facing in Facing::ALL {
            assert!(path::is_clear(
                &board,
                CellCoord::new(0, 0),
                kind,
                facing,
                CheckMode::Play
            ));
        }
    }
}

#[test]
fn generation_and_play_modes_agree() {
    let mut board = open_board(4, 4);
    place(&mut board, 1, 0, TileKind::Straight, Facing::Up);
    place(&mut board, 3, 2, TileKind::Curve, Facing::Down);
    place(&mut board, 0, 3, TileKind::Straight, Facing::Left);

    for row in 0..4 {
        for column in 0..4 {
            let cell = CellCoord::new(column, row);
            for kind in TileKind::ALL {
                for facing in Facing::ALL {
                    assert_eq!(
                        path::is_clear(&board, cell, kind, facing, CheckMode::Generation),
                        path::is_clear(&board, cell, kind, facing, CheckMode::Play),
                    );
                }
            }
        }
    }
}

#[test]
fn is_clear_matches_a_direct_scan_of_the_line() {
    let mask = Arc::new(SilhouetteMask::heart());
    let mut board = Board::empty(Arc::clone(&mask));
    let occupied = [(1, 0), (4, 1), (3, 3), (6, 3), (2, 5), (3, 6)];
    for (column, row) in occupied {
        place(&mut board, column, row, TileKind::Straight, Facing::Up);
    }

    for origin in mask.playable_cells() {
        for kind in TileKind::ALL {
            for facing in Facing::ALL {
                let (dx, dy) = kind.travel_direction(facing).unit_vector();
                let mut column = i64::from(origin.column()) + i64::from(dx);
                let mut row = i64::from(origin.row()) + i64::from(dy);
                let mut expected = true;
                while (0..7).contains(&column) && (0..7).contains(&row) {
                    if occupied.contains(&(column as u32, row as u32)) {
                        expected = false;
                        break;
                    }
                    column += i64::from(dx);
                    row += i64::from(dy);
                }

                assert_eq!(
                    path::is_clear(&board, origin, kind, facing, CheckMode::Play),
                    expected,
                    "mismatch for {kind:?} {facing:?} at {origin}",
                );
            }
        }
    }
}

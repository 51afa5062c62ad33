use std::sync::Arc;

use arrow_heart_board::{query, Board};
use arrow_heart_core::{CellCoord, Facing, Level, SilhouetteMask, Tile, TileKind};
use arrow_heart_system_generation::Generation;
use arrow_heart_system_session::{
    Config, IgnoreReason, LevelStatus, SelectOutcome, Session, STARTING_LIVES,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn heart_session(seed: u64) -> Session {
    Session::new(
        Config::new(STARTING_LIVES, seed),
        Generation::default(),
        Arc::new(SilhouetteMask::heart()),
    )
}

/// Three right-pointing tiles in a row: only the rightmost can leave first.
fn conveyor() -> Board {
    let mut board = Board::empty(Arc::new(SilhouetteMask::fully_playable(3, 1)));
    for column in 0..3 {
        board
            .place(
                CellCoord::new(column, 0),
                Tile::new(TileKind::Straight, Facing::Right),
            )
            .expect("place");
    }
    board
}

#[test]
fn session_opens_on_the_first_level() {
    let session = heart_session(1);
    assert_eq!(session.level(), Level::FIRST);
    assert_eq!(session.lives(), STARTING_LIVES);
    assert_eq!(session.status(), LevelStatus::Playing);
    assert!(session.strategy().is_some());
    assert!(query::remaining_count(session.board()) > 0);
}

#[test]
fn following_hints_clears_the_level() {
    let mut session = heart_session(2);
    let initial = query::remaining_count(session.board());
    let mut removals = 0;

    while let Some(cell) = session.hint() {
        let outcome = session.select(cell);
        assert!(
            matches!(outcome, SelectOutcome::Removed { .. }),
            "hint {cell} was not removable: {outcome:?}",
        );
        removals += 1;
        let status = session.settle();
        if status != LevelStatus::Playing {
            break;
        }
    }

    assert_eq!(removals, initial);
    assert_eq!(session.status(), LevelStatus::Cleared);
    assert_eq!(session.lives(), STARTING_LIVES);
}

#[test]
fn removals_are_serialized_by_the_gate() {
    let mut session = heart_session(3);
    let first = session.hint().expect("hint");
    assert!(matches!(session.select(first), SelectOutcome::Removed { .. }));
    assert!(session.is_move_in_flight());

    let second = session.hint().expect("hint");
    let before = query::remaining_count(session.board());
    assert_eq!(
        session.select(second),
        SelectOutcome::Ignored(IgnoreReason::MoveInFlight)
    );
    assert_eq!(query::remaining_count(session.board()), before);

    assert_eq!(session.settle(), LevelStatus::Playing);
    assert!(!session.is_move_in_flight());
    assert!(matches!(session.select(second), SelectOutcome::Removed { .. }));
}

#[test]
fn blocked_selection_costs_a_life_without_touching_the_board() {
    let mut session = heart_session(4);
    let _ = session.load_board(Level::new(2), conveyor());

    let outcome = session.select(CellCoord::new(0, 0));
    assert_eq!(
        outcome,
        SelectOutcome::Rejected {
            blocker: CellCoord::new(1, 0),
            lives: STARTING_LIVES - 1,
        }
    );
    assert_eq!(query::remaining_count(session.board()), 3);
    assert!(!session.is_move_in_flight(), "rejections do not lock the gate");
}

#[test]
fn running_out_of_lives_fails_the_level() {
    let mut session = heart_session(5);
    let _ = session.load_board(Level::new(2), conveyor());

    for expected_lives in (0..STARTING_LIVES).rev() {
        assert_eq!(
            session.select(CellCoord::new(1, 0)),
            SelectOutcome::Rejected {
                blocker: CellCoord::new(2, 0),
                lives: expected_lives,
            }
        );
    }

    assert_eq!(session.status(), LevelStatus::Failed);
    assert_eq!(
        session.select(CellCoord::new(2, 0)),
        SelectOutcome::Ignored(IgnoreReason::LevelOver)
    );
    assert_eq!(query::remaining_count(session.board()), 3);
}

#[test]
fn vacant_selection_is_free() {
    let mut session = heart_session(6);
    let _ = session.load_board(Level::FIRST, conveyor());

    assert_eq!(
        session.select(CellCoord::new(7, 7)),
        SelectOutcome::Ignored(IgnoreReason::Vacant)
    );
    assert_eq!(session.lives(), STARTING_LIVES);
}

#[test]
fn loaded_boards_are_hinted_by_search() {
    let mut session = heart_session(7);
    let _ = session.load_board(Level::new(5), conveyor());
    assert_eq!(session.level(), Level::new(5));
    assert_eq!(session.strategy(), None);
    assert_eq!(session.hint(), Some(CellCoord::new(2, 0)));

    assert_eq!(
        session.select(CellCoord::new(2, 0)),
        SelectOutcome::Removed { remaining: 2 }
    );
    let _ = session.settle();
    assert_eq!(session.hint(), Some(CellCoord::new(1, 0)));
}

#[test]
fn restart_and_next_level_reset_lives() {
    let mut session = heart_session(8);
    let _ = session.load_board(Level::new(3), conveyor());
    let _ = session.select(CellCoord::new(0, 0));
    assert_eq!(session.lives(), STARTING_LIVES - 1);

    let _ = session.restart_level();
    assert_eq!(session.level(), Level::new(3));
    assert_eq!(session.lives(), STARTING_LIVES);
    assert_eq!(session.status(), LevelStatus::Playing);
    assert_eq!(session.board().mask().columns(), 3, "loaded silhouette is kept");

    let _ = session.next_level();
    assert_eq!(session.level(), Level::new(4));
    assert_eq!(session.lives(), STARTING_LIVES);
}

#[test]
fn sessions_with_the_same_seed_agree() {
    let mut first = heart_session(99);
    let mut second = heart_session(99);
    assert_eq!(first.board(), second.board());

    let _ = first.next_level();
    let _ = second.next_level();
    assert_eq!(first.board(), second.board());
}

#[test]
fn silhouette_without_slots_is_cleared_immediately() {
    let session = Session::new(
        Config::default(),
        Generation::default(),
        Arc::new(SilhouetteMask::parse("..\n..").expect("mask")),
    );
    assert_eq!(session.status(), LevelStatus::Cleared);
    assert_eq!(session.hint(), None);
}

#[test]
fn starting_level_matches_a_direct_generation_with_the_same_seed() {
    let mask = Arc::new(SilhouetteMask::heart());
    let session = Session::starting_at(
        Config::new(STARTING_LIVES, 17),
        Generation::default(),
        Arc::clone(&mask),
        Level::new(4),
    );

    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let direct = Generation::default().generate_level(&mask, Level::new(4), &mut rng);

    assert_eq!(session.level(), Level::new(4));
    assert_eq!(session.board(), direct.board());
    assert_eq!(session.strategy(), Some(direct.strategy()));
}

#[test]
fn imported_board_opens_without_drawing_from_the_seed() {
    let mut imported = Session::with_board(
        Config::new(STARTING_LIVES, 23),
        Generation::default(),
        Level::new(6),
        conveyor(),
    );
    assert_eq!(imported.level(), Level::new(6));
    assert_eq!(imported.strategy(), None);
    assert_eq!(imported.board(), &conveyor());

    let fresh = Session::starting_at(
        Config::new(STARTING_LIVES, 23),
        Generation::default(),
        imported.board().shared_mask(),
        Level::new(6),
    );
    let _ = imported.restart_level();
    assert_eq!(imported.board(), fresh.board());
    assert_eq!(imported.strategy(), fresh.strategy());
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level session system that sits between an adapter and the board.
//!
//! The session owns the current level's [`Board`], the player's lives and the
//! single in-flight gate that serializes removals while an adapter animates
//! the previous one. Player selections are forwarded to the board as
//! [`Command::RemoveTile`], and the resulting [`Event`] values drive the
//! bookkeeping: rejections cost a life, accepted removals lock the gate until
//! the adapter calls [`Session::settle`].

use std::sync::Arc;

use arrow_heart_board::{self as board, query, Board};
use arrow_heart_core::{CellCoord, Command, Event, Level, SilhouetteMask};
use arrow_heart_system_generation::{Generation, Strategy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Lives granted at the start of every level unless configured otherwise.
pub const STARTING_LIVES: u8 = 3;

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    starting_lives: u8,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the given lives per level and seed.
    ///
    /// A level always grants at least one life.
    #[must_use]
    pub const fn new(starting_lives: u8, rng_seed: u64) -> Self {
        let starting_lives = if starting_lives == 0 { 1 } else { starting_lives };
        Self {
            starting_lives,
            rng_seed,
        }
    }

    /// Lives granted at the start of each level.
    #[must_use]
    pub const fn starting_lives(&self) -> u8 {
        self.starting_lives
    }

    /// Seed for the session's random source.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(STARTING_LIVES, 0)
    }
}

/// Progress of the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelStatus {
    /// Tiles remain and the player has lives left.
    Playing,
    /// Every tile has been removed.
    Cleared,
    /// The player ran out of lives.
    Failed,
}

/// Why a selection had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A previous removal has not been settled yet.
    MoveInFlight,
    /// The level is already cleared or failed.
    LevelOver,
    /// The selected cell holds no tile.
    Vacant,
}

/// Result of a player selecting a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The tile left the board; the move stays in flight until settled.
    Removed {
        /// Live tiles left on the board.
        remaining: usize,
    },
    /// The tile's path is blocked and a life was lost.
    Rejected {
        /// First live tile found along the travel path.
        blocker: CellCoord,
        /// Lives left after the penalty.
        lives: u8,
    },
    /// Nothing happened.
    Ignored(IgnoreReason),
}

/// A player's run through consecutive levels on one silhouette.
#[derive(Debug)]
pub struct Session {
    generation: Generation,
    rng: ChaCha8Rng,
    mask: Arc<SilhouetteMask>,
    starting_lives: u8,
    level: Level,
    lives: u8,
    board: Board,
    removal_plan: Vec<CellCoord>,
    strategy: Option<Strategy>,
    status: LevelStatus,
    move_in_flight: bool,
}

impl Session {
    /// Creates a session and generates the first level.
    #[must_use]
    pub fn new(config: Config, generation: Generation, mask: Arc<SilhouetteMask>) -> Self {
        Self::starting_at(config, generation, mask, Level::FIRST)
    }

    /// Creates a session whose first board is generated for `level`.
    ///
    /// That board is the first draw from the seeded random source, so it
    /// matches what [`Generation::generate_level`] yields for the same seed.
    #[must_use]
    pub fn starting_at(
        config: Config,
        generation: Generation,
        mask: Arc<SilhouetteMask>,
        level: Level,
    ) -> Self {
        let mut session = Self::idle(config, generation, mask, level);
        let _ = session.start_level(level);
        session
    }

    /// Creates a session that opens on a board built elsewhere.
    ///
    /// No board is generated; the random source stays untouched until the
    /// next restart or level change.
    #[must_use]
    pub fn with_board(config: Config, generation: Generation, level: Level, board: Board) -> Self {
        let mut session = Self::idle(config, generation, board.shared_mask(), level);
        let _ = session.load_board(level, board);
        session
    }

    fn idle(
        config: Config,
        generation: Generation,
        mask: Arc<SilhouetteMask>,
        level: Level,
    ) -> Self {
        Self {
            generation,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed()),
            board: Board::empty(Arc::clone(&mask)),
            mask,
            starting_lives: config.starting_lives(),
            level,
            lives: config.starting_lives(),
            removal_plan: Vec::new(),
            strategy: None,
            status: LevelStatus::Playing,
            move_in_flight: false,
        }
    }

    /// Generates a fresh board for `level` and resets lives and the gate.
    pub fn start_level(&mut self, level: Level) -> &Board {
        let generated = self
            .generation
            .generate_level(&self.mask, level, &mut self.rng);
        let strategy = generated.strategy();
        let (board, plan) = generated.into_parts();
        log::info!(
            "starting level {level} with {} tiles ({strategy:?})",
            board.remaining()
        );
        self.install(level, board, plan);
        self.strategy = Some(strategy);
        &self.board
    }

    /// Replays the current level on a freshly generated board.
    pub fn restart_level(&mut self) -> &Board {
        self.start_level(self.level)
    }

    /// Advances to the following level.
    pub fn next_level(&mut self) -> &Board {
        self.start_level(self.level.next())
    }

    /// Installs a board built elsewhere, such as an imported layout.
    ///
    /// The session adopts the board's silhouette for later levels. Hints
    /// follow a clearing order discovered by search, since the placement
    /// history is unknown.
    pub fn load_board(&mut self, level: Level, board: Board) -> &Board {
        let plan = query::clearing_order(&board);
        if !plan.is_complete() {
            log::warn!(
                "loaded board for level {level} cannot be fully cleared; {} tile(s) stuck",
                plan.stuck.len()
            );
        }
        self.mask = board.shared_mask();
        self.install(level, board, plan.order);
        self.strategy = None;
        &self.board
    }

    /// Forwards a player selection to the board.
    pub fn select(&mut self, cell: CellCoord) -> SelectOutcome {
        if self.status != LevelStatus::Playing {
            return SelectOutcome::Ignored(IgnoreReason::LevelOver);
        }
        if self.move_in_flight {
            return SelectOutcome::Ignored(IgnoreReason::MoveInFlight);
        }

        let mut events = Vec::new();
        board::apply(&mut self.board, Command::RemoveTile { cell }, &mut events);
        self.absorb(&events)
    }

    /// Releases the in-flight gate once the adapter has finished presenting
    /// the last removal, and reports the level's status.
    pub fn settle(&mut self) -> LevelStatus {
        self.move_in_flight = false;
        if self.status == LevelStatus::Playing && query::is_cleared(&self.board) {
            log::info!("level {} cleared with {} lives left", self.level, self.lives);
            self.status = LevelStatus::Cleared;
        }
        self.status
    }

    /// Next tile from the level's removal plan that is still on the board.
    ///
    /// Removing a tile only ever unblocks others, so the first surviving
    /// entry of a valid plan is always removable, whatever the player has
    /// removed in between.
    #[must_use]
    pub fn hint(&self) -> Option<CellCoord> {
        self.removal_plan
            .iter()
            .copied()
            .find(|cell| self.board.tile_at(*cell).is_some())
    }

    /// Current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Lives left in the current level.
    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Status of the current level.
    #[must_use]
    pub fn status(&self) -> LevelStatus {
        self.status
    }

    /// How the current board was generated; `None` for loaded boards.
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Reports whether an accepted removal awaits [`Session::settle`].
    #[must_use]
    pub fn is_move_in_flight(&self) -> bool {
        self.move_in_flight
    }

    fn install(&mut self, level: Level, board: Board, removal_plan: Vec<CellCoord>) {
        self.level = level;
        self.lives = self.starting_lives;
        self.status = if query::is_cleared(&board) {
            LevelStatus::Cleared
        } else {
            LevelStatus::Playing
        };
        self.board = board;
        self.removal_plan = removal_plan;
        self.move_in_flight = false;
    }

    fn absorb(&mut self, events: &[Event]) -> SelectOutcome {
        let mut outcome = SelectOutcome::Ignored(IgnoreReason::Vacant);
        for event in events {
            match *event {
                Event::TileRemoved { remaining, .. } => {
                    self.move_in_flight = true;
                    outcome = SelectOutcome::Removed { remaining };
                }
                Event::RemovalRejected { blocker, .. } => {
                    self.lives = self.lives.saturating_sub(1);
                    if self.lives == 0 {
                        log::info!("level {} failed", self.level);
                        self.status = LevelStatus::Failed;
                    }
                    outcome = SelectOutcome::Rejected {
                        blocker,
                        lives: self.lives,
                    };
                }
            }
        }
        outcome
    }
}

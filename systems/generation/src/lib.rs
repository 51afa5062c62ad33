#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reverse-placement board generation.
//!
//! Tiles are placed one at a time, and a tile is only committed when its
//! travel path is already clear of every tile placed *before* it. Tiles not
//! yet placed are ignored. Removing the tiles in the reverse of their
//! placement order is therefore always legal: when a tile's turn comes, the
//! only tiles left are the ones placed before it, and those were exactly the
//! tiles it was checked against. Every board produced here, full or partial,
//! carries its placement order so that solution can be replayed.
//!
//! A full run fails when its attempt budget runs out before every playable
//! slot is filled. [`Generation::generate_level`] retries full runs up to a
//! limit and then falls back to [`Generation::generate_partial`], which
//! cannot fail.

use std::sync::Arc;

use arrow_heart_board::{path, Board};
use arrow_heart_core::{CellCoord, CheckMode, Facing, Level, SilhouetteMask, Tile, TileKind};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregated tuning knobs controlling board generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Attempts a single full run may spend before it is declared a failure.
    pub full_attempt_budget: u32,
    /// Full runs tried per level before falling back to a partial board.
    pub full_retry_limit: u32,
    /// Orientation checks the partial fallback may spend in total.
    pub partial_attempt_budget: u32,
    /// Share of playable slots the partial fallback aims to fill.
    pub partial_fill_ratio: f64,
    /// Probability curve deciding how often curved tiles are chosen.
    pub curve: CurveBias,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            full_attempt_budget: 3_000,
            full_retry_limit: 100,
            partial_attempt_budget: 2_000,
            partial_fill_ratio: 0.8,
            curve: CurveBias::default(),
        }
    }
}

impl GenerationTuning {
    /// Checks that every knob holds a usable value.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !self.curve.base.is_finite() || !self.curve.per_level.is_finite() {
            return Err(TuningError::NonFiniteCurveBias);
        }
        if !(0.0..=1.0).contains(&self.partial_fill_ratio) {
            return Err(TuningError::FillRatioOutOfRange(self.partial_fill_ratio));
        }
        Ok(())
    }
}

/// Linear curve-probability schedule: `base + per_level × level`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveBias {
    /// Probability offset applied at every level.
    pub base: f64,
    /// Probability added per level number; higher levels favour curves.
    pub per_level: f64,
}

impl Default for CurveBias {
    fn default() -> Self {
        Self {
            base: 0.2,
            per_level: 0.05,
        }
    }
}

impl CurveBias {
    /// Chance that a freshly drawn tile is a curve, clamped to `[0, 1]`.
    #[must_use]
    pub fn probability(&self, level: Level) -> f64 {
        let raw = self.base + self.per_level * f64::from(level.get());
        if raw.is_nan() {
            0.0
        } else {
            raw.clamp(0.0, 1.0)
        }
    }
}

/// Reasons a tuning surface may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TuningError {
    /// The curve bias contains NaN or an infinity.
    #[error("curve bias coefficients must be finite")]
    NonFiniteCurveBias,
    /// The partial fill ratio lies outside `[0, 1]`.
    #[error("partial fill ratio {0} must lie between 0 and 1")]
    FillRatioOutOfRange(f64),
}

/// Result of a single full generation run.
#[derive(Clone, Debug)]
pub struct FullAttempt {
    /// Board as it stood when the run ended.
    pub board: Board,
    /// Cells in the order their tiles were placed.
    pub placements: Vec<CellCoord>,
    /// Attempts consumed by the run.
    pub attempts: u32,
}

impl FullAttempt {
    /// Reports whether every playable slot was filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.board.is_full()
    }
}

/// Result of the partial fallback.
#[derive(Clone, Debug)]
pub struct PartialAttempt {
    /// Board as it stood when the fallback stopped.
    pub board: Board,
    /// Cells in the order their tiles were placed.
    pub placements: Vec<CellCoord>,
    /// Orientation checks consumed.
    pub attempts: u32,
    /// Number of tiles the fallback aimed for.
    pub target: usize,
}

/// How a level's board came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// A full run succeeded.
    Full {
        /// Full runs performed, including the successful one.
        runs: u32,
    },
    /// Every full run failed and the partial fallback was used.
    Partial {
        /// Full runs performed before falling back.
        runs: u32,
    },
}

/// Board generated for a level together with its placement history.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    level: Level,
    board: Board,
    placements: Vec<CellCoord>,
    strategy: Strategy,
}

impl GeneratedLevel {
    /// Level the board was generated for.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Generated board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// How the board was produced.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Cells in the order their tiles were placed.
    #[must_use]
    pub fn placements(&self) -> &[CellCoord] {
        &self.placements
    }

    /// A removal order that clears the board: placement order, reversed.
    #[must_use]
    pub fn removal_order(&self) -> Vec<CellCoord> {
        self.placements.iter().rev().copied().collect()
    }

    /// Consumes the level, yielding the board and its removal order.
    #[must_use]
    pub fn into_parts(self) -> (Board, Vec<CellCoord>) {
        let order = self.removal_order();
        (self.board, order)
    }
}

/// Board generator driven by an injected random source.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    tuning: GenerationTuning,
}

impl Generation {
    /// Creates a generator with the provided tuning surface.
    #[must_use]
    pub fn new(tuning: GenerationTuning) -> Self {
        Self { tuning }
    }

    /// Tuning in effect.
    #[must_use]
    pub fn tuning(&self) -> &GenerationTuning {
        &self.tuning
    }

    /// Builds the board for a level: full runs until one succeeds or the
    /// retry limit is reached, then the partial fallback.
    pub fn generate_level<R: Rng + ?Sized>(
        &self,
        mask: &Arc<SilhouetteMask>,
        level: Level,
        rng: &mut R,
    ) -> GeneratedLevel {
        let mut runs = 0;
        while runs < self.tuning.full_retry_limit {
            runs += 1;
            let attempt = self.generate_full(mask, level, rng);
            if attempt.is_complete() {
                log::debug!(
                    "level {level}: full board after {runs} run(s), {} attempts in the last",
                    attempt.attempts
                );
                return GeneratedLevel {
                    level,
                    board: attempt.board,
                    placements: attempt.placements,
                    strategy: Strategy::Full { runs },
                };
            }
        }

        log::warn!("level {level}: no full board after {runs} run(s); using a partial board");
        let partial = self.generate_partial(mask, level, rng);
        GeneratedLevel {
            level,
            board: partial.board,
            placements: partial.placements,
            strategy: Strategy::Partial { runs },
        }
    }

    /// One full run of randomized reverse placement.
    ///
    /// Visits the playable slots in shuffled order, then samples random grid
    /// cells once the shuffled list is spent. Each visit to an empty playable
    /// slot draws a kind and facing and keeps the tile only if its path is
    /// clear of the tiles placed so far. A slot that fails stays empty and may
    /// be filled by a later random visit.
    pub fn generate_full<R: Rng + ?Sized>(
        &self,
        mask: &Arc<SilhouetteMask>,
        level: Level,
        rng: &mut R,
    ) -> FullAttempt {
        let mut board = Board::empty(Arc::clone(mask));
        let playable = mask.playable_count();
        let mut placements = Vec::with_capacity(playable);
        let mut attempts = 0;

        if playable == 0 {
            return FullAttempt {
                board,
                placements,
                attempts,
            };
        }

        let mut order = mask.playable_cells();
        order.shuffle(rng);
        let mut shuffled = order.into_iter();
        let curve_probability = self.tuning.curve.probability(level);

        while placements.len() < playable && attempts < self.tuning.full_attempt_budget {
            attempts += 1;

            let cell = match shuffled.next() {
                Some(cell) => cell,
                None => CellCoord::new(
                    rng.gen_range(0..mask.columns()),
                    rng.gen_range(0..mask.rows()),
                ),
            };
            if !mask.is_playable(cell) || board.tile_at(cell).is_some() {
                continue;
            }

            let kind = if rng.gen_bool(curve_probability) {
                TileKind::Curve
            } else {
                TileKind::Straight
            };
            let facing = Facing::ALL[rng.gen_range(0..Facing::ALL.len())];

            // Checked against earlier placements only; see the crate docs.
            if path::is_clear(&board, cell, kind, facing, CheckMode::Generation)
                && board.place(cell, Tile::new(kind, facing)).is_ok()
            {
                placements.push(cell);
            }
        }

        log::trace!(
            "full run for level {level}: {}/{playable} placed in {attempts} attempts",
            placements.len()
        );
        FullAttempt {
            board,
            placements,
            attempts,
        }
    }

    /// Degraded generation that always yields a board.
    ///
    /// Visits the shuffled playable slots once. Each slot takes the first
    /// orientation, straight before curve and facings clockwise from up, whose
    /// path is clear of the tiles placed so far. Slots with no clear
    /// orientation stay empty. Stops once the fill target is met or the
    /// attempt budget is spent; every orientation check counts against it.
    pub fn generate_partial<R: Rng + ?Sized>(
        &self,
        mask: &Arc<SilhouetteMask>,
        level: Level,
        rng: &mut R,
    ) -> PartialAttempt {
        let mut board = Board::empty(Arc::clone(mask));
        let playable = mask.playable_count();
        let target = (playable as f64 * self.tuning.partial_fill_ratio).floor() as usize;
        let mut placements = Vec::with_capacity(playable);
        let mut attempts = 0;

        let mut order = mask.playable_cells();
        order.shuffle(rng);

        'slots: for cell in order {
            if placements.len() >= target {
                break;
            }
            if board.tile_at(cell).is_some() {
                continue;
            }

            'orientations: for kind in TileKind::ALL {
                for facing in Facing::ALL {
                    if attempts >= self.tuning.partial_attempt_budget {
                        break 'slots;
                    }
                    attempts += 1;
                    if path::is_clear(&board, cell, kind, facing, CheckMode::Generation)
                        && board.place(cell, Tile::new(kind, facing)).is_ok()
                    {
                        placements.push(cell);
                        break 'orientations;
                    }
                }
            }
        }

        log::debug!(
            "partial board for level {level}: {}/{playable} placed (target {target}) in {attempts} checks",
            placements.len()
        );
        PartialAttempt {
            board,
            placements,
            attempts,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_probability_follows_the_level() {
        let bias = CurveBias::default();
        assert!((bias.probability(Level::new(1)) - 0.25).abs() < 1e-9);
        assert!((bias.probability(Level::new(4)) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn curve_probability_is_clamped() {
        let bias = CurveBias::default();
        assert_eq!(bias.probability(Level::new(100)), 1.0);

        let negative = CurveBias {
            base: -1.0,
            per_level: 0.0,
        };
        assert_eq!(negative.probability(Level::FIRST), 0.0);
    }

    #[test]
    fn default_tuning_is_valid() {
        assert_eq!(GenerationTuning::default().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut tuning = GenerationTuning::default();
        tuning.partial_fill_ratio = 1.5;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::FillRatioOutOfRange(1.5))
        );

        let mut tuning = GenerationTuning::default();
        tuning.curve.per_level = f64::INFINITY;
        assert_eq!(tuning.validate(), Err(TuningError::NonFiniteCurveBias));
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the arrow heart puzzle.
//!
//! `generate` prints a freshly generated board together with a shareable
//! layout string; `play` runs an interactive session on stdin.

mod config;
mod layout_transfer;

use std::{
    fmt::Write as _,
    io::{self, BufRead, Write as _},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use arrow_heart_board::{tile_glyph, Board};
use arrow_heart_core::{CellCoord, Level};
use arrow_heart_system_generation::{Generation, Strategy};
use arrow_heart_system_session::{Config, IgnoreReason, LevelStatus, SelectOutcome, Session};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "arrow-heart", about = "Clear the heart by sliding arrows off the board")]
struct Cli {
    /// TOML file with generation tuning, lives and an optional silhouette.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates a board and prints it with its layout string.
    Generate {
        #[command(flatten)]
        start: StartArgs,
        /// Also print a removal order that clears the board.
        #[arg(long)]
        solution: bool,
    },
    /// Plays interactively, reading moves from stdin.
    Play {
        #[command(flatten)]
        start: StartArgs,
        /// Layout string to replay instead of generating the first level.
        #[arg(long)]
        layout: Option<String>,
    },
}

#[derive(Debug, Args)]
struct StartArgs {
    /// Level to generate.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Seed for the random source; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

impl StartArgs {
    fn level(&self) -> Level {
        Level::new(self.level)
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Entry point for the arrow heart command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    log::debug!("using {config:?}");

    match cli.command {
        Command::Generate { start, solution } => generate(&config, &start, solution),
        Command::Play { start, layout } => play(&config, &start, layout.as_deref()),
    }
}

fn generate(config: &CliConfig, start: &StartArgs, solution: bool) -> Result<()> {
    let mask = Arc::new(config.silhouette()?);
    let seed = start.seed();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let generation = Generation::new(config.generation.clone());
    let generated = generation.generate_level(&mask, start.level(), &mut rng);

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "level {} (seed {seed}): {}",
        generated.level(),
        describe_strategy(generated.strategy())
    )?;
    write!(stdout, "{}", render_board(generated.board()))?;

    let layout = layout_transfer::encode(generated.level(), generated.board())
        .context("failed to encode layout")?;
    writeln!(stdout, "layout: {layout}")?;

    if solution {
        let order: Vec<String> = generated
            .removal_order()
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(stdout, "solution: {}", order.join(" "))?;
    }
    Ok(())
}

fn play(config: &CliConfig, start: &StartArgs, layout: Option<&str>) -> Result<()> {
    let imported = layout
        .map(|value| layout_transfer::decode(value).context("invalid layout string"))
        .transpose()?;

    let config_for_session = Config::new(config.lives, start.seed());
    let generation = Generation::new(config.generation.clone());
    let mut session = match imported {
        Some((level, board)) => Session::with_board(config_for_session, generation, level, board),
        None => Session::starting_at(
            config_for_session,
            generation,
            Arc::new(config.silhouette()?),
            start.level(),
        ),
    };

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "commands: <column> <row> | hint | board | restart | next | quit"
    )?;
    print_status(&mut stdout, &session)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "board" => print_status(&mut stdout, &session)?,
            "hint" => match session.hint() {
                Some(cell) => writeln!(stdout, "try {cell}")?,
                None => writeln!(stdout, "no removable tile left")?,
            },
            "restart" => {
                let _ = session.restart_level();
                print_status(&mut stdout, &session)?;
            }
            "next" => {
                let _ = session.next_level();
                print_status(&mut stdout, &session)?;
            }
            input => match parse_cell(input) {
                Some(cell) => select(&mut stdout, &mut session, cell)?,
                None => writeln!(stdout, "unrecognised input '{input}'")?,
            },
        }
    }
    Ok(())
}

fn select(out: &mut impl io::Write, session: &mut Session, cell: CellCoord) -> Result<()> {
    match session.select(cell) {
        SelectOutcome::Removed { remaining } => {
            writeln!(out, "{cell} slides away, {remaining} left")?;
            match session.settle() {
                LevelStatus::Cleared => writeln!(
                    out,
                    "level {} cleared! type 'next' to continue",
                    session.level()
                )?,
                LevelStatus::Playing | LevelStatus::Failed => {
                    write!(out, "{}", render_board(session.board()))?;
                }
            }
        }
        SelectOutcome::Rejected { blocker, lives } => {
            writeln!(out, "{cell} is blocked by {blocker}, lives left: {lives}")?;
            if session.status() == LevelStatus::Failed {
                writeln!(out, "out of lives; type 'restart' to try again")?;
            }
        }
        SelectOutcome::Ignored(IgnoreReason::Vacant) => writeln!(out, "no tile at {cell}")?,
        SelectOutcome::Ignored(IgnoreReason::LevelOver) => {
            writeln!(out, "level is over; type 'next' or 'restart'")?;
        }
        SelectOutcome::Ignored(IgnoreReason::MoveInFlight) => {
            writeln!(out, "previous move still settling")?;
        }
    }
    Ok(())
}

fn print_status(out: &mut impl io::Write, session: &Session) -> Result<()> {
    let origin = match session.strategy() {
        Some(strategy) => describe_strategy(strategy),
        None => "imported layout".to_owned(),
    };
    writeln!(
        out,
        "level {} ({origin}), lives {}",
        session.level(),
        session.lives()
    )?;
    write!(out, "{}", render_board(session.board()))?;
    Ok(())
}

fn describe_strategy(strategy: Strategy) -> String {
    match strategy {
        Strategy::Full { runs } => format!("full board after {runs} run(s)"),
        Strategy::Partial { runs } => {
            format!("partial board after {runs} failed full run(s)")
        }
    }
}

/// Renders the board with column and row indices along the edges.
fn render_board(board: &Board) -> String {
    let mask = board.mask();
    let mut rendered = String::from("   ");
    for column in 0..mask.columns() {
        let _ = write!(rendered, "{:>2}", column % 100);
    }
    rendered.push('\n');

    for row in 0..mask.rows() {
        let _ = write!(rendered, "{row:>2} ");
        for column in 0..mask.columns() {
            let cell = CellCoord::new(column, row);
            let glyph = match board.tile_at(cell) {
                Some(tile) => tile_glyph(tile),
                None if mask.is_playable(cell) => '·',
                None => ' ',
            };
            let _ = write!(rendered, " {glyph}");
        }
        rendered.push('\n');
    }
    rendered
}

fn parse_cell(input: &str) -> Option<CellCoord> {
    let mut parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(CellCoord::new(column, row))
}

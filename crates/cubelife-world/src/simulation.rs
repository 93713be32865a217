//! Tick execution.

use crate::board::Board;
use crate::rule::next_state;
use cubelife_core::{BoardConfig, CellState, Coord, Result, StateChange, Stats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Evaluate one tick against a frozen board, then apply the resulting changes.
///
/// Every cell is evaluated before any change is written, so no change is
/// visible to neighbor counting within the same tick. `stats` is reset and
/// refilled; transitions back to `Default` are reported but not counted.
pub fn run_tick(board: &mut Board, stats: &mut Stats) -> Result<Vec<StateChange>> {
    stats.reset();

    let mut changes = Vec::new();
    for (pos, current) in board.iter() {
        let live_neighbors = board.count_live_neighbors(pos);
        if let Some(new_state) = next_state(current, live_neighbors) {
            stats.record(new_state);
            changes.push(StateChange::new(pos, new_state));
        }
    }

    board.apply(&changes)?;
    Ok(changes)
}

/// What one completed tick produced, handed to the caller by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// 1-based tick number since the board was generated
    pub tick: u64,
    /// Ticks still to run after this one; 0 outside of playback
    pub remaining: u64,
    pub changes: Vec<StateChange>,
    pub stats: Stats,
}

/// A board together with its running statistics.
#[derive(Debug, Clone)]
pub struct Simulation {
    board: Board,
    stats: Stats,
    tick: u64,
}

impl Simulation {
    /// Wrap an existing board. Stats start at zero.
    pub fn new(board: Board) -> Self {
        let stats = Stats::new(board.cell_count());
        Self {
            board,
            stats,
            tick: 0,
        }
    }

    /// Create and seed a fresh board from configuration.
    pub fn generate(config: &BoardConfig) -> Self {
        Self::generate_with(config, |_, _| {})
    }

    /// Like [`Simulation::generate`], calling `on_cell` for every cell as it is
    /// seeded.
    #[instrument(skip(config, on_cell), fields(
        size_x = config.size_x,
        size_y = config.size_y,
        size_z = config.size_z,
        probability = config.spawn_probability,
    ))]
    pub fn generate_with<F>(config: &BoardConfig, on_cell: F) -> Self
    where
        F: FnMut(Coord, CellState),
    {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut board = Board::new(config.size_x, config.size_y, config.size_z);
        let seeded = board.seed_with(config.spawn_probability, &mut rng, on_cell);

        let mut sim = Self::new(board);
        sim.stats.survivors = seeded;

        info!(
            dimensions = %sim.board.dimensions(),
            cells = sim.board.cell_count(),
            seeded,
            "Board generated"
        );
        sim
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Ticks run since the board was generated
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Execute one tick
    pub fn step(&mut self) -> Result<TickReport> {
        let changes = run_tick(&mut self.board, &mut self.stats)?;
        self.tick += 1;

        debug!(
            tick = self.tick,
            changes = changes.len(),
            survivors = self.stats.survivors,
            reproductions = self.stats.reproductions,
            underpopulations = self.stats.underpopulations,
            overpopulations = self.stats.overpopulations,
            empty = self.stats.empty_count(),
            "Tick complete"
        );

        Ok(TickReport {
            tick: self.tick,
            remaining: 0,
            changes,
            stats: self.stats,
        })
    }
}

//! Per-tick population statistics.

use crate::types::CellState;
use serde::{Deserialize, Serialize};

/// Transition counts for one tick (or the initial seeding).
///
/// `total` is fixed for the lifetime of a board. The empty count is derived
/// from the other counters rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    total: u64,
    pub survivors: u64,
    pub reproductions: u64,
    pub underpopulations: u64,
    pub overpopulations: u64,
}

impl Stats {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Zero the four transition counters. `total` is untouched.
    pub fn reset(&mut self) {
        self.survivors = 0;
        self.reproductions = 0;
        self.underpopulations = 0;
        self.overpopulations = 0;
    }

    /// Count one transition into `state`. `Default` is not a counted category.
    pub fn record(&mut self, state: CellState) {
        match state {
            CellState::Survivor => self.survivors += 1,
            CellState::Reproduction => self.reproductions += 1,
            CellState::Underpopulation => self.underpopulations += 1,
            CellState::Overpopulation => self.overpopulations += 1,
            CellState::Default => {}
        }
    }

    pub fn alive_count(&self) -> u64 {
        self.survivors + self.reproductions
    }

    pub fn empty_count(&self) -> u64 {
        self.total.saturating_sub(
            self.survivors + self.reproductions + self.underpopulations + self.overpopulations,
        )
    }

    pub fn alive_fraction(&self) -> f64 {
        self.fraction(self.alive_count())
    }

    pub fn ratios(&self) -> Ratios {
        Ratios {
            alive: self.alive_fraction(),
            survivor: self.fraction(self.survivors),
            reproduction: self.fraction(self.reproductions),
            underpopulation: self.fraction(self.underpopulations),
            overpopulation: self.fraction(self.overpopulations),
            empty: self.fraction(self.empty_count()),
        }
    }

    // An empty board has no meaningful ratio; report 0.0 rather than NaN.
    fn fraction(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

/// Per-category fractions of the total cell count, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ratios {
    pub alive: f64,
    pub survivor: f64,
    pub reproduction: f64,
    pub underpopulation: f64,
    pub overpopulation: f64,
    pub empty: f64,
}

//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cell count at which a front-end should warn about rendering cost.
///
/// The core itself handles any size; this is only a hint for callers.
pub const LARGE_BOARD_CELL_HINT: u64 = 5000;

/// Unique identifier for a playback run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 3D integer position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Board extents. Every axis is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    x: i32,
    y: i32,
    z: i32,
}

impl Dimensions {
    /// Build dimensions, raising any axis below 1 to 1.
    pub fn clamped(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: x.max(1),
            y: y.max(1),
            z: z.max(1),
        }
    }

    /// Build dimensions, rejecting any axis below 1.
    pub fn strict(x: i32, y: i32, z: i32) -> Result<Self> {
        for (axis, value) in [('x', x), ('y', y), ('z', z)] {
            if value < 1 {
                return Err(Error::InvalidDimension { axis, value });
            }
        }
        Ok(Self { x, y, z })
    }

    /// True if `clamped` would change any of the requested axes.
    pub fn needs_clamp(x: i32, y: i32, z: i32) -> bool {
        x < 1 || y < 1 || z < 1
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn cell_count(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    pub fn contains(&self, coord: Coord) -> bool {
        (0..self.x).contains(&coord.x)
            && (0..self.y).contains(&coord.y)
            && (0..self.z).contains(&coord.z)
    }

    pub fn exceeds_cell_hint(&self) -> bool {
        self.cell_count() >= LARGE_BOARD_CELL_HINT
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// State of a single cell.
///
/// `Underpopulation` and `Overpopulation` are dead; they only record why the
/// cell died on the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Default,
    Underpopulation,
    Overpopulation,
    Survivor,
    Reproduction,
}

impl CellState {
    pub const ALL: [CellState; 5] = [
        CellState::Default,
        CellState::Underpopulation,
        CellState::Overpopulation,
        CellState::Survivor,
        CellState::Reproduction,
    ];

    pub fn is_alive(&self) -> bool {
        matches!(self, CellState::Survivor | CellState::Reproduction)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, CellState::Default)
    }
}

/// One cell's transition decided during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub pos: Coord,
    pub new_state: CellState,
}

impl StateChange {
    pub fn new(pos: Coord, new_state: CellState) -> Self {
        Self { pos, new_state }
    }
}

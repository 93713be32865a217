//! 3D cellular automaton simulation engine.
//!
//! This module implements the bounded 3D board, the life rule, tick execution
//! and cancellable playback.

pub mod board;
pub mod rule;
pub mod simulation;
pub mod engine;
pub mod playback;

pub use board::Board;
pub use rule::next_state;
pub use simulation::{run_tick, Simulation, TickReport};
pub use engine::{EnginePhase, SimulationEngine};
pub use playback::{PlaybackHandle, PlaybackSummary};

//! Error types for the simulation.

use crate::types::{Coord, Dimensions};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid dimension on {axis} axis: {value}")]
    InvalidDimension { axis: char, value: i32 },

    #[error("Coordinate {coord} is outside board {dimensions}")]
    OutOfRange { coord: Coord, dimensions: Dimensions },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

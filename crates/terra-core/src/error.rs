//! Error types for the simulation.

use crate::biome::Biome;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid dimensions {rows}x{cols}: rows and cols must be nonzero")]
    InvalidDimensions { rows: u32, cols: u32 },

    #[error("could not seed biome {biome}: no compatible cell found in {attempts} attempts")]
    SeedExhaustion { biome: Biome, attempts: usize },

    #[error("cell ({row}, {col}) is out of bounds for a {rows}x{cols} grid")]
    OutOfBounds {
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    },
}

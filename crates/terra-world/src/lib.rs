//! Biome spread engine.
//!
//! This crate implements the 2D grid world where biomes grow outward from
//! seed cells until the map settles.

pub mod cell;
pub mod grid;
pub mod seed;
pub mod simulation;

pub use cell::{Cell, CellView};
pub use grid::Grid;
pub use seed::generate_seed;
pub use simulation::{RunReport, Simulation};

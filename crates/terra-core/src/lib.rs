//! Core types and utilities for the Terra biome spread simulation.

pub mod biome;
pub mod color;
pub mod config;
pub mod error;
pub mod types;

pub use biome::{Biome, Subtype};
pub use color::Rgb;
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

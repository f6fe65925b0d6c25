//! Dense 2D grid storage, neighbor queries, and biome seeding.

use crate::cell::Cell;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use terra_core::{Biome, Error, Position, Result};
use tracing::trace;

/// Neighbor scan order: down, up, right, left. Conversion attempts and
/// their RNG draws happen in this order, so it is part of the
/// reproducibility contract.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Random placement attempts allowed per seed, scaled by grid area
const SEED_ATTEMPTS_PER_CELL: usize = 100;

/// A dense, edge-clipped 2D grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell Void
    pub fn new(rows: u32, cols: u32) -> Self {
        let mut cells = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::void(Position::new(row, col)));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index(&self, row: u32, col: u32) -> usize {
        (row * self.cols + col) as usize
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    pub(crate) fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub(crate) fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Indices of the up-to-4 grid neighbors of `idx`, clipped at the
    /// edges, in the fixed scan order
    pub fn neighbor_indices(&self, idx: usize) -> Vec<usize> {
        let row = idx as i64 / self.cols as i64;
        let col = idx as i64 % self.cols as i64;
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = row + dr;
                let c = col + dc;
                if r >= 0 && r < self.rows as i64 && c >= 0 && c < self.cols as i64 {
                    Some((r * self.cols as i64 + c) as usize)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Count cells of the subject's own biome in its 3x3 neighborhood,
    /// clipped at the edges and including the subject itself
    pub fn density_coeff(&self, idx: usize) -> u8 {
        let subject = self.cells[idx].biome;
        let row = idx as i64 / self.cols as i64;
        let col = idx as i64 % self.cols as i64;
        let mut count = 0;
        for r in (row - 1).max(0)..=(row + 1).min(self.rows as i64 - 1) {
            for c in (col - 1).max(0)..=(col + 1).min(self.cols as i64 - 1) {
                if self.cells[(r * self.cols as i64 + c) as usize].biome == subject {
                    count += 1;
                }
            }
        }
        count
    }

    pub(crate) fn clear_changed(&mut self) {
        for cell in &mut self.cells {
            cell.changed = false;
        }
    }

    /// Place one seed of each primary biome on distinct random cells
    pub(crate) fn place_primary_seeds(&mut self, rng: &mut ChaCha8Rng) -> Result<()> {
        let mut used: HashSet<(u32, u32)> = HashSet::new();
        for biome in Biome::PRIMARY {
            let mut attempts = 0;
            loop {
                if attempts >= self.seed_attempt_cap() {
                    return Err(Error::SeedExhaustion { biome, attempts });
                }
                attempts += 1;
                let row = rng.gen_range(0..self.rows);
                let col = rng.gen_range(0..self.cols);
                if used.contains(&(row, col)) {
                    continue;
                }
                used.insert((row, col));
                let subtype = biome.pick_subtype(rng);
                let idx = self.index(row, col);
                self.cells[idx] = Cell::seeded(Position::new(row, col), biome, subtype);
                trace!(%biome, row, col, "placed primary seed");
                break;
            }
        }
        Ok(())
    }

    /// Place one seed of each secondary biome, each on a distinct random
    /// cell whose current biome the newcomer is allowed to convert, so
    /// every secondary biome starts with at least one valid growth edge.
    ///
    /// The retry loop is bounded; on a map with no compatible cell left
    /// this surfaces [`Error::SeedExhaustion`] instead of spinning.
    pub(crate) fn place_secondary_seeds(&mut self, rng: &mut ChaCha8Rng) -> Result<()> {
        let mut used: HashSet<(u32, u32)> = HashSet::new();
        for biome in Biome::SECONDARY {
            let mut attempts = 0;
            loop {
                if attempts >= self.seed_attempt_cap() {
                    return Err(Error::SeedExhaustion { biome, attempts });
                }
                attempts += 1;
                let row = rng.gen_range(0..self.rows);
                let col = rng.gen_range(0..self.cols);
                if used.contains(&(row, col)) {
                    continue;
                }
                let idx = self.index(row, col);
                if !biome.submissive().contains(&self.cells[idx].biome) {
                    continue;
                }
                used.insert((row, col));
                let subtype = biome.pick_subtype(rng);
                self.cells[idx] = Cell::seeded(Position::new(row, col), biome, subtype);
                trace!(%biome, row, col, "placed secondary seed");
                break;
            }
        }
        Ok(())
    }

    fn seed_attempt_cap(&self) -> usize {
        self.cells.len().max(1) * SEED_ATTEMPTS_PER_CELL
    }
}

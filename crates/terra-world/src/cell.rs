//! Per-cell state and render snapshots.

use serde::{Deserialize, Serialize};
use terra_core::color::BASE_HEIGHT;
use terra_core::{Biome, Position, Rgb, Subtype};

/// One cell of the grid.
///
/// The biome tag determines behavior and appearance; the remaining fields
/// are shared simulation state that survives a change of tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    pub biome: Biome,
    /// Ticks since this cell last converted
    pub age: u32,
    /// Elevation accumulator, nudged on conversion; starts at [`BASE_HEIGHT`]
    pub height: i32,
    /// Set for exactly the tick in which this cell was converted
    pub changed: bool,
    /// Set once this cell has taken part in a conversion, as source or target
    pub active: bool,
    /// Cosmetic variant, absent for void and water
    pub subtype: Option<Subtype>,
    /// Biome this cell held before a snowy source converted it
    pub prior: Option<Biome>,
}

impl Cell {
    pub fn void(position: Position) -> Self {
        Self {
            position,
            biome: Biome::Void,
            age: 0,
            height: BASE_HEIGHT,
            changed: false,
            active: false,
            subtype: None,
            prior: None,
        }
    }

    /// A freshly placed seed cell
    pub fn seeded(position: Position, biome: Biome, subtype: Option<Subtype>) -> Self {
        Self {
            position,
            biome,
            age: 0,
            height: BASE_HEIGHT,
            changed: false,
            active: false,
            subtype,
            prior: None,
        }
    }

    /// Color to draw this cell with. Water renders flat; every other biome
    /// is shaded by elevation.
    pub fn display_color(&self) -> Rgb {
        match self.biome {
            Biome::Water => self.biome.base_color(),
            biome => biome.base_color().shade(self.height),
        }
    }
}

/// Read-only snapshot of a cell for the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub row: u32,
    pub col: u32,
    pub biome: Biome,
    pub subtype: Option<Subtype>,
    pub age: u32,
    pub height: i32,
    pub color: Rgb,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            row: cell.position.row,
            col: cell.position.col,
            biome: cell.biome,
            subtype: cell.subtype,
            age: cell.age,
            height: cell.height,
            color: cell.display_color(),
        }
    }
}

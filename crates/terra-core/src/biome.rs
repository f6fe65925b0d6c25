//! Biome variants and their spread rules.
//!
//! Each biome is fully described by four pieces of static data: the set of
//! biomes it may convert (its submissive set), the age past which it goes
//! dormant, its base display color, and whether its chance test reads the
//! local density coefficient. The dynamic per-cell state lives in
//! `terra-world`; everything here is pure.

use crate::color::Rgb;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biome tag for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Biome {
    Void,
    Water,
    Plains,
    Desert,
    Forest,
    Mountain,
    Swamp,
    Snowy,
}

impl Biome {
    /// Biomes seeded at setup, in placement order
    pub const PRIMARY: [Biome; 3] = [Biome::Water, Biome::Plains, Biome::Desert];

    /// Biomes seeded after the primary phase settles, in placement order
    pub const SECONDARY: [Biome; 4] = [Biome::Forest, Biome::Mountain, Biome::Swamp, Biome::Snowy];

    pub fn all() -> [Biome; 8] {
        [
            Biome::Void,
            Biome::Water,
            Biome::Plains,
            Biome::Desert,
            Biome::Forest,
            Biome::Mountain,
            Biome::Swamp,
            Biome::Snowy,
        ]
    }

    /// The biomes this biome is allowed to convert.
    ///
    /// These edges form a DAG: nothing converts back toward Void, so each
    /// cell changes type a bounded number of times and the automaton must
    /// terminate.
    pub const fn submissive(self) -> &'static [Biome] {
        match self {
            Biome::Void => &[],
            Biome::Water => &[Biome::Void],
            Biome::Plains => &[Biome::Water, Biome::Desert],
            Biome::Desert => &[Biome::Water],
            Biome::Forest => &[Biome::Plains],
            Biome::Mountain => &[Biome::Plains],
            Biome::Swamp => &[Biome::Forest, Biome::Plains, Biome::Water],
            Biome::Snowy => &[Biome::Forest, Biome::Plains],
        }
    }

    /// Age past which a cell of this biome stops converting neighbors
    pub const fn threshold_age(self) -> u32 {
        match self {
            Biome::Void => 0,
            Biome::Water => 500,
            Biome::Plains => 50,
            Biome::Desert => 35,
            Biome::Forest => 15,
            Biome::Swamp => 10,
            Biome::Snowy => 7,
            Biome::Mountain => 7,
        }
    }

    pub const fn base_color(self) -> Rgb {
        match self {
            Biome::Void => Rgb::new(0x0b, 0x0b, 0x0f),
            Biome::Water => Rgb::new(0x24, 0x70, 0xb8),
            Biome::Plains => Rgb::new(0x7b, 0xb5, 0x44),
            Biome::Desert => Rgb::new(0xe0, 0xc9, 0x7f),
            Biome::Forest => Rgb::new(0x2d, 0x6a, 0x36),
            Biome::Mountain => Rgb::new(0x8a, 0x8d, 0x90),
            Biome::Swamp => Rgb::new(0x5a, 0x6d, 0x3a),
            Biome::Snowy => Rgb::new(0xee, 0xf2, 0xf5),
        }
    }

    /// Whether the chance test reads the 3x3 same-biome density coefficient.
    /// Void never converts and water spreads unconditionally, so neither
    /// needs the count.
    pub const fn uses_density(self) -> bool {
        !matches!(self, Biome::Void | Biome::Water)
    }

    pub fn is_primary(self) -> bool {
        Self::PRIMARY.contains(&self)
    }

    pub fn is_secondary(self) -> bool {
        Self::SECONDARY.contains(&self)
    }

    /// Chance test for one conversion attempt, given a pre-drawn roll in
    /// `[0, 1)` and the source's density coefficient `coeff` (count of
    /// same-biome cells in the source's 3x3 neighborhood, itself included).
    ///
    /// The caller draws exactly one roll per attempt that passes the
    /// submissive/age precondition; Void and Water skip the draw (Void
    /// never converts, Water always succeeds).
    pub fn spread_roll_succeeds(self, target: Biome, coeff: u8, roll: f64) -> bool {
        let c = coeff as f64;
        match self {
            Biome::Void => false,
            Biome::Water => true,
            // Desert is a rare secondary edge for plains
            Biome::Plains if target == Biome::Desert => roll + c * c / 200.0 > 0.99,
            Biome::Plains => roll + c * c / 200.0 > 0.8,
            Biome::Desert => roll + c * c / 120.0 > 0.9,
            Biome::Forest => roll > 0.7 || coeff < 3,
            Biome::Swamp => roll > 0.9 || (1..3).contains(&coeff),
            Biome::Snowy => roll > 0.5 || (1..3).contains(&coeff),
            Biome::Mountain => (1..3).contains(&coeff) || roll > 0.7,
        }
    }

    /// Weighted cosmetic subtype table for this biome; empty for biomes
    /// with no visual variants
    pub fn subtype_table(self) -> &'static [(Subtype, f64)] {
        match self {
            Biome::Void | Biome::Water => &[],
            Biome::Plains => &[
                (Subtype::Meadow, 0.5),
                (Subtype::Prairie, 0.3),
                (Subtype::Steppe, 0.2),
            ],
            Biome::Desert => &[
                (Subtype::Dunes, 0.5),
                (Subtype::Flats, 0.3),
                (Subtype::Scrub, 0.2),
            ],
            Biome::Forest => &[
                (Subtype::Oak, 0.3),
                (Subtype::Mixed, 0.3),
                (Subtype::Birch, 0.2),
                (Subtype::Pine, 0.2),
            ],
            Biome::Mountain => &[
                (Subtype::Crag, 0.4),
                (Subtype::Ridge, 0.35),
                (Subtype::Plateau, 0.25),
            ],
            Biome::Swamp => &[(Subtype::Marsh, 0.6), (Subtype::Bog, 0.4)],
            Biome::Snowy => &[(Subtype::Powder, 0.6), (Subtype::Firn, 0.4)],
        }
    }

    /// Draw a cosmetic subtype from this biome's table.
    ///
    /// Consumes exactly one roll when the table is nonempty and none
    /// otherwise, so callers can rely on a fixed draw order.
    pub fn pick_subtype<R: Rng + ?Sized>(self, rng: &mut R) -> Option<Subtype> {
        let table = self.subtype_table();
        if table.is_empty() {
            return None;
        }
        let roll: f64 = rng.gen();
        let mut acc = 0.0;
        for &(subtype, weight) in table {
            acc += weight;
            if roll < acc {
                return Some(subtype);
            }
        }
        // float accumulation can leave the last bucket fractionally short
        table.last().map(|&(subtype, _)| subtype)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Biome::Void => write!(f, "void"),
            Biome::Water => write!(f, "water"),
            Biome::Plains => write!(f, "plains"),
            Biome::Desert => write!(f, "desert"),
            Biome::Forest => write!(f, "forest"),
            Biome::Mountain => write!(f, "mountain"),
            Biome::Swamp => write!(f, "swamp"),
            Biome::Snowy => write!(f, "snowy"),
        }
    }
}

/// Cosmetic variant of a biome; purely presentational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtype {
    // plains
    Meadow,
    Prairie,
    Steppe,
    // desert
    Dunes,
    Flats,
    Scrub,
    // forest
    Oak,
    Mixed,
    Birch,
    Pine,
    // mountain
    Crag,
    Ridge,
    Plateau,
    // swamp
    Marsh,
    Bog,
    // snowy
    Powder,
    Firn,
}

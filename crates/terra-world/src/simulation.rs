//! Simulation engine driving the biome spread automaton.

use crate::cell::CellView;
use crate::grid::Grid;
use crate::seed::{derive_rng_seed, generate_seed};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use terra_core::{Biome, Error, GridConfig, Phase, Result, RunConfig};
use tracing::{debug, info};

/// A biome spread simulation.
///
/// Constructed with [`Simulation::new`], then driven by an external loop
/// calling [`Simulation::advance`] until it reports termination. The whole
/// run is reproducible from `(rows, cols, seed)`: the one ChaCha generator
/// owned here is the only source of randomness, consumed in a fixed order.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    rng: ChaCha8Rng,
    seed: String,
    phase: Phase,
    ticks: u64,
}

impl Simulation {
    /// Build a grid of the given size, seed the RNG, and place the
    /// primary biome seeds
    pub fn new(config: GridConfig) -> Result<Self> {
        if config.rows == 0 || config.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: config.rows,
                cols: config.cols,
            });
        }
        let seed = config.seed.unwrap_or_else(generate_seed);
        let mut rng = ChaCha8Rng::seed_from_u64(derive_rng_seed(&seed));
        let mut grid = Grid::new(config.rows, config.cols);
        grid.place_primary_seeds(&mut rng)?;
        info!(rows = config.rows, cols = config.cols, seed = %seed, "grid seeded");
        Ok(Self {
            grid,
            rng,
            seed,
            phase: Phase::PrimaryGrowing,
            ticks: 0,
        })
    }

    /// Perform one tick and report whether the simulation has terminated.
    ///
    /// A tick that converts nothing settles the current growth phase:
    /// settling the primary phase immediately seeds the secondary biomes
    /// (an unseedable biome surfaces [`Error::SeedExhaustion`], after
    /// which the simulation must be discarded), and settling the
    /// secondary phase terminates the run. Calling this after
    /// termination is a no-op returning `Ok(true)`.
    pub fn advance(&mut self) -> Result<bool> {
        if self.phase.is_terminal() {
            return Ok(true);
        }
        self.ticks += 1;
        let conversions = self.tick_once();
        debug!(tick = self.ticks, conversions, phase = %self.phase, "tick complete");
        if conversions == 0 {
            match self.phase {
                Phase::PrimaryGrowing => {
                    self.phase = Phase::PrimarySettled;
                    info!(tick = self.ticks, "primary biomes settled");
                    self.grid.place_secondary_seeds(&mut self.rng)?;
                    self.phase = Phase::SecondarySeeded;
                    info!(tick = self.ticks, "secondary biomes seeded");
                    self.phase = Phase::SecondaryGrowing;
                }
                Phase::SecondaryGrowing => {
                    self.phase = Phase::Terminated;
                    info!(ticks = self.ticks, "simulation terminated");
                }
                _ => {}
            }
        }
        Ok(self.phase.is_terminal())
    }

    /// Advance until termination or until the tick budget runs out
    pub fn run(&mut self, config: &RunConfig) -> Result<RunReport> {
        let mut terminated = self.phase.is_terminal();
        while !terminated && self.ticks < config.max_ticks {
            terminated = self.advance()?;
        }
        Ok(RunReport {
            ticks: self.ticks,
            terminated,
            census: self.census(),
        })
    }

    /// Read-only snapshot of one cell for rendering
    pub fn cell_at(&self, row: u32, col: u32) -> Result<CellView> {
        self.grid
            .get(row, col)
            .map(CellView::from)
            .ok_or(Error::OutOfBounds {
                row,
                col,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.grid.rows(), self.grid.cols())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Ticks performed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Cell counts per biome
    pub fn census(&self) -> BTreeMap<Biome, usize> {
        let mut census = BTreeMap::new();
        for cell in self.grid.iter() {
            *census.entry(cell.biome).or_insert(0) += 1;
        }
        census
    }

    /// One row-major scan over the grid. Returns the number of conversions.
    fn tick_once(&mut self) -> usize {
        let mut conversions = 0;
        for idx in 0..self.grid.len() {
            if self.grid.cell(idx).changed {
                continue;
            }
            let (biome, age) = {
                let cell = self.grid.cell(idx);
                (cell.biome, cell.age)
            };
            // dormant and sink cells still age below, but convert nothing
            if !biome.submissive().is_empty() && age <= biome.threshold_age() {
                let coeff = if biome.uses_density() {
                    self.grid.density_coeff(idx)
                } else {
                    0
                };
                for target_idx in self.grid.neighbor_indices(idx) {
                    let target_biome = {
                        let target = self.grid.cell(target_idx);
                        if target.changed {
                            continue;
                        }
                        target.biome
                    };
                    if !biome.submissive().contains(&target_biome) {
                        continue;
                    }
                    let succeeds = biome == Biome::Water
                        || biome.spread_roll_succeeds(target_biome, coeff, self.rng.gen());
                    if succeeds {
                        self.convert(idx, target_idx);
                        conversions += 1;
                    }
                }
            }
            if self.grid.cell(idx).active {
                self.grid.cell_mut(idx).age += 1;
            }
        }
        self.grid.clear_changed();
        conversions
    }

    /// Apply one conversion: the target adopts the source's biome and the
    /// bookkeeping fields, plus the elevation nudge and cosmetic draws
    /// (both skipped for water sources)
    fn convert(&mut self, source_idx: usize, target_idx: usize) {
        let (biome, age) = {
            let source = self.grid.cell(source_idx);
            (source.biome, source.age)
        };
        let prior = self.grid.cell(target_idx).biome;
        {
            let target = self.grid.cell_mut(target_idx);
            target.biome = biome;
            target.age = age + 1;
            target.changed = true;
            target.active = true;
            target.prior = (biome == Biome::Snowy).then_some(prior);
        }
        if biome == Biome::Water {
            self.grid.cell_mut(target_idx).subtype = None;
        } else {
            let roll: f64 = self.rng.gen();
            let nudge = if roll < 0.2 {
                -1
            } else if roll < 0.4 {
                1
            } else {
                0
            };
            let subtype = biome.pick_subtype(&mut self.rng);
            let target = self.grid.cell_mut(target_idx);
            target.height += nudge;
            target.subtype = subtype;
        }
        self.grid.cell_mut(source_idx).active = true;
    }
}

/// Summary of a completed (or budget-capped) run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub terminated: bool,
    pub census: BTreeMap<Biome, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use proptest::prelude::*;
    use terra_core::color::BASE_HEIGHT;
    use terra_core::Position;

    const FIXED_SEED: &str = "test-seed-000001";

    fn simulation(rows: u32, cols: u32, seed: &str) -> Simulation {
        Simulation::new(GridConfig {
            rows,
            cols,
            seed: Some(seed.to_string()),
        })
        .unwrap()
    }

    /// A 1x3 strip seeded [water, void, void], bypassing normal setup
    fn strip_simulation() -> Simulation {
        let mut grid = Grid::new(1, 3);
        *grid.cell_mut(0) = Cell::seeded(Position::new(0, 0), Biome::Water, None);
        Simulation {
            grid,
            rng: ChaCha8Rng::seed_from_u64(1),
            seed: "strip".to_string(),
            phase: Phase::PrimaryGrowing,
            ticks: 0,
        }
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        for (rows, cols) in [(0, 10), (10, 0), (0, 0)] {
            let err = Simulation::new(GridConfig {
                rows,
                cols,
                seed: None,
            })
            .unwrap_err();
            assert_eq!(err, Error::InvalidDimensions { rows, cols });
        }
    }

    #[test]
    fn test_missing_seed_is_generated() {
        let sim = Simulation::new(GridConfig {
            rows: 10,
            cols: 10,
            seed: None,
        })
        .unwrap();
        assert_eq!(sim.seed().len(), crate::seed::SEED_LENGTH);
    }

    #[test]
    fn test_water_floods_a_1x3_strip() {
        let mut sim = strip_simulation();

        assert_eq!(sim.advance(), Ok(false));
        let middle = sim.cell_at(0, 1).unwrap();
        assert_eq!(middle.biome, Biome::Water);
        assert_eq!(middle.age, 1);
        assert_eq!(sim.cell_at(0, 2).unwrap().biome, Biome::Void);

        assert_eq!(sim.advance(), Ok(false));
        assert_eq!(sim.cell_at(0, 2).unwrap().biome, Biome::Water);
        assert_eq!(sim.cell_at(0, 2).unwrap().age, 2);
    }

    #[test]
    fn test_dormant_source_converts_nothing() {
        let mut sim = strip_simulation();
        sim.grid.cell_mut(0).age = Biome::Water.threshold_age() + 1;
        assert_eq!(sim.tick_once(), 0);
        assert_eq!(sim.cell_at(0, 1).unwrap().biome, Biome::Void);

        let mut sim = strip_simulation();
        assert_eq!(sim.tick_once(), 1);
    }

    #[test]
    fn test_cell_converts_at_most_once_per_tick() {
        // a void cell flanked by two water sources takes exactly one
        // conversion; the second source sees the changed flag and skips
        let mut grid = Grid::new(1, 3);
        *grid.cell_mut(0) = Cell::seeded(Position::new(0, 0), Biome::Water, None);
        *grid.cell_mut(2) = Cell::seeded(Position::new(0, 2), Biome::Water, None);
        let mut sim = Simulation {
            grid,
            rng: ChaCha8Rng::seed_from_u64(1),
            seed: "strip".to_string(),
            phase: Phase::PrimaryGrowing,
            ticks: 0,
        };
        assert_eq!(sim.tick_once(), 1);
        assert_eq!(sim.cell_at(0, 1).unwrap().biome, Biome::Water);
        assert_eq!(sim.cell_at(0, 1).unwrap().age, 1);
    }

    #[test]
    fn test_all_water_map_cannot_host_secondary_biomes() {
        let mut sim = strip_simulation();
        sim.advance().unwrap();
        sim.advance().unwrap();
        // the strip is now all water; the settling tick tries to seed a
        // forest and must give up instead of spinning
        let err = sim.advance().unwrap_err();
        assert!(matches!(
            err,
            Error::SeedExhaustion {
                biome: Biome::Forest,
                ..
            }
        ));
    }

    #[test]
    fn test_primary_seed_placement_is_reproducible() {
        let a = simulation(10, 10, FIXED_SEED);
        let b = simulation(10, 10, FIXED_SEED);
        let seeds_of = |sim: &Simulation| {
            let mut seeds = Vec::new();
            for row in 0..10 {
                for col in 0..10 {
                    let view = sim.cell_at(row, col).unwrap();
                    if view.biome != Biome::Void {
                        seeds.push((row, col, view.biome));
                    }
                }
            }
            seeds
        };
        let placed = seeds_of(&a);
        assert_eq!(placed.len(), 3);
        assert_eq!(placed, seeds_of(&b));
    }

    #[test]
    fn test_full_run_is_deterministic() {
        let mut a = simulation(12, 12, FIXED_SEED);
        let mut b = simulation(12, 12, FIXED_SEED);
        let report_a = a.run(&RunConfig::default()).unwrap();
        let report_b = b.run(&RunConfig::default()).unwrap();

        assert!(report_a.terminated);
        assert_eq!(report_a.ticks, report_b.ticks);
        assert_eq!(report_a.census, report_b.census);
        for row in 0..12 {
            for col in 0..12 {
                assert_eq!(a.cell_at(row, col).unwrap(), b.cell_at(row, col).unwrap());
            }
        }
    }

    #[test]
    fn test_run_terminates_within_bound() {
        let mut sim = simulation(15, 15, FIXED_SEED);
        let report = sim
            .run(&RunConfig { max_ticks: 5_000 })
            .unwrap();
        assert!(report.terminated);
        assert_eq!(sim.phase(), Phase::Terminated);

        // advancing a terminated simulation is a no-op
        let ticks = sim.ticks();
        assert_eq!(sim.advance(), Ok(true));
        assert_eq!(sim.ticks(), ticks);
    }

    #[test]
    fn test_all_secondary_biomes_present_after_seeding() {
        let mut sim = simulation(25, 25, FIXED_SEED);
        while sim.phase() == Phase::PrimaryGrowing {
            sim.advance().unwrap();
            assert!(sim.ticks() < 5_000, "primary phase failed to settle");
        }
        assert_eq!(sim.phase(), Phase::SecondaryGrowing);
        let census = sim.census();
        for biome in Biome::SECONDARY {
            assert!(census.get(&biome).copied().unwrap_or(0) >= 1, "missing {biome}");
        }
    }

    #[test]
    fn test_conversions_respect_submissive_adjacency() {
        let mut sim = simulation(12, 12, FIXED_SEED);
        loop {
            let before: Vec<Biome> = sim.grid.iter().map(|c| c.biome).collect();
            let phase_before = sim.phase();
            let done = sim.advance().unwrap();
            if phase_before == Phase::PrimaryGrowing && sim.phase() != Phase::PrimaryGrowing {
                // this tick converted nothing; all changes are seed placements
                continue;
            }
            for idx in 0..sim.grid.len() {
                let after = sim.grid.cell(idx).biome;
                if after == before[idx] {
                    continue;
                }
                // the old biome must be one the new biome may convert
                assert!(
                    after.submissive().contains(&before[idx]),
                    "{} became {} illegally",
                    before[idx],
                    after
                );
                // and a neighboring source of the new biome must have existed
                assert!(
                    sim.grid
                        .neighbor_indices(idx)
                        .into_iter()
                        .any(|n| before[n] == after),
                    "no adjacent {after} source"
                );
            }
            if done {
                break;
            }
            assert!(sim.ticks() < 5_000, "run failed to terminate");
        }
    }

    #[test]
    fn test_water_cells_keep_base_height() {
        let mut sim = simulation(15, 15, FIXED_SEED);
        sim.run(&RunConfig::default()).unwrap();
        let (rows, cols) = sim.dimensions();
        for row in 0..rows {
            for col in 0..cols {
                let view = sim.cell_at(row, col).unwrap();
                if view.biome == Biome::Water {
                    assert_eq!(view.height, BASE_HEIGHT);
                    assert_eq!(view.color, Biome::Water.base_color());
                }
            }
        }
    }

    #[test]
    fn test_snowy_remembers_a_convertible_prior() {
        let mut sim = simulation(20, 20, FIXED_SEED);
        sim.run(&RunConfig::default()).unwrap();
        for cell in sim.grid.iter() {
            if let Some(prior) = cell.prior {
                assert_eq!(cell.biome, Biome::Snowy);
                assert!(Biome::Snowy.submissive().contains(&prior));
            }
        }
    }

    #[test]
    fn test_census_accounts_for_every_cell() {
        let mut sim = simulation(14, 9, FIXED_SEED);
        assert_eq!(sim.census().values().sum::<usize>(), 14 * 9);
        sim.run(&RunConfig::default()).unwrap();
        assert_eq!(sim.census().values().sum::<usize>(), 14 * 9);
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let sim = simulation(10, 10, FIXED_SEED);
        let err = sim.cell_at(10, 0).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfBounds {
                row: 10,
                col: 0,
                rows: 10,
                cols: 10,
            }
        );
    }

    #[test]
    fn test_run_report_serializes() {
        let mut sim = simulation(10, 10, FIXED_SEED);
        let report = sim.run(&RunConfig::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"ticks\""));
        assert!(json.contains("\"census\""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        // determinism holds for arbitrary seed strings, not just fixtures
        #[test]
        fn prop_same_seed_same_outcome(seed in "[0-9a-zA-Z]{8}") {
            let mut a = simulation(10, 10, &seed);
            let mut b = simulation(10, 10, &seed);
            let report_a = a.run(&RunConfig::default()).unwrap();
            let report_b = b.run(&RunConfig::default()).unwrap();
            prop_assert_eq!(report_a.ticks, report_b.ticks);
            prop_assert_eq!(report_a.census, report_b.census);
        }
    }
}

//! Command-line driver for the biome spread engine.
//!
//! Paces the simulation at a configurable tick delay, then dumps the
//! settled map as ASCII and the biome census to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::thread;
use std::time::Duration;
use terra_core::{Biome, GridConfig};
use terra_world::Simulation;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "terra-gen", about = "Generate a biome map by cellular spread")]
struct Args {
    /// Grid rows
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(10..=100))]
    rows: u32,

    /// Grid columns
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(10..=100))]
    cols: u32,

    /// Seed string; a fresh one is generated when omitted
    #[arg(long)]
    seed: Option<String>,

    /// Delay between ticks in milliseconds
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(50..=1000))]
    delay_ms: u64,

    /// Skip the ASCII map dump
    #[arg(long)]
    no_map: bool,

    /// Print the final census as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut sim = Simulation::new(GridConfig {
        rows: args.rows,
        cols: args.cols,
        seed: args.seed,
    })?;
    info!(
        seed = sim.seed(),
        rows = args.rows,
        cols = args.cols,
        delay_ms = args.delay_ms,
        "starting map generation"
    );

    let delay = Duration::from_millis(args.delay_ms);
    loop {
        match sim.advance() {
            Ok(true) => break,
            Ok(false) => thread::sleep(delay),
            Err(e) => {
                error!("generation failed: {e}");
                return Err(e.into());
            }
        }
    }
    info!(ticks = sim.ticks(), "map settled");

    if !args.no_map {
        print_map(&sim)?;
    }
    print_census(&sim, args.json)?;

    Ok(())
}

fn print_map(sim: &Simulation) -> Result<()> {
    let (rows, cols) = sim.dimensions();
    for row in 0..rows {
        let mut line = String::with_capacity(cols as usize);
        for col in 0..cols {
            line.push(glyph(sim.cell_at(row, col)?.biome));
        }
        println!("{line}");
    }
    Ok(())
}

fn print_census(sim: &Simulation, json: bool) -> Result<()> {
    let census = sim.census();
    if json {
        let rendered =
            serde_json::to_string_pretty(&census).context("serializing census")?;
        println!("{rendered}");
    } else {
        for (biome, count) in &census {
            println!("{biome:>8}: {count}");
        }
    }
    Ok(())
}

fn glyph(biome: Biome) -> char {
    match biome {
        Biome::Void => ' ',
        Biome::Water => '~',
        Biome::Plains => '"',
        Biome::Desert => '.',
        Biome::Forest => 'T',
        Biome::Mountain => '^',
        Biome::Swamp => '%',
        Biome::Snowy => '*',
    }
}

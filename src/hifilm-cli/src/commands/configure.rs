//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up hifilm defaults.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{parse_offsets, Config};

pub fn handle(
    weapons: Option<PathBuf>,
    timestamp_offsets: Option<String>,
    tolerance_ms: Option<u64>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    let mut changed = false;

    if let Some(path) = weapons {
        config.weapon_table = Some(path);
        changed = true;
    }
    if let Some(list) = timestamp_offsets {
        config.timestamp_offsets = Some(parse_offsets(&list)?);
        changed = true;
    }
    if let Some(ms) = tolerance_ms {
        config.pair_tolerance_ms = Some(ms);
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved");
        if let Ok(path) = Config::config_path() {
            println!("Config file: {}", path.display());
        }
    } else {
        show_usage();
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.weapon_table {
        Some(path) => println!("Weapon table: {}", path.display()),
        None => println!("Weapon table: built-in"),
    }

    match &config.timestamp_offsets {
        Some(offsets) => println!("Timestamp offsets: {:?}", offsets),
        None => println!("Timestamp offsets: default [5]"),
    }

    match config.pair_tolerance_ms {
        Some(ms) => println!("Pair tolerance: {} ms", ms),
        None => println!(
            "Pair tolerance: default {} ms",
            hifilm::DEFAULT_PAIR_TOLERANCE_MS
        ),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: hifilm configure --weapons PATH");
    println!("   or: hifilm configure --timestamp-offsets 3,5,8");
    println!("   or: hifilm configure --tolerance-ms 250");
    println!("   or: hifilm configure --show");
    println!();
    println!("Saved values become the defaults for decode, batch, correlate");
    println!("and stats. Command line flags still override them.");
}

mod cli;
mod commands;
mod config;
mod file_utils;

use anyhow::Result;
use clap::Parser;

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            manifest,
            weapons,
            json,
        } => {
            commands::decode::handle(&input, manifest.as_deref(), weapons.as_deref(), json)?;
        }

        Commands::Batch {
            dir,
            manifest,
            weapons,
            json,
            jobs,
        } => {
            commands::batch::handle(&dir, manifest.as_deref(), weapons.as_deref(), json, jobs)?;
        }

        Commands::Correlate {
            dir,
            match_id,
            manifest,
            weapons,
            tolerance_ms,
            json,
        } => {
            commands::correlate::handle(
                &dir,
                &match_id,
                manifest.as_deref(),
                weapons.as_deref(),
                tolerance_ms,
                json,
            )?;
        }

        Commands::Inspect {
            input,
            context,
            shift,
            all_types,
        } => {
            commands::inspect::handle(&input, context, shift, all_types)?;
        }

        Commands::Stats { dir, manifest } => {
            commands::stats::handle(&dir, manifest.as_deref())?;
        }

        Commands::Configure {
            weapons,
            timestamp_offsets,
            tolerance_ms,
            show,
        } => {
            commands::configure::handle(weapons, timestamp_offsets, tolerance_ms, show)?;
        }
    }

    Ok(())
}

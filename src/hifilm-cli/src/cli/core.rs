//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hifilm")]
#[command(about = "Halo Infinite theater film chunk decoder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode one film chunk and print the events it yields
    #[command(visible_alias = "d")]
    Decode {
        /// Path to a film chunk file (zlib or raw)
        input: PathBuf,

        /// Match manifest with chunk time bounds (chunks.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Weapon id table to layer over the built-in one
        #[arg(short, long)]
        weapons: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode every chunk in a directory in parallel
    #[command(visible_alias = "b")]
    Batch {
        /// Directory of film chunk files
        dir: PathBuf,

        /// Match manifest with chunk time bounds (chunks.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Weapon id table to layer over the built-in one
        #[arg(short, long)]
        weapons: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Number of worker threads (defaults to all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Decode a directory and pair kills with deaths
    #[command(visible_alias = "r")]
    Correlate {
        /// Directory of film chunk files from one match
        dir: PathBuf,

        /// Match id stamped into each output record
        #[arg(long)]
        match_id: String,

        /// Match manifest with chunk time bounds (chunks.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Weapon id table to layer over the built-in one
        #[arg(short, long)]
        weapons: Option<PathBuf>,

        /// Kill/death pairing tolerance in milliseconds
        #[arg(long)]
        tolerance_ms: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hex dump the bytes around every raw marker hit
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to a film chunk file
        input: PathBuf,

        /// Bytes of context either side of each marker
        #[arg(short, long, default_value = "32")]
        context: usize,

        /// Only show hits from this bit phase (0-7)
        #[arg(long)]
        shift: Option<u8>,

        /// Show every 00 XX 00 hit, not just the classified type bytes
        #[arg(long)]
        all_types: bool,
    },

    /// Aggregate decode statistics for a directory
    #[command(visible_alias = "s")]
    Stats {
        /// Directory of film chunk files
        dir: PathBuf,

        /// Match manifest with chunk time bounds (chunks.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default weapon table path
        #[arg(long)]
        weapons: Option<PathBuf>,

        /// Set timestamp field offsets, comma separated (e.g. "5" or "3,5,8")
        #[arg(long)]
        timestamp_offsets: Option<String>,

        /// Set kill/death pairing tolerance in milliseconds
        #[arg(long)]
        tolerance_ms: Option<u64>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

//! Parallel directory decode command

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

use hifilm::{decode_chunk, DecodeStats};

use super::decode::{load_chunk, load_manifest};
use crate::config::Config;
use crate::file_utils::collect_chunk_files;

#[derive(Serialize)]
struct ChunkRow {
    file: String,
    stats: DecodeStats,
}

#[derive(Debug, Default, Serialize)]
struct BatchTotals {
    chunks: usize,
    decoded: usize,
    failed: usize,
    compressed: usize,
    raw_markers: usize,
    roster_collisions: usize,
    dropped_timestamps: usize,
    raw_candidates: usize,
    events: usize,
    gamertags: usize,
    rosters: usize,
    unresolved_actors: usize,
}

impl BatchTotals {
    fn add(&mut self, stats: &DecodeStats) {
        self.decoded += 1;
        self.compressed += usize::from(stats.compressed);
        self.raw_markers += stats.raw_markers;
        self.roster_collisions += stats.roster_collisions;
        self.dropped_timestamps += stats.dropped_timestamps;
        self.raw_candidates += stats.raw_candidates;
        self.events += stats.events;
        self.gamertags += stats.gamertags;
        self.rosters += stats.rosters;
        self.unresolved_actors += stats.unresolved_actors;
    }
}

#[derive(Serialize)]
struct BatchReport {
    chunks: Vec<ChunkRow>,
    totals: BatchTotals,
}

pub fn handle(
    dir: &Path,
    manifest: Option<&Path>,
    weapons: Option<&Path>,
    json: bool,
    jobs: Option<usize>,
) -> Result<()> {
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to configure worker pool")?;
    }

    let config = Config::load()?.decode_config(weapons)?;
    let manifest = load_manifest(manifest)?;

    let files = collect_chunk_files(dir)?;
    if files.is_empty() {
        bail!("No chunk files found under {}", dir.display());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let result = load_chunk(path, manifest.as_ref())
                .map(|chunk| decode_chunk(&chunk, &config).stats);
            pb.inc(1);
            if let Err(ref e) = result {
                eprintln!("Error {}: {:?}", path.display(), e);
            }
            (path, result)
        })
        .collect();

    pb.finish_with_message("Done");

    let mut totals = BatchTotals {
        chunks: results.len(),
        ..BatchTotals::default()
    };
    let mut rows = Vec::new();

    for (path, result) in results {
        match result {
            Ok(stats) => {
                totals.add(&stats);
                rows.push(ChunkRow {
                    file: path.display().to_string(),
                    stats,
                });
            }
            Err(_) => totals.failed += 1,
        }
    }

    if json {
        let report = BatchReport { chunks: rows, totals };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_totals(&totals);
    }

    Ok(())
}

fn print_totals(totals: &BatchTotals) {
    println!("\n=== Batch Results ===");
    println!(
        "Chunks: {} ({} decoded, {} failed)",
        totals.chunks, totals.decoded, totals.failed
    );
    println!("Compressed: {}", totals.compressed);
    println!("Marker hits: {}", totals.raw_markers);
    println!("  roster collisions: {}", totals.roster_collisions);
    println!("  implausible timestamps: {}", totals.dropped_timestamps);
    println!(
        "Candidates: {} -> {} events after dedupe",
        totals.raw_candidates, totals.events
    );
    println!("Gamertags: {}", totals.gamertags);
    println!("Rosters: {}", totals.rosters);
    println!("Unresolved actors: {}", totals.unresolved_actors);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_accumulate() {
        let mut totals = BatchTotals::default();

        let stats = DecodeStats {
            compressed: true,
            raw_markers: 10,
            roster_collisions: 1,
            dropped_timestamps: 3,
            raw_candidates: 4,
            events: 2,
            gamertags: 5,
            rosters: 2,
            unresolved_actors: 1,
            ..DecodeStats::default()
        };

        totals.add(&stats);
        totals.add(&DecodeStats::default());

        assert_eq!(totals.decoded, 2);
        assert_eq!(totals.compressed, 1);
        assert_eq!(totals.raw_markers, 10);
        assert_eq!(totals.events, 2);
        assert_eq!(totals.gamertags, 5);
    }
}

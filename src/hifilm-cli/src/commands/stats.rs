//! Aggregate statistics command

use anyhow::{bail, Result};
use std::path::Path;

use hifilm::{decode_chunk, EventKind};

use super::decode::{load_chunk, load_manifest};
use crate::config::Config;
use crate::file_utils::collect_chunk_files;

#[allow(clippy::too_many_lines)]
pub fn handle(dir: &Path, manifest: Option<&Path>) -> Result<()> {
    let config = Config::load()?.decode_config(None)?;
    let manifest = load_manifest(manifest)?;

    let files = collect_chunk_files(dir)?;
    if files.is_empty() {
        bail!("No chunk files found under {}", dir.display());
    }

    let mut decoded = 0;
    let mut failed = 0;
    let mut compressed = 0;
    let mut raw_markers = 0;
    let mut roster_collisions = 0;
    let mut dropped_timestamps = 0;
    let mut raw_candidates = 0;
    let mut gamertags = 0;
    let mut rosters = 0;
    let mut unresolved = 0;

    let mut kills = 0;
    let mut deaths = 0;
    let mut assists = 0;
    let mut per_chunk: Vec<(String, usize)> = Vec::new();

    for path in &files {
        let chunk = match load_chunk(path, manifest.as_ref()) {
            Ok(chunk) => chunk,
            Err(e) => {
                failed += 1;
                eprintln!("Error {}: {:?}", path.display(), e);
                continue;
            }
        };

        let result = decode_chunk(&chunk, &config);
        decoded += 1;
        compressed += usize::from(result.stats.compressed);
        raw_markers += result.stats.raw_markers;
        roster_collisions += result.stats.roster_collisions;
        dropped_timestamps += result.stats.dropped_timestamps;
        raw_candidates += result.stats.raw_candidates;
        gamertags += result.stats.gamertags;
        rosters += result.stats.rosters;
        unresolved += result.stats.unresolved_actors;

        for event in &result.events {
            match event.kind {
                EventKind::Kill => kills += 1,
                EventKind::Death => deaths += 1,
                EventKind::Assist => assists += 1,
                // The pipeline scans the type byte table only
                EventKind::Unknown => {}
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        per_chunk.push((name, result.events.len()));
    }

    let events = kills + deaths + assists;

    println!("=== Film Chunk Statistics ===");
    println!("Chunks: {} ({} decoded, {} failed)", files.len(), decoded, failed);
    if decoded > 0 {
        println!(
            "Compressed: {} ({:.1}%)",
            compressed,
            (compressed as f64 / decoded as f64) * 100.0
        );
    }
    println!("Marker hits: {}", raw_markers);
    println!("  roster collisions: {}", roster_collisions);
    println!("  implausible timestamps: {}", dropped_timestamps);
    println!("Candidates: {} -> {} events after dedupe", raw_candidates, events);
    println!("  kills: {}, deaths: {}, assists: {}", kills, deaths, assists);
    println!("Gamertags: {}", gamertags);
    println!("Rosters: {}", rosters);
    println!("Unresolved actors: {}", unresolved);

    per_chunk.sort_by(|a, b| b.1.cmp(&a.1));
    let busy: Vec<_> = per_chunk.iter().filter(|(_, n)| *n > 0).collect();
    if !busy.is_empty() {
        println!("\n=== Top Chunks by Events ===");
        for (name, count) in busy.iter().take(10) {
            println!("  {:<40} {}", name, count);
        }
    }

    Ok(())
}

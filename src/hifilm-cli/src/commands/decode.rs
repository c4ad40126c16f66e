//! Single chunk decode command

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use hifilm::{
    decode_chunk, DecodeResult, DecodeStats, EventCandidate, GamertagOccurrence, MatchManifest,
    RawChunk, RosterRecord, WeaponTable,
};

use crate::config::Config;
use crate::file_utils::chunk_index_from_path;

#[derive(Serialize)]
struct ChunkReport<'a> {
    file: String,
    events: &'a [EventCandidate],
    gamertags: Vec<&'a GamertagOccurrence>,
    rosters: &'a [RosterRecord],
    stats: DecodeStats,
}

pub fn handle(
    input: &Path,
    manifest: Option<&Path>,
    weapons: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = Config::load()?.decode_config(weapons)?;
    let manifest = load_manifest(manifest)?;

    let chunk = load_chunk(input, manifest.as_ref())?;
    let result = decode_chunk(&chunk, &config);

    if json {
        let report = ChunkReport {
            file: input.display().to_string(),
            events: &result.events,
            gamertags: result.gamertags.iter().filter(|t| t.valid).collect(),
            rosters: &result.rosters,
            stats: result.stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(input, &chunk, &result, &config.weapon_table);
    }

    Ok(())
}

/// Load the manifest if a path was given.
pub(crate) fn load_manifest(path: Option<&Path>) -> Result<Option<MatchManifest>> {
    match path {
        Some(p) => {
            let manifest = MatchManifest::load(p)
                .with_context(|| format!("Failed to read manifest {}", p.display()))?;
            Ok(Some(manifest))
        }
        None => Ok(None),
    }
}

/// Read a chunk file, taking the chunk index from the file name and the
/// time bounds from the manifest when one is available.
pub(crate) fn load_chunk(path: &Path, manifest: Option<&MatchManifest>) -> Result<RawChunk> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read chunk {}", path.display()))?;
    let index = chunk_index_from_path(path);

    let chunk = match manifest.and_then(|m| m.meta_for(index)) {
        Some(meta) => RawChunk::with_meta(data, meta),
        None => RawChunk::load(data, index),
    };

    Ok(chunk)
}

fn print_report(input: &Path, chunk: &RawChunk, result: &DecodeResult, table: &WeaponTable) {
    println!("File: {}", input.display());
    println!(
        "Chunk {}: {} bytes ({})",
        chunk.index(),
        chunk.len(),
        if chunk.compressed() { "zlib" } else { "raw" }
    );
    if let Some((start, end)) = chunk.bounds_ms() {
        println!("Covers: {} ms - {} ms", start, end);
    }

    println!("\nEvents ({}):", result.events.len());
    for event in &result.events {
        println!(
            "  {:<7} {:>9} ms  shift {}  conf {:.2}  {:<16} {}",
            event.kind.name(),
            event.timestamp_ms,
            event.shift,
            event.confidence,
            event.actor.as_deref().unwrap_or("-"),
            weapon_label(event.weapon_id, table),
        );
    }

    let tags: Vec<_> = result.gamertags.iter().filter(|t| t.valid).collect();
    if !tags.is_empty() {
        println!("\nGamertags ({}):", tags.len());
        for tag in tags {
            println!(
                "  {:<18} offset {:>8}  shift {}  {:?}",
                tag.text, tag.offset, tag.shift, tag.order
            );
        }
    }

    if !result.rosters.is_empty() {
        println!("\nRoster records ({}):", result.rosters.len());
        for roster in &result.rosters {
            println!(
                "  xuid {:016x}  offset {:>8}  shift {}{}",
                roster.xuid,
                roster.offset,
                roster.shift,
                if roster.looks_retail() { "" } else { "  (suspect)" },
            );
        }
    }

    let stats = &result.stats;
    println!("\nMarker hits: {}", stats.raw_markers);
    println!("  roster collisions: {}", stats.roster_collisions);
    println!("  implausible timestamps: {}", stats.dropped_timestamps);
    println!(
        "Candidates: {} -> {} events after dedupe",
        stats.raw_candidates, stats.events
    );
    if stats.unresolved_actors > 0 {
        println!("Unresolved actors: {}", stats.unresolved_actors);
    }
}

fn weapon_label(id: Option<u16>, table: &WeaponTable) -> String {
    match id {
        Some(id) => match table.name(id) {
            Some(name) => format!("0x{id:04X} {name}"),
            None => format!("0x{id:04X}"),
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_chunk_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filmChunk7");
        std::fs::write(&path, [0xAAu8; 64]).unwrap();

        let chunk = load_chunk(&path, None).unwrap();
        assert_eq!(chunk.index(), 7);
        assert!(!chunk.compressed());
        assert_eq!(chunk.len(), 64);
        assert!(chunk.bounds_ms().is_none());
    }

    #[test]
    fn test_load_chunk_with_manifest_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filmChunk2");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let manifest = MatchManifest::from_json(
            r#"{
                "match_id": "m1",
                "chunks": [
                    {"index": 2, "start_offset_ms": 120000, "duration_ms": 60000}
                ]
            }"#,
        )
        .unwrap();

        let chunk = load_chunk(&path, Some(&manifest)).unwrap();
        assert_eq!(chunk.index(), 2);
        assert_eq!(chunk.bounds_ms(), Some((120_000, 180_000)));
    }

    #[test]
    fn test_load_chunk_missing_file() {
        let result = load_chunk(Path::new("/nonexistent/filmChunk0"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_weapon_label() {
        let table = WeaponTable::builtin();
        assert_eq!(weapon_label(None, &table), "");
        assert_eq!(weapon_label(Some(0xE02E), &table), "0xE02E MA40 Assault Rifle");
        assert_eq!(weapon_label(Some(0x4444), &table), "0x4444");
    }
}

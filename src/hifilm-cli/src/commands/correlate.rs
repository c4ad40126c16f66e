//! Kill/death correlation command

use anyhow::{bail, Result};
use std::path::Path;

use hifilm::{correlate, decode_chunk, CorrelatedKillRecord, WeaponTable};

use super::decode::{load_chunk, load_manifest};
use crate::config::Config;
use crate::file_utils::collect_chunk_files;

pub fn handle(
    dir: &Path,
    match_id: &str,
    manifest: Option<&Path>,
    weapons: Option<&Path>,
    tolerance_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = Config::load()?.decode_config(weapons)?;
    let tolerance = tolerance_ms.unwrap_or(config.pair_tolerance_ms);
    let manifest = load_manifest(manifest)?;

    let files = collect_chunk_files(dir)?;
    if files.is_empty() {
        bail!("No chunk files found under {}", dir.display());
    }

    let mut events = Vec::new();
    let mut failed = 0;

    for path in &files {
        match load_chunk(path, manifest.as_ref()) {
            Ok(chunk) => events.extend(decode_chunk(&chunk, &config).events),
            Err(e) => {
                failed += 1;
                eprintln!("Error {}: {:?}", path.display(), e);
            }
        }
    }

    let records = correlate(&events, match_id, tolerance);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_records(&records, &config.weapon_table);
        println!(
            "\n{} records from {} events across {} chunks ({} failed)",
            records.len(),
            events.len(),
            files.len() - failed,
            failed
        );
    }

    Ok(())
}

fn print_records(records: &[CorrelatedKillRecord], table: &WeaponTable) {
    println!("=== Correlated Records ({}) ===", records.len());
    for record in records {
        let weapon = match record.weapon_id {
            Some(id) => match table.name(id) {
                Some(name) => format!("  0x{id:04X} {name}"),
                None => format!("  0x{id:04X}"),
            },
            None => String::new(),
        };

        println!(
            "  {:>9} ms  {:<16} -> {:<16}  conf {:.2}{}",
            record.timestamp_ms,
            record.killer.as_deref().unwrap_or("?"),
            record.victim.as_deref().unwrap_or("?"),
            record.confidence,
            weapon,
        );
    }
}

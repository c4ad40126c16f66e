//! Marker context inspection command
//!
//! Dumps the raw bytes around every marker pattern hit, one section per
//! bit phase, for eyeballing timestamp fields and weapon id windows.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use hifilm::{all_shifts, scan_any_markers, scan_markers, RawChunk};

use crate::file_utils::chunk_index_from_path;

pub fn handle(
    input: &Path,
    context: usize,
    shift_filter: Option<u8>,
    all_types: bool,
) -> Result<()> {
    let data = fs::read(input)
        .with_context(|| format!("Failed to read chunk {}", input.display()))?;
    let chunk = RawChunk::load(data, chunk_index_from_path(input));

    println!("File: {}", input.display());
    println!(
        "Payload: {} bytes ({})",
        chunk.len(),
        if chunk.compressed() { "zlib" } else { "raw" }
    );

    let mut total = 0;
    for view in all_shifts(chunk.data()) {
        if let Some(only) = shift_filter {
            if view.shift() != only {
                continue;
            }
        }

        let bytes = view.as_bytes();
        let markers = if all_types {
            scan_any_markers(bytes)
        } else {
            scan_markers(bytes)
        };
        if markers.is_empty() {
            continue;
        }

        println!("\n=== Shift {} ({} hits) ===", view.shift(), markers.len());
        for marker in markers {
            total += 1;
            println!(
                "\n{} marker at offset {} [{}]",
                marker.kind,
                marker.offset,
                hex::encode(&bytes[marker.offset..marker.offset + 3]),
            );

            let start = marker.offset.saturating_sub(context);
            let end = (marker.offset + 3 + context).min(bytes.len());
            print_hex_at(&bytes[start..end], start);
        }
    }

    println!("\nTotal marker hits: {}", total);
    Ok(())
}

fn print_hex_at(data: &[u8], base: usize) {
    for (i, chunk) in data.chunks(16).enumerate() {
        print!("{:08x}  ", base + i * 16);
        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                print!(" ");
            }
            print!("{:02x} ", byte);
        }
        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                print!(" ");
            }
            print!("   ");
        }
        print!(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                print!("{}", *byte as char);
            } else {
                print!(".");
            }
        }
        println!("|");
    }
}

use hifilm::{all_shifts, scan_markers, RawChunk};
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-filmChunk>", args[0]);
        std::process::exit(1);
    }

    let bytes = fs::read(&args[1]).expect("Failed to read chunk");
    let chunk = RawChunk::load(bytes, 0);
    println!(
        "{} bytes ({})",
        chunk.len(),
        if chunk.compressed() { "zlib" } else { "raw" }
    );

    // If the encoder had one global alignment, one shift should carry
    // most of the marker hits. So far the hits spread out, which is
    // why decode still scans all 8.
    println!("\n{:<8} {:>8}", "Shift", "Markers");
    let mut counts = Vec::new();
    for view in all_shifts(chunk.data()) {
        let hits = scan_markers(view.as_bytes()).len();
        println!("{:<8} {:>8}", view.shift(), hits);
        counts.push((view.shift(), hits));
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total > 0 {
        let (best_shift, best) = counts[0];
        println!(
            "\nDensest shift: {} with {}/{} hits ({:.0}%)",
            best_shift,
            best,
            total,
            best as f64 / total as f64 * 100.0
        );
    } else {
        println!("\nNo marker hits at any shift");
    }
}

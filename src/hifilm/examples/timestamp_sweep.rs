use hifilm::{
    all_shifts, plausible_timestamp, scan_markers, timestamp_hypotheses, RawChunk,
};
use std::env;
use std::fs;

// Which field offset holds the timestamp? The archive scripts disagreed
// (+3, +5 and +8 all appear), so sweep the whole admissible band and
// count plausible decodes per offset. Run against a chunk with known
// kill times and the right offset stands out.
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-filmChunk> [known-ts-seconds...]", args[0]);
        std::process::exit(1);
    }

    let known_ms: Vec<u64> = args[2..]
        .iter()
        .map(|s| {
            let secs: f64 = s.parse().expect("bad known timestamp");
            (secs * 1000.0) as u64
        })
        .collect();

    let bytes = fs::read(&args[1]).expect("Failed to read chunk");
    let chunk = RawChunk::load(bytes, 0);

    let offsets: Vec<usize> = (3..=12).collect();
    let mut plausible_per_offset = vec![0usize; offsets.len()];
    let mut ground_truth_hits = vec![0usize; offsets.len()];
    let mut markers = 0;

    for view in all_shifts(chunk.data()) {
        let data = view.as_bytes();
        for marker in scan_markers(data) {
            markers += 1;
            for hyp in timestamp_hypotheses(data, marker.offset, &offsets) {
                let i = hyp.field_offset - 3;
                if plausible_timestamp(hyp.timestamp_ms, None) {
                    plausible_per_offset[i] += 1;
                }
                if known_ms.iter().any(|&k| hyp.timestamp_ms.abs_diff(k) <= 500) {
                    ground_truth_hits[i] += 1;
                }
            }
        }
    }

    println!("{} marker hits across 8 shifts", markers);
    println!("\n{:<8} {:>10} {:>14}", "Offset", "Plausible", "Ground truth");
    for (i, &offset) in offsets.iter().enumerate() {
        println!(
            "+{:<7} {:>10} {:>14}",
            offset, plausible_per_offset[i], ground_truth_hits[i]
        );
    }

    if known_ms.is_empty() {
        println!("\nPass known kill times (seconds) to rank offsets against ground truth");
    }
}

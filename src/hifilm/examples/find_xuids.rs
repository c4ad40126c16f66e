use hifilm::{all_shifts, locate_gamertags, scan_rosters, RawChunk};
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

    for view in all_shifts(chunk.data()) {
        let data = view.as_bytes();
        let rosters = scan_rosters(data, view.shift());
        if rosters.is_empty() {
            continue;
        }

        let tags = locate_gamertags(data, view.shift());
        println!("=== Shift {} ===", view.shift());
        for roster in rosters {
            // Roster records put the gamertag close behind the XUID;
            // print whatever run sits nearest within 64 bytes
            let nearest = tags
                .iter()
                .filter(|t| t.valid && t.offset > roster.offset)
                .filter(|t| t.offset - roster.offset < 64)
                .min_by_key(|t| t.offset - roster.offset);

            println!(
                "  xuid {:016x} at {}{}{}",
                roster.xuid,
                roster.offset,
                if roster.looks_retail() { "" } else { " (suspect)" },
                match nearest {
                    Some(tag) => format!("  -> {} (+{})", tag.text, tag.offset - roster.offset),
                    None => String::new(),
                }
            );
        }
    }
}

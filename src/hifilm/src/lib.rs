//! Halo Infinite theater film chunk decoder
//!
//! Film chunks are the replay segments the game downloads for theater
//! playback. They carry gameplay events (kills, deaths, assists) in an
//! undocumented binary layout that is not byte-aligned, so decoding is
//! heuristic: scan, score, and keep what survives.
//!
//! # Format Overview
//!
//! ## Chunk payload
//!
//! Each chunk file is either a raw payload or a zlib stream (0x78 first
//! byte). Decompression is attempted first; on failure the bytes are
//! treated as an uncompressed payload.
//!
//! ## Event records
//!
//! Event markers are 3-byte sequences `00 TYPE 00` where TYPE is 0x32
//! (kill), 0x14 (death) or 0x64 (assist). Records are written to a bit
//! stream, so a marker may sit at any of 8 bit phases; every chunk is
//! scanned under all 8 left-rotations of the payload.
//!
//! A 2-byte little-endian timestamp in hundredths of a second follows
//! each kill/death marker at a small calibrated offset. Gamertags appear
//! as interleaved UTF-16 runs (`c 00` pairs in the kill stream, `00 c`
//! pairs in roster records). Roster records start with `2D C0` followed
//! by an 8-byte little-endian XUID and must not be read as kill events.

mod actor;
mod bitshift;
mod chunk;
mod confidence;
mod config;
mod correlate;
mod decode;
mod event;
mod gamertag;
mod manifest;
mod marker;
mod weapon;

// Re-export main types
pub use actor::{resolve as resolve_actors, ACTOR_WINDOW_MAX, ACTOR_WINDOW_MIN};
pub use bitshift::{all_shifts, BitShiftedView, SHIFT_COUNT};
pub use chunk::{ChunkMeta, RawChunk};
pub use confidence::{dedupe, score as score_candidate, DEDUPE_BUCKET_MS};
pub use config::DecodeConfig;
pub use correlate::{correlate, CorrelatedKillRecord, DEFAULT_PAIR_TOLERANCE_MS};
pub use decode::{decode as decode_chunk, DecodeResult, DecodeStats};
pub use event::{EventCandidate, EventKind, TYPE_BYTE_TABLE};
pub use gamertag::{
    is_valid_gamertag, locate as locate_gamertags, position_map as gamertag_position_map,
    GamertagOccurrence, Utf16Order, MAX_TAG_LEN, MIN_TAG_LEN,
};
pub use manifest::{ChunkEntry as ManifestChunkEntry, MatchManifest};
pub use marker::{
    in_roster_span, plausible_timestamp, scan as scan_markers, scan_any as scan_any_markers,
    scan_rosters, timestamp_hypotheses, RawMarker, RosterRecord, TimestampHypothesis,
    ASSIST_MARKER, DEATH_MARKER, KILL_MARKER, MAX_MATCH_TS_MS, MIN_MATCH_TS_MS, ROSTER_MARKER,
    ROSTER_RECORD_LEN, TS_TOLERANCE_MS,
};
pub use weapon::{
    extract as extract_weapon_id, is_plausible_id as is_plausible_weapon_id, WeaponIdCandidate,
    WeaponTable, WEAPON_ID_MAX, WEAPON_ID_MIN,
};

/// First byte of a zlib stream (deflate, 32K window)
pub const ZLIB_FIRST_BYTE: u8 = 0x78;

/// Errors from film chunk decoding
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid weapon id key {0:?}: expected hex like \"0xE02E\"")]
    WeaponIdKey(String),

    #[error("chunk {index} not listed in manifest for match {match_id}")]
    UnknownChunk { match_id: String, index: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check whether data starts with a zlib header.
///
/// Zlib streams open with 0x78 and a flag byte chosen so the first two
/// bytes, read big-endian, are divisible by 31.
pub fn is_zlib(data: &[u8]) -> bool {
    data.len() >= 2
        && data[0] == ZLIB_FIRST_BYTE
        && (u16::from(data[0]) << 8 | u16::from(data[1])) % 31 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zlib() {
        // Common zlib headers: default, best, and no compression
        assert!(is_zlib(&[0x78, 0x9c, 0x00]));
        assert!(is_zlib(&[0x78, 0xda]));
        assert!(is_zlib(&[0x78, 0x01]));

        // Right first byte, bad check bits
        assert!(!is_zlib(&[0x78, 0x9d]));

        // Raw payload
        assert!(!is_zlib(&[0x00, 0x32, 0x00]));

        // Too short
        assert!(!is_zlib(&[0x78]));
        assert!(!is_zlib(&[]));
    }

    #[test]
    fn test_marker_constants() {
        assert_eq!(KILL_MARKER, [0x00, 0x32, 0x00]);
        assert_eq!(DEATH_MARKER, [0x00, 0x14, 0x00]);
        assert_eq!(ASSIST_MARKER, [0x00, 0x64, 0x00]);
        assert_eq!(ROSTER_MARKER, [0x2d, 0xc0]);
        assert_eq!(ROSTER_RECORD_LEN, 10);
    }

    #[test]
    fn test_error_display() {
        let err = Error::WeaponIdKey("xyz".to_string());
        assert!(err.to_string().contains("invalid weapon id key"));

        let err = Error::UnknownChunk {
            match_id: "m1".to_string(),
            index: 7,
        };
        assert!(err.to_string().contains("chunk 7"));
    }
}

/// Test utilities for integration tests requiring downloaded film chunks
#[cfg(test)]
mod test_paths {
    use std::path::PathBuf;

    /// Directory of real film chunks, if available.
    ///
    /// Set `HIFILM_CHUNKS_DIR` to a directory of downloaded chunk files
    /// to enable the ignored integration tests.
    pub fn chunks_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("HIFILM_CHUNKS_DIR") {
            let path = PathBuf::from(dir);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}

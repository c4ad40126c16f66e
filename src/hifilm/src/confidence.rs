//! Candidate scoring and deduplication
//!
//! Every surviving candidate gets a confidence in [0, 1] from cheap
//! structural signals, then duplicate sightings of the same event
//! (the same record seen under several bit phases, or through several
//! timestamp hypotheses) are collapsed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::event::{EventCandidate, EventKind};
use crate::marker::{MAX_MATCH_TS_MS, MIN_MATCH_TS_MS, TS_TOLERANCE_MS};

/// Width of a dedupe bucket. Sightings of the same kind closer than
/// this are one event.
pub const DEDUPE_BUCKET_MS: u64 = 500;

/// Score one candidate.
///
/// 0.5 for a timestamp inside the chunk's tolerance window (the global
/// match window stands in when no bounds are known), plus 0.3 for
/// landing inside the declared bounds exactly, plus 0.1 per zero byte
/// adjacent to the marker (two counted at most). When several timestamp
/// hypotheses survived for the marker the score is divided by their
/// count. Clamped to [0, 1].
pub fn score(
    timestamp_ms: u64,
    bounds_ms: Option<(u64, u64)>,
    zero_pad: u8,
    hypotheses: usize,
) -> f64 {
    let mut confidence = 0.0;
    match bounds_ms {
        Some((start, end)) => {
            if timestamp_ms >= start.saturating_sub(TS_TOLERANCE_MS)
                && timestamp_ms <= end + TS_TOLERANCE_MS
            {
                confidence += 0.5;
            }
            if timestamp_ms >= start && timestamp_ms <= end {
                confidence += 0.3;
            }
        }
        None => {
            if (MIN_MATCH_TS_MS..=MAX_MATCH_TS_MS).contains(&timestamp_ms) {
                confidence += 0.5;
            }
        }
    }
    confidence += 0.1 * f64::from(zero_pad.min(2));
    if hypotheses > 1 {
        confidence /= hypotheses as f64;
    }
    confidence.clamp(0.0, 1.0)
}

/// Count zero bytes immediately before and after a 3-byte marker.
///
/// Real records pad around the marker; noise that happens to contain
/// the pattern usually does not.
pub fn zero_padding(bytes: &[u8], marker_offset: usize) -> u8 {
    let mut count = 0;
    if marker_offset > 0 && bytes.get(marker_offset - 1) == Some(&0x00) {
        count += 1;
    }
    if bytes.get(marker_offset + 3) == Some(&0x00) {
        count += 1;
    }
    count
}

/// Collapse duplicate sightings of the same event.
///
/// Candidates are bucketed by rounded timestamp and kind; the highest
/// confidence in each bucket survives, ties going to the lowest offset.
/// Output is ordered by timestamp, then offset.
pub fn dedupe(candidates: Vec<EventCandidate>) -> Vec<EventCandidate> {
    let mut buckets: HashMap<(u64, EventKind), EventCandidate> = HashMap::new();
    for candidate in candidates {
        let key = (bucket_of(candidate.timestamp_ms), candidate.kind);
        match buckets.entry(key) {
            Entry::Occupied(mut kept) => {
                if beats(&candidate, kept.get()) {
                    kept.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    let mut events: Vec<_> = buckets.into_values().collect();
    events.sort_by(|a, b| {
        a.timestamp_ms
            .cmp(&b.timestamp_ms)
            .then(a.offset.cmp(&b.offset))
    });
    events
}

fn bucket_of(timestamp_ms: u64) -> u64 {
    (timestamp_ms + DEDUPE_BUCKET_MS / 2) / DEDUPE_BUCKET_MS
}

fn beats(challenger: &EventCandidate, kept: &EventCandidate) -> bool {
    challenger.confidence > kept.confidence
        || (challenger.confidence == kept.confidence && challenger.offset < kept.offset)
}

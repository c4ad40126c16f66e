//! Chunk decoding pipeline
//!
//! Runs every bit-phase view of a chunk through the scanners, scores
//! what survives, and collapses duplicate sightings. The output is an
//! ordered candidate list plus triage counters for research output.

use serde::Serialize;

use crate::actor;
use crate::bitshift::all_shifts;
use crate::chunk::RawChunk;
use crate::config::DecodeConfig;
use crate::confidence;
use crate::event::{EventCandidate, EventKind};
use crate::gamertag::{self, GamertagOccurrence};
use crate::marker::{self, RosterRecord};
use crate::weapon;

/// Everything one chunk yielded.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    /// Deduplicated event candidates, ordered by timestamp.
    pub events: Vec<EventCandidate>,
    /// Gamertag sightings across all bit phases, near misses included.
    pub gamertags: Vec<GamertagOccurrence>,
    /// Roster records across all bit phases.
    pub rosters: Vec<RosterRecord>,
    pub stats: DecodeStats,
}

/// Triage counters for one decoded chunk.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DecodeStats {
    pub chunk_index: u32,
    pub compressed: bool,
    pub payload_len: usize,
    /// Marker pattern hits across all phases, before any filtering.
    pub raw_markers: usize,
    /// Marker hits discarded for sitting inside roster records.
    pub roster_collisions: usize,
    /// Timestamp hypotheses discarded as implausible.
    pub dropped_timestamps: usize,
    /// Candidates before deduplication.
    pub raw_candidates: usize,
    /// Candidates after deduplication.
    pub events: usize,
    /// Valid gamertag occurrences.
    pub gamertags: usize,
    pub rosters: usize,
    /// Events with no gamertag inside the attribution window.
    pub unresolved_actors: usize,
}

/// Decode one chunk.
pub fn decode(chunk: &RawChunk, config: &DecodeConfig) -> DecodeResult {
    let bounds = chunk.bounds_ms();
    let mut stats = DecodeStats {
        chunk_index: chunk.index(),
        compressed: chunk.compressed(),
        payload_len: chunk.len(),
        ..DecodeStats::default()
    };

    let mut gamertags = Vec::new();
    let mut rosters = Vec::new();
    let mut raw_candidates = Vec::new();

    for view in all_shifts(chunk.data()) {
        let bytes = view.as_bytes();
        let shift = view.shift();

        let view_rosters = marker::scan_rosters(bytes, shift);

        for raw in marker::scan(bytes) {
            stats.raw_markers += 1;
            if marker::in_roster_span(raw.offset, &view_rosters) {
                stats.roster_collisions += 1;
                continue;
            }

            let mut plausible = Vec::new();
            for hyp in marker::timestamp_hypotheses(bytes, raw.offset, &config.timestamp_offsets)
            {
                if marker::plausible_timestamp(hyp.timestamp_ms, bounds) {
                    plausible.push(hyp);
                } else {
                    stats.dropped_timestamps += 1;
                }
            }
            if plausible.is_empty() {
                continue;
            }

            let pad = confidence::zero_padding(bytes, raw.offset);
            let hypothesis_count = plausible.len();
            for hyp in plausible {
                let weapon_id = match raw.kind {
                    EventKind::Kill => weapon_after(bytes, raw.offset, hyp.field_offset, config),
                    _ => None,
                };
                raw_candidates.push(EventCandidate {
                    offset: raw.offset,
                    shift,
                    kind: raw.kind,
                    timestamp_ms: hyp.timestamp_ms,
                    actor: None,
                    weapon_id,
                    confidence: confidence::score(
                        hyp.timestamp_ms,
                        bounds,
                        pad,
                        hypothesis_count,
                    ),
                });
            }
        }

        gamertags.extend(gamertag::locate(bytes, shift));
        rosters.extend(view_rosters);
    }

    stats.raw_candidates = raw_candidates.len();
    let mut events = confidence::dedupe(raw_candidates);
    stats.events = events.len();
    stats.unresolved_actors = actor::resolve(&mut events, &gamertags);
    stats.gamertags = gamertags.iter().filter(|t| t.valid).count();
    stats.rosters = rosters.len();

    DecodeResult {
        events,
        gamertags,
        rosters,
        stats,
    }
}

/// Extract the weapon id from the window behind a kill's timestamp.
///
/// The window opens after the 2-byte field at the candidate's own
/// hypothesis offset and is clipped at the view's end.
fn weapon_after(
    bytes: &[u8],
    marker_offset: usize,
    field_offset: usize,
    config: &DecodeConfig,
) -> Option<u16> {
    let start = marker_offset + field_offset + 2;
    let end = (start + config.weapon_window).min(bytes.len());
    if start >= end {
        return None;
    }
    weapon::extract(&bytes[start..end], &config.weapon_table).map(|hit| hit.id)
}

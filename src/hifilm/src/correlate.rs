//! Kill/death correlation
//!
//! A kill in one player's stream and the matching death in the
//! victim's stream land within a few frames of each other. Pairing is
//! greedy: kills in time order each take the nearest unconsumed death
//! inside the tolerance. Unpaired events still produce records, at
//! reduced confidence, so nothing the scanner found is silently lost.

use serde::Serialize;

use crate::event::{EventCandidate, EventKind};

/// Widest kill/death gap treated as the same engagement.
pub const DEFAULT_PAIR_TOLERANCE_MS: u64 = 100;

/// A kill joined with its victim's death record, or either side alone.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedKillRecord {
    pub match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victim: Option<String>,
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_id: Option<u16>,
    pub confidence: f64,
}

/// Pair kill and death candidates from one match into records.
///
/// Kills are visited in ascending timestamp order (offset breaking
/// ties) and each takes the nearest unconsumed death within
/// `tolerance_ms`, equal distances going to the earliest death in scan
/// order. Leftover deaths become victim-only records. Assists never
/// participate. Output is ordered by timestamp.
pub fn correlate(
    events: &[EventCandidate],
    match_id: &str,
    tolerance_ms: u64,
) -> Vec<CorrelatedKillRecord> {
    let mut kills: Vec<&EventCandidate> = events
        .iter()
        .filter(|e| e.kind == EventKind::Kill)
        .collect();
    kills.sort_by(|a, b| {
        a.timestamp_ms
            .cmp(&b.timestamp_ms)
            .then(a.offset.cmp(&b.offset))
    });
    let deaths: Vec<&EventCandidate> = events
        .iter()
        .filter(|e| e.kind == EventKind::Death)
        .collect();

    let mut consumed = vec![false; deaths.len()];
    let mut records = Vec::new();

    for kill in kills {
        let mut best: Option<(u64, usize)> = None;
        for (i, death) in deaths.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let delta = death.timestamp_ms.abs_diff(kill.timestamp_ms);
            if delta > tolerance_ms {
                continue;
            }
            // Strictly closer wins, so the earliest death keeps the
            // slot on equal distance
            if best.map_or(true, |(best_delta, _)| delta < best_delta) {
                best = Some((delta, i));
            }
        }
        match best {
            Some((_, i)) => {
                consumed[i] = true;
                records.push(paired(kill, deaths[i], match_id));
            }
            None => records.push(kill_only(kill, match_id)),
        }
    }

    for (i, death) in deaths.iter().enumerate() {
        if !consumed[i] {
            records.push(death_only(death, match_id));
        }
    }

    records.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms));
    records
}

fn paired(kill: &EventCandidate, death: &EventCandidate, match_id: &str) -> CorrelatedKillRecord {
    CorrelatedKillRecord {
        match_id: match_id.to_string(),
        killer: kill.actor.clone(),
        victim: death.actor.clone(),
        // The kill stream's clock is authoritative for the engagement
        timestamp_ms: kill.timestamp_ms,
        weapon_id: kill.weapon_id,
        confidence: (kill.confidence + death.confidence) / 2.0,
    }
}

fn kill_only(kill: &EventCandidate, match_id: &str) -> CorrelatedKillRecord {
    CorrelatedKillRecord {
        match_id: match_id.to_string(),
        killer: kill.actor.clone(),
        victim: None,
        timestamp_ms: kill.timestamp_ms,
        weapon_id: kill.weapon_id,
        confidence: kill.confidence / 2.0,
    }
}

fn death_only(death: &EventCandidate, match_id: &str) -> CorrelatedKillRecord {
    CorrelatedKillRecord {
        match_id: match_id.to_string(),
        killer: None,
        victim: death.actor.clone(),
        timestamp_ms: death.timestamp_ms,
        weapon_id: None,
        confidence: death.confidence / 2.0,
    }
}

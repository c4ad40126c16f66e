//! Event and roster marker scanning

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use memchr::{memchr_iter, memmem};

use crate::event::{EventKind, TYPE_BYTE_TABLE};

/// Kill event marker
pub const KILL_MARKER: [u8; 3] = [0x00, 0x32, 0x00];

/// Death event marker
pub const DEATH_MARKER: [u8; 3] = [0x00, 0x14, 0x00];

/// Assist event marker
pub const ASSIST_MARKER: [u8; 3] = [0x00, 0x64, 0x00];

/// Roster record family marker
pub const ROSTER_MARKER: [u8; 2] = [0x2d, 0xc0];

/// Roster record span: marker plus an 8-byte XUID
pub const ROSTER_RECORD_LEN: usize = 2 + 8;

/// Earliest timestamp accepted without chunk bounds (matches never
/// produce events in the first 10 seconds of film)
pub const MIN_MATCH_TS_MS: u64 = 10_000;

/// Latest timestamp accepted without chunk bounds (30 minute ceiling)
pub const MAX_MATCH_TS_MS: u64 = 1_800_000;

/// Slack around declared chunk bounds
pub const TS_TOLERANCE_MS: u64 = 5_000;

/// A marker hit, before timestamp decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMarker {
    pub offset: usize,
    pub kind: EventKind,
}

/// A roster record: marker followed by the player's XUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RosterRecord {
    pub offset: usize,
    /// Bit phase of the view the record was found in.
    pub shift: u8,
    pub xuid: u64,
}

impl RosterRecord {
    /// Whether the XUID sits in the retail Xbox Live range.
    ///
    /// Live accounts all carry 0x0009 in the top 16 bits; anything else
    /// is almost certainly a false hit on the marker bytes.
    pub fn looks_retail(&self) -> bool {
        self.xuid >> 48 == 0x0009
    }
}

/// One possible timestamp reading for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampHypothesis {
    /// Field position relative to the first marker byte.
    pub field_offset: usize,
    pub timestamp_ms: u64,
}

/// Find every classified event marker in one bit-phase view, ordered
/// by offset.
pub fn scan(bytes: &[u8]) -> Vec<RawMarker> {
    let mut found = Vec::new();
    for (byte, kind) in TYPE_BYTE_TABLE {
        let pattern = [0x00, byte, 0x00];
        let finder = memmem::Finder::new(&pattern);
        // Adjacent markers share their zero bytes (00 32 00 32 00), so
        // resume one byte past each hit instead of past the pattern
        let mut pos = 0;
        while let Some(rel) = finder.find(&bytes[pos..]) {
            let offset = pos + rel;
            found.push(RawMarker { offset, kind });
            pos = offset + 1;
        }
    }
    found.sort_unstable_by_key(|m| m.offset);
    found
}

/// Find every marker-shaped `00 XX 00` hit, classified or not.
///
/// Calibration sweeps use this to surface type bytes the table does
/// not cover yet; hits outside the table carry
/// [`EventKind::Unknown`]. The decode pipeline itself only scans the
/// table.
pub fn scan_any(bytes: &[u8]) -> Vec<RawMarker> {
    let mut found = Vec::new();
    for offset in memchr_iter(0x00, bytes) {
        let Some(&type_byte) = bytes.get(offset + 1) else {
            break;
        };
        if type_byte != 0x00 && bytes.get(offset + 2) == Some(&0x00) {
            found.push(RawMarker {
                offset,
                kind: EventKind::from_type_byte(type_byte),
            });
        }
    }
    found
}

/// Find roster records in one bit-phase view.
///
/// Records missing their XUID field (marker too close to the end) or
/// carrying an all-zero XUID are dropped.
pub fn scan_rosters(bytes: &[u8], shift: u8) -> Vec<RosterRecord> {
    let finder = memmem::Finder::new(&ROSTER_MARKER);
    let mut found = Vec::new();
    for offset in finder.find_iter(bytes) {
        let Some(field) = bytes.get(offset + 2..offset + ROSTER_RECORD_LEN) else {
            continue;
        };
        let mut cursor = Cursor::new(field);
        let Ok(xuid) = cursor.read_u64::<LittleEndian>() else {
            continue;
        };
        if xuid == 0 {
            continue;
        }
        found.push(RosterRecord { offset, shift, xuid });
    }
    found
}

/// Whether an offset falls inside any roster record's span.
///
/// Event markers matching inside a roster record are pattern collisions
/// with the XUID bytes, not gameplay events.
pub fn in_roster_span(offset: usize, rosters: &[RosterRecord]) -> bool {
    rosters
        .iter()
        .any(|r| offset >= r.offset && offset < r.offset + ROSTER_RECORD_LEN)
}

/// Decode the timestamp field at each calibrated offset after a marker.
///
/// The field is 2 bytes little-endian in hundredths of a second;
/// offsets are measured from the first marker byte. Offsets running
/// past the view are skipped.
pub fn timestamp_hypotheses(
    bytes: &[u8],
    marker_offset: usize,
    field_offsets: &[usize],
) -> Vec<TimestampHypothesis> {
    let mut hypotheses = Vec::new();
    for &field_offset in field_offsets {
        let at = marker_offset + field_offset;
        let Some(raw) = bytes.get(at..at + 2) else {
            continue;
        };
        let centis = u16::from_le_bytes([raw[0], raw[1]]);
        hypotheses.push(TimestampHypothesis {
            field_offset,
            timestamp_ms: u64::from(centis) * 10,
        });
    }
    hypotheses
}

/// Whether a decoded timestamp is worth keeping.
///
/// Accepts anything in the global match window, or anything within
/// [`TS_TOLERANCE_MS`] of the chunk's declared bounds when those are
/// known.
pub fn plausible_timestamp(timestamp_ms: u64, bounds_ms: Option<(u64, u64)>) -> bool {
    if (MIN_MATCH_TS_MS..=MAX_MATCH_TS_MS).contains(&timestamp_ms) {
        return true;
    }
    match bounds_ms {
        Some((start, end)) => {
            timestamp_ms >= start.saturating_sub(TS_TOLERANCE_MS)
                && timestamp_ms <= end + TS_TOLERANCE_MS
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_all_kinds_sorted() {
        let mut data = vec![0xAAu8; 64];
        data[10..13].copy_from_slice(&DEATH_MARKER);
        data[30..33].copy_from_slice(&KILL_MARKER);
        data[50..53].copy_from_slice(&ASSIST_MARKER);

        let found = scan(&data);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], RawMarker { offset: 10, kind: EventKind::Death });
        assert_eq!(found[1], RawMarker { offset: 30, kind: EventKind::Kill });
        assert_eq!(found[2], RawMarker { offset: 50, kind: EventKind::Assist });
    }

    #[test]
    fn test_scan_shared_zero_byte() {
        // 00 32 00 14 00: the kill's trailing zero doubles as the
        // death's leading zero
        let mut data = vec![0xAAu8; 16];
        data[4..9].copy_from_slice(&[0x00, 0x32, 0x00, 0x14, 0x00]);

        let found = scan(&data);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, EventKind::Kill);
        assert_eq!(found[0].offset, 4);
        assert_eq!(found[1].kind, EventKind::Death);
        assert_eq!(found[1].offset, 6);
    }

    #[test]
    fn test_scan_overlapping_same_kind() {
        // Two kill markers sharing their middle zero byte
        let mut data = vec![0xAAu8; 16];
        data[4..9].copy_from_slice(&[0x00, 0x32, 0x00, 0x32, 0x00]);

        let found = scan(&data);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], RawMarker { offset: 4, kind: EventKind::Kill });
        assert_eq!(found[1], RawMarker { offset: 6, kind: EventKind::Kill });

        // The unclassified sweep sees the same two hits
        assert_eq!(scan_any(&data), found);
    }

    #[test]
    fn test_scan_any_labels_unclassified_bytes() {
        let mut data = vec![0xAAu8; 32];
        data[4..7].copy_from_slice(&KILL_MARKER);
        data[12..15].copy_from_slice(&[0x00, 0x2a, 0x00]);

        let found = scan_any(&data);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], RawMarker { offset: 4, kind: EventKind::Kill });
        assert_eq!(found[1], RawMarker { offset: 12, kind: EventKind::Unknown });
    }

    #[test]
    fn test_scan_any_skips_zero_runs() {
        // Triple-zero padding is not a marker shape
        let data = [0xAA, 0x00, 0x00, 0x00, 0xAA];
        assert!(scan_any(&data).is_empty());
    }

    #[test]
    fn test_scan_any_agrees_with_scan_on_table_bytes() {
        let mut data = vec![0xAAu8; 64];
        data[10..13].copy_from_slice(&DEATH_MARKER);
        data[30..33].copy_from_slice(&KILL_MARKER);

        let table_hits = scan(&data);
        let all_hits: Vec<_> = scan_any(&data)
            .into_iter()
            .filter(|m| m.kind != EventKind::Unknown)
            .collect();
        assert_eq!(table_hits, all_hits);
    }

    #[test]
    fn test_scan_rosters() {
        let xuid: u64 = 0x0009_1234_5678_9ABC;
        let mut data = vec![0xAAu8; 32];
        data[8..10].copy_from_slice(&ROSTER_MARKER);
        data[10..18].copy_from_slice(&xuid.to_le_bytes());

        let found = scan_rosters(&data, 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 8);
        assert_eq!(found[0].xuid, xuid);
        assert!(found[0].looks_retail());
    }

    #[test]
    fn test_scan_rosters_skips_zero_and_truncated() {
        let mut data = vec![0xAAu8; 24];
        // Zero XUID at 2
        data[2..4].copy_from_slice(&ROSTER_MARKER);
        data[4..12].copy_from_slice(&[0u8; 8]);
        // Marker too close to the end for a full XUID
        data[20..22].copy_from_slice(&ROSTER_MARKER);

        assert!(scan_rosters(&data, 0).is_empty());
    }

    #[test]
    fn test_roster_span_bounds() {
        let rosters = vec![RosterRecord { offset: 100, shift: 0, xuid: 1 }];
        assert!(in_roster_span(100, &rosters));
        assert!(in_roster_span(109, &rosters));
        assert!(!in_roster_span(99, &rosters));
        assert!(!in_roster_span(110, &rosters));
    }

    #[test]
    fn test_kill_pattern_inside_xuid_is_roster_territory() {
        // An XUID whose little-endian bytes happen to contain 00 32 00
        let xuid: u64 = 0x0009_0000_0032_00FF;
        let mut data = vec![0xAAu8; 32];
        data[6..8].copy_from_slice(&ROSTER_MARKER);
        data[8..16].copy_from_slice(&xuid.to_le_bytes());

        let rosters = scan_rosters(&data, 0);
        assert_eq!(rosters.len(), 1);

        let markers = scan(&data);
        assert!(!markers.is_empty());
        for marker in markers {
            assert!(
                in_roster_span(marker.offset, &rosters),
                "marker at {} escaped the roster span",
                marker.offset
            );
        }
    }

    #[test]
    fn test_timestamp_hypotheses() {
        let mut data = vec![0xAAu8; 32];
        data[10..13].copy_from_slice(&KILL_MARKER);
        // 16900 centiseconds at marker+5
        data[15..17].copy_from_slice(&16900u16.to_le_bytes());

        let hyps = timestamp_hypotheses(&data, 10, &[5]);
        assert_eq!(hyps.len(), 1);
        assert_eq!(hyps[0].field_offset, 5);
        assert_eq!(hyps[0].timestamp_ms, 169_000);
    }

    #[test]
    fn test_timestamp_multiple_offsets() {
        let mut data = vec![0u8; 32];
        data[15..17].copy_from_slice(&1500u16.to_le_bytes());
        data[17..19].copy_from_slice(&2500u16.to_le_bytes());

        let hyps = timestamp_hypotheses(&data, 10, &[5, 7]);
        assert_eq!(hyps.len(), 2);
        assert_eq!(hyps[0].timestamp_ms, 15_000);
        assert_eq!(hyps[1].timestamp_ms, 25_000);
    }

    #[test]
    fn test_timestamp_past_end_skipped() {
        let data = vec![0u8; 12];
        let hyps = timestamp_hypotheses(&data, 8, &[5]);
        assert!(hyps.is_empty());

        // Exactly enough room
        let data = vec![0u8; 15];
        assert_eq!(timestamp_hypotheses(&data, 8, &[5]).len(), 1);
    }

    #[test]
    fn test_timestamp_field_roundtrip() {
        // Every representable field value decodes back to itself
        for value in 0..=u16::MAX {
            let bytes = value.to_le_bytes();
            let decoded = u16::from_le_bytes(bytes);
            assert_eq!(decoded, value);

            let hyps = timestamp_hypotheses(&bytes, 0, &[0]);
            assert_eq!(hyps[0].timestamp_ms, u64::from(value) * 10);
        }
    }

    #[test]
    fn test_plausible_without_bounds() {
        assert!(plausible_timestamp(10_000, None));
        assert!(plausible_timestamp(169_000, None));
        assert!(plausible_timestamp(1_800_000, None));
        assert!(!plausible_timestamp(9_990, None));
        assert!(!plausible_timestamp(1_800_010, None));
        assert!(!plausible_timestamp(0, None));
    }

    #[test]
    fn test_plausible_with_bounds_tolerance() {
        let bounds = Some((2_000_000, 2_060_000));
        // Outside the global window but near the declared bounds
        assert!(plausible_timestamp(1_995_000, bounds));
        assert!(plausible_timestamp(2_030_000, bounds));
        assert!(plausible_timestamp(2_065_000, bounds));
        assert!(!plausible_timestamp(1_994_990, bounds));
        assert!(!plausible_timestamp(2_065_010, bounds));
    }

    #[test]
    fn test_plausible_near_match_start() {
        // Bounds at the very start of the match; tolerance must not
        // underflow, and sub-10s values inside the bounds must pass
        let bounds = Some((0, 60_000));
        assert!(plausible_timestamp(0, bounds));
        assert!(plausible_timestamp(5_000, bounds));
        assert!(plausible_timestamp(65_000, bounds));
        assert!(!plausible_timestamp(1_800_010, bounds));
    }
}

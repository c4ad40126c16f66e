//! Gamertag run detection
//!
//! Gamertags are stored as UTF-16 with the practical alphabet limited
//! to ASCII, which leaves a distinctive interleave in the byte stream:
//! `c 00 c 00 ...` in little-endian kill-stream records and
//! `00 c 00 c ...` in big-endian roster records. Both layouts are
//! detected in one pass.

use std::collections::BTreeMap;

/// Shortest name worth reporting. Xbox requires at least 3 characters.
pub const MIN_TAG_LEN: usize = 3;
/// Longest name the service issues.
pub const MAX_TAG_LEN: usize = 16;

/// Byte order the UTF-16 run was interleaved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Utf16Order {
    /// `c 00` pairs, seen in kill-stream records.
    Le,
    /// `00 c` pairs, seen in roster records.
    Be,
}

/// A detected UTF-16 character run.
///
/// Runs that decode but fail gamertag validation are kept with
/// `valid = false` so inspection output can show near misses.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GamertagOccurrence {
    /// Offset of the first byte of the run in its view.
    pub offset: usize,
    /// Bit phase of the view the run was found in.
    pub shift: u8,
    pub text: String,
    pub order: Utf16Order,
    pub valid: bool,
}

/// Scan one bit-phase view for interleaved UTF-16 runs.
pub fn locate(bytes: &[u8], shift: u8) -> Vec<GamertagOccurrence> {
    let mut found = Vec::new();
    let mut i = 0;

    while i + 2 * MIN_TAG_LEN <= bytes.len() {
        let run = if bytes[i] == 0x00 && is_tag_byte(bytes[i + 1]) {
            read_run(bytes, i, Utf16Order::Be)
        } else if is_tag_byte(bytes[i]) && bytes[i + 1] == 0x00 {
            read_run(bytes, i, Utf16Order::Le)
        } else {
            None
        };

        match run {
            Some((end, text, order)) => {
                let valid = is_valid_gamertag(&text);
                found.push(GamertagOccurrence {
                    offset: i,
                    shift,
                    text,
                    order,
                    valid,
                });
                i = end;
            }
            None => i += 1,
        }
    }

    found
}

/// Read a run of interleaved pairs starting at `start`.
///
/// LE pairs are `(char, 00)`, BE pairs are `(00, char)`. Returns the
/// end offset and decoded text once the run has at least [`MIN_TAG_LEN`]
/// characters.
fn read_run(bytes: &[u8], start: usize, order: Utf16Order) -> Option<(usize, String, Utf16Order)> {
    let mut text = String::new();
    let mut i = start;

    while i + 1 < bytes.len() {
        let ch = match order {
            Utf16Order::Le if is_tag_byte(bytes[i]) && bytes[i + 1] == 0x00 => bytes[i],
            Utf16Order::Be if bytes[i] == 0x00 && is_tag_byte(bytes[i + 1]) => bytes[i + 1],
            _ => break,
        };
        text.push(ch as char);
        i += 2;
    }

    if text.len() >= MIN_TAG_LEN {
        Some((i, text, order))
    } else {
        None
    }
}

/// Printable ASCII, the alphabet seen inside UTF-16 runs.
fn is_tag_byte(byte: u8) -> bool {
    (0x20..0x7F).contains(&byte)
}

/// Whether a decoded run is a plausible gamertag.
///
/// 3 to 16 characters, alphanumeric plus single interior spaces.
pub fn is_valid_gamertag(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
        return false;
    }
    if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
        return false;
    }
    text.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}

/// Offset to text for valid occurrences, ordered by position.
pub fn position_map(occurrences: &[GamertagOccurrence]) -> BTreeMap<usize, &str> {
    let mut map = BTreeMap::new();
    for occ in occurrences.iter().filter(|o| o.valid) {
        map.entry(occ.offset).or_insert(occ.text.as_str());
    }
    map
}

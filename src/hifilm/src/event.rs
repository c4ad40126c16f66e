//! Decoded event types

use serde::{Deserialize, Serialize};

/// Gameplay event class, keyed by the marker's middle byte.
///
/// `Unknown` covers marker-shaped hits whose type byte is not in
/// [`TYPE_BYTE_TABLE`]; the decode pipeline never emits them, but
/// calibration sweeps label raw hits with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Kill,
    Death,
    Assist,
    Unknown,
}

/// Marker type byte table. Scanning and classification both key off
/// this list.
pub const TYPE_BYTE_TABLE: [(u8, EventKind); 3] = [
    (0x32, EventKind::Kill),
    (0x14, EventKind::Death),
    (0x64, EventKind::Assist),
];

impl EventKind {
    /// Classify a marker type byte. Bytes outside the table come back
    /// as [`EventKind::Unknown`].
    pub fn from_type_byte(byte: u8) -> Self {
        TYPE_BYTE_TABLE
            .iter()
            .find(|(b, _)| *b == byte)
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    /// The marker type byte for this kind. `Unknown` has none.
    pub fn type_byte(self) -> Option<u8> {
        TYPE_BYTE_TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(byte, _)| *byte)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Death => "death",
            Self::Assist => "assist",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One event surviving the scan, with everything the heuristics could
/// attach to it.
#[derive(Debug, Clone, Serialize)]
pub struct EventCandidate {
    /// Offset of the marker in the bit-shifted view that matched.
    #[serde(rename = "byte_offset")]
    pub offset: usize,
    /// Bit phase the marker was found at. Diagnostic only.
    #[serde(skip)]
    pub shift: u8,
    pub kind: EventKind,
    /// Match-relative time in milliseconds.
    pub timestamp_ms: u64,
    #[serde(rename = "actor_name", skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_id: Option<u16>,
    /// Heuristic quality in [0, 1].
    pub confidence: f64,
}

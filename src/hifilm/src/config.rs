//! Decoder tuning

use crate::correlate::DEFAULT_PAIR_TOLERANCE_MS;
use crate::weapon::WeaponTable;

/// Knobs for the chunk decoder.
///
/// Defaults carry the values calibrated against ranked theater
/// captures. Overrides exist for calibration runs, not normal use.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Candidate timestamp field positions, relative to the first
    /// marker byte. Real films sit between 3 and 12; listing several
    /// turns on multi-hypothesis scoring for every marker.
    pub timestamp_offsets: Vec<usize>,
    /// Bytes searched after the timestamp field for a weapon id.
    pub weapon_window: usize,
    /// Weapon id acceptance and naming.
    pub weapon_table: WeaponTable,
    /// Widest kill/death gap treated as one engagement when pairing.
    /// Read by [`correlate`](crate::correlate), not by `decode`; it
    /// lives here so one config carries every calibrated value.
    pub pair_tolerance_ms: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            timestamp_offsets: vec![5],
            weapon_window: 40,
            weapon_table: WeaponTable::builtin(),
            pair_tolerance_ms: DEFAULT_PAIR_TOLERANCE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrated_defaults() {
        let config = DecodeConfig::default();
        assert_eq!(config.timestamp_offsets, vec![5]);
        assert_eq!(config.weapon_window, 40);
        assert_eq!(config.pair_tolerance_ms, 100);
        assert!(!config.weapon_table.is_empty());
    }
}

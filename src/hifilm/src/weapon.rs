//! Weapon id extraction
//!
//! Kill records carry a 2-byte weapon id behind two bytes of zero
//! padding. Ids were calibrated against theater footage; the compiled
//! table holds confirmed pairings and anything in the observed id range
//! is accepted as a lead worth logging.

use std::collections::HashMap;
use std::path::Path;

use crate::{Error, Result};

/// Lowest id observed for a real weapon
pub const WEAPON_ID_MIN: u16 = 0x1000;

/// Upper bound of the observed id range (exclusive)
pub const WEAPON_ID_MAX: u16 = 0xF000;

const BUILTIN_TABLE: &str = include_str!("../data/weapons.json");

/// A weapon id hit inside a search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponIdCandidate {
    pub id: u16,
    /// Position of the pattern inside the searched window.
    pub window_offset: usize,
    /// Whether the id is in the lookup table.
    pub known: bool,
}

/// Weapon id to display name lookup.
///
/// The compiled-in table ships with the crate; calibration sessions can
/// layer their own JSON on top without rebuilding.
#[derive(Debug, Clone, Default)]
pub struct WeaponTable {
    names: HashMap<u16, String>,
}

impl WeaponTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in table. Tests pin its contents, so a broken build
    /// artifact shows up there rather than here.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_TABLE).unwrap_or_default()
    }

    /// Parse a JSON object of hex id keys to names, like
    /// `{"0xE02E": "MA40 Assault Rifle"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut names = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            names.insert(parse_id_key(&key)?, name);
        }
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a table from disk layered over the builtin entries.
    pub fn load_over_builtin(path: &Path) -> Result<Self> {
        let mut table = Self::builtin();
        table.merge(Self::load(path)?);
        Ok(table)
    }

    /// Add entries from another table, overriding on conflict.
    pub fn merge(&mut self, other: WeaponTable) {
        self.names.extend(other.names);
    }

    pub fn insert(&mut self, id: u16, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn name(&self, id: u16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.names.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether an extracted id should be kept: either confirmed by the
    /// table or inside the observed range.
    pub fn accepts(&self, id: u16) -> bool {
        self.contains(id) || is_plausible_id(id)
    }
}

/// Whether an id falls in the range real weapons have been seen in.
pub fn is_plausible_id(id: u16) -> bool {
    (WEAPON_ID_MIN..WEAPON_ID_MAX).contains(&id)
}

/// Scan a window for the `00 00 lo hi` weapon field pattern.
///
/// The first acceptable hit wins; later patterns in the same window are
/// echoes of other fields.
pub fn extract(window: &[u8], table: &WeaponTable) -> Option<WeaponIdCandidate> {
    if window.len() < 4 {
        return None;
    }
    for i in 0..=window.len() - 4 {
        if window[i] != 0x00 || window[i + 1] != 0x00 {
            continue;
        }
        let id = u16::from_le_bytes([window[i + 2], window[i + 3]]);
        if table.accepts(id) {
            return Some(WeaponIdCandidate {
                id,
                window_offset: i,
                known: table.contains(id),
            });
        }
    }
    None
}

fn parse_id_key(key: &str) -> Result<u16> {
    let hex = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);
    u16::from_str_radix(hex, 16).map_err(|_| Error::WeaponIdKey(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = WeaponTable::builtin();
        assert!(table.len() >= 10);
        assert_eq!(table.name(0xE02E), Some("MA40 Assault Rifle"));
        assert_eq!(table.name(0xB7C1), Some("Needler"));
        assert_eq!(table.name(0x0000), None);
    }

    #[test]
    fn test_from_json_key_forms() {
        let table = WeaponTable::from_json(r#"{"0xE02E": "AR", "1a7c": "Pistol"}"#).unwrap();
        assert_eq!(table.name(0xE02E), Some("AR"));
        assert_eq!(table.name(0x1A7C), Some("Pistol"));
    }

    #[test]
    fn test_from_json_bad_key() {
        let err = WeaponTable::from_json(r#"{"not-hex": "AR"}"#).unwrap_err();
        assert!(matches!(err, Error::WeaponIdKey(_)));

        // Too wide for u16
        let err = WeaponTable::from_json(r#"{"0x12345": "AR"}"#).unwrap_err();
        assert!(matches!(err, Error::WeaponIdKey(_)));
    }

    #[test]
    fn test_load_over_builtin_from_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!(
            "hifilm-weapons-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"0x7777": "Prototype", "0xE02E": "MA40 (season 5)"}"#)?;

        let table = WeaponTable::load_over_builtin(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(table.name(0x7777), Some("Prototype"));
        // The file layers over the builtin entries
        assert_eq!(table.name(0xE02E), Some("MA40 (season 5)"));
        assert_eq!(table.name(0xB7C1), Some("Needler"));
        Ok(())
    }

    #[test]
    fn test_merge_overrides() {
        let mut table = WeaponTable::builtin();
        let mut patch = WeaponTable::empty();
        patch.insert(0xE02E, "MA40 (season 5)");
        patch.insert(0x7777, "Prototype");
        table.merge(patch);

        assert_eq!(table.name(0xE02E), Some("MA40 (season 5)"));
        assert_eq!(table.name(0x7777), Some("Prototype"));
    }

    #[test]
    fn test_extract_known_id() {
        let table = WeaponTable::builtin();
        let mut window = vec![0xAAu8; 24];
        window[6..10].copy_from_slice(&[0x00, 0x00, 0x2E, 0xE0]);

        let hit = extract(&window, &table).unwrap();
        assert_eq!(hit.id, 0xE02E);
        assert_eq!(hit.window_offset, 6);
        assert!(hit.known);
    }

    #[test]
    fn test_extract_in_range_unknown() {
        let table = WeaponTable::empty();
        let mut window = vec![0xAAu8; 16];
        window[2..6].copy_from_slice(&[0x00, 0x00, 0x34, 0x12]);

        let hit = extract(&window, &table).unwrap();
        assert_eq!(hit.id, 0x1234);
        assert!(!hit.known);
    }

    #[test]
    fn test_extract_skips_implausible() {
        let table = WeaponTable::empty();
        let mut window = vec![0xAAu8; 24];
        // 0x0010 is below the observed range; the later 0x2000 should win
        window[2..6].copy_from_slice(&[0x00, 0x00, 0x10, 0x00]);
        window[10..14].copy_from_slice(&[0x00, 0x00, 0x00, 0x20]);

        let hit = extract(&window, &table).unwrap();
        assert_eq!(hit.id, 0x2000);
        assert_eq!(hit.window_offset, 10);
    }

    #[test]
    fn test_extract_table_hit_outside_range() {
        // Builtin carries ids below WEAPON_ID_MIN; the table vouches
        // for them even though the range check would not
        let table = WeaponTable::builtin();
        assert!(table.contains(0x0A16));
        assert!(!is_plausible_id(0x0A16));

        let mut window = vec![0xAAu8; 16];
        window[4..8].copy_from_slice(&[0x00, 0x00, 0x16, 0x0A]);

        let hit = extract(&window, &table).unwrap();
        assert_eq!(hit.id, 0x0A16);
        assert!(hit.known);
    }

    #[test]
    fn test_extract_first_match_wins() {
        let table = WeaponTable::builtin();
        let mut window = vec![0xAAu8; 24];
        window[2..6].copy_from_slice(&[0x00, 0x00, 0x3E, 0xB9]); // Plasma Pistol
        window[10..14].copy_from_slice(&[0x00, 0x00, 0x2E, 0xE0]); // MA40

        let hit = extract(&window, &table).unwrap();
        assert_eq!(hit.id, 0xB93E);
    }

    #[test]
    fn test_extract_empty_and_tiny_windows() {
        let table = WeaponTable::builtin();
        assert!(extract(&[], &table).is_none());
        assert!(extract(&[0x00, 0x00, 0x2E], &table).is_none());
    }

    #[test]
    fn test_plausible_range_bounds() {
        assert!(!is_plausible_id(0x0FFF));
        assert!(is_plausible_id(0x1000));
        assert!(is_plausible_id(0xEFFF));
        assert!(!is_plausible_id(0xF000));
    }
}

//! Match manifests
//!
//! The film discovery response names every chunk of a match with its
//! index and time window. Saved as JSON next to the chunk files, it
//! lets the decoder score timestamps against declared bounds. Chunks
//! decode fine without one; scoring just falls back to the global
//! match window.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkMeta;
use crate::{Error, Result};

/// One chunk's timing row in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEntry {
    pub index: u32,
    pub start_offset_ms: u64,
    pub duration_ms: u64,
}

/// Chunk timing metadata for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchManifest {
    pub match_id: String,
    pub chunks: Vec<ChunkEntry>,
}

impl MatchManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Timing metadata for a chunk index, if listed.
    pub fn meta_for(&self, index: u32) -> Option<ChunkMeta> {
        self.chunks
            .iter()
            .find(|c| c.index == index)
            .map(|c| ChunkMeta {
                chunk_index: c.index,
                start_offset_ms: c.start_offset_ms,
                duration_ms: c.duration_ms,
            })
    }

    /// Like [`meta_for`](Self::meta_for), erroring on unlisted indexes.
    pub fn require(&self, index: u32) -> Result<ChunkMeta> {
        self.meta_for(index).ok_or_else(|| Error::UnknownChunk {
            match_id: self.match_id.clone(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "match_id": "9f3c7a12-theater",
        "chunks": [
            {"index": 0, "start_offset_ms": 0, "duration_ms": 120000},
            {"index": 1, "start_offset_ms": 120000, "duration_ms": 120000},
            {"index": 2, "start_offset_ms": 240000, "duration_ms": 90000}
        ]
    }"#;

    #[test]
    fn test_parse() {
        let manifest = MatchManifest::from_json(SAMPLE).unwrap();
        assert_eq!(manifest.match_id, "9f3c7a12-theater");
        assert_eq!(manifest.chunks.len(), 3);
        assert_eq!(
            manifest.chunks[1],
            ChunkEntry {
                index: 1,
                start_offset_ms: 120_000,
                duration_ms: 120_000,
            }
        );
    }

    #[test]
    fn test_meta_for() {
        let manifest = MatchManifest::from_json(SAMPLE).unwrap();
        let meta = manifest.meta_for(2).unwrap();
        assert_eq!(meta.chunk_index, 2);
        assert_eq!(meta.bounds_ms(), (240_000, 330_000));

        assert!(manifest.meta_for(9).is_none());
    }

    #[test]
    fn test_require_unknown_chunk() {
        let manifest = MatchManifest::from_json(SAMPLE).unwrap();
        assert!(manifest.require(1).is_ok());

        let err = manifest.require(7).unwrap_err();
        assert!(matches!(err, Error::UnknownChunk { index: 7, .. }));
    }

    #[test]
    fn test_bad_json() {
        assert!(MatchManifest::from_json("not json").is_err());
        assert!(MatchManifest::from_json(r#"{"match_id": 3}"#).is_err());
    }

    #[test]
    fn test_round_trip() {
        let manifest = MatchManifest::from_json(SAMPLE).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let back = MatchManifest::from_json(&json).unwrap();
        assert_eq!(back.match_id, manifest.match_id);
        assert_eq!(back.chunks, manifest.chunks);
    }
}

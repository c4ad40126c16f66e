//! Film chunk loading and decompression

use std::io::Read;

use flate2::read::ZlibDecoder;
use serde::{Deserialize, Serialize};

/// Timing metadata for one chunk, taken from the match manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub chunk_index: u32,
    /// Match-relative start of the chunk's window, in milliseconds.
    pub start_offset_ms: u64,
    pub duration_ms: u64,
}

impl ChunkMeta {
    /// Covered window as (start, end) in match milliseconds.
    pub fn bounds_ms(&self) -> (u64, u64) {
        (self.start_offset_ms, self.start_offset_ms + self.duration_ms)
    }
}

/// A film chunk payload, inflated if the source bytes were a zlib stream.
///
/// Chunks arrive from the discovery API either deflated or raw; some
/// titles shipped both in the same match. Inflation is attempted first
/// and failure falls back to treating the input as a raw payload, so
/// loading never errors on format alone.
#[derive(Debug, Clone)]
pub struct RawChunk {
    data: Vec<u8>,
    index: u32,
    meta: Option<ChunkMeta>,
    compressed: bool,
}

impl RawChunk {
    /// Load a chunk without timing metadata.
    pub fn load(bytes: Vec<u8>, index: u32) -> Self {
        Self::build(bytes, index, None)
    }

    /// Load a chunk with manifest timing metadata attached.
    pub fn with_meta(bytes: Vec<u8>, meta: ChunkMeta) -> Self {
        Self::build(bytes, meta.chunk_index, Some(meta))
    }

    fn build(bytes: Vec<u8>, index: u32, meta: Option<ChunkMeta>) -> Self {
        match try_inflate(&bytes) {
            Some(data) => Self {
                data,
                index,
                meta,
                compressed: true,
            },
            None => Self {
                data: bytes,
                index,
                meta,
                compressed: false,
            },
        }
    }

    /// Decoded payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Whether the source bytes were a zlib stream.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    pub fn meta(&self) -> Option<&ChunkMeta> {
        self.meta.as_ref()
    }

    /// Declared (start, end) window in match milliseconds, if known.
    pub fn bounds_ms(&self) -> Option<(u64, u64)> {
        self.meta.map(|m| m.bounds_ms())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Inflate a zlib stream, or None if the bytes are not one.
fn try_inflate(bytes: &[u8]) -> Option<Vec<u8>> {
    if !crate::is_zlib(bytes) {
        return None;
    }
    let mut decoder = ZlibDecoder::new(bytes);
    let mut data = Vec::new();
    match decoder.read_to_end(&mut data) {
        Ok(_) => Some(data),
        // Header looked right but the stream is broken; treat as raw
        Err(_) => None,
    }
}

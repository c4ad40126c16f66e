//! File system utilities for locating film chunk files

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Whether a path looks like a film chunk file.
///
/// Downloads keep the server naming (`filmChunk0`, `filmChunk12`);
/// re-archived sets usually carry a `.chunk` or `.bin` extension.
pub fn is_chunk_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name.starts_with("filmChunk") {
        return true;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ["bin", "chunk"].iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Collect every chunk file under a directory tree, sorted by path.
pub fn collect_chunk_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| is_chunk_file(p))
        .collect();

    files.sort();
    Ok(files)
}

/// Chunk index from the trailing digits of a file stem.
///
/// `filmChunk12` and `chunk_012.bin` both map to 12. Files without
/// trailing digits map to 0.
pub fn chunk_index_from_path(path: &Path) -> u32 {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return 0;
    };

    let digits: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits.parse().unwrap_or(0)
}

//! Hierarchical code chunking, symbol extraction and cross-file resolution.
//!
//! Three stages, run in order by [`index_directory`]:
//! 1. [`chunker`] splits each file into [`types::Chunk`]s, structural for
//!    supported grammars and line-bounded otherwise.
//! 2. [`resolver`] runs a second pass over the full chunk set, back-filling
//!    the relational metadata fields that need whole-project visibility.
//! 3. Callers persist the result (see the `vector-store` and `indexer` crates).

pub mod chunker;
pub mod errors;
pub mod grammar;
pub mod metadata;
pub mod resolver;
pub mod tokenizer;
pub mod types;
mod util;

pub use errors::{Error, Result};
pub use grammar::LangId;
pub use types::{Chunk, ChunkMetadata, SourceFile, SymbolType};

use sha2::{Digest, Sha256};
use std::path::Path;

/// Default token budget for a single chunk, mirroring the original
/// implementation's default `max_chunk_size`.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1200;

fn digest_of(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn read_source_file(root: &Path, path: &Path) -> Result<SourceFile> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)?;
    let relpath = pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/");
    Ok(SourceFile {
        digest: digest_of(&content),
        filepath: relpath,
        content,
    })
}

/// Chunks every eligible file under `root`, then runs cross-file resolution
/// over the combined result. `max_chunk_size` bounds each chunk in tokens.
pub fn index_directory(root: &Path, max_chunk_size: usize) -> Result<Vec<Chunk>> {
    let files = util::fs_scan::scan_project_files(root);
    let mut chunks = Vec::new();

    for path in files {
        let source = match read_source_file(root, &path) {
            Ok(s) => s,
            // Non-UTF8 or unreadable files are skipped rather than failing
            // the whole batch; one bad file shouldn't block an entire index run.
            Err(_) => continue,
        };
        chunks.extend(chunker::chunk_document(&source, max_chunk_size)?);
    }

    resolver::resolve_cross_file(&mut chunks);
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn indexes_a_small_directory_tree() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("chunk_engine_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.py"), "def f():\n    pass\n").unwrap();
        fs::write(dir.join("notes.txt"), "hello\n").unwrap();

        let chunks = index_directory(&dir, 200).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().any(|c| c.filepath.ends_with("a.py")));

        let _ = fs::remove_dir_all(&dir);
    }
}

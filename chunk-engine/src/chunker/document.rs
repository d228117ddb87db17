//! File-level orchestration: picks a splitter, enforces the token bound on
//! whatever the splitter produced, and assigns chunk identity.

use crate::chunker::basic::basic_chunker;
use crate::chunker::code::code_chunker;
use crate::errors::{Error, Result};
use crate::grammar::{self, LangId};
use crate::tokenizer::count_tokens;
use crate::types::{Chunk, RawChunk, SourceFile};
use std::path::Path;

/// Files larger than this are skipped rather than chunked; the Indexer
/// reports them as an `error` progress record and continues the batch.
pub const MAX_FILE_CHARS: usize = 1_000_000;

/// Whether `content` is worth chunking at all. Whitespace-only and empty
/// files never produce a chunk.
pub fn should_chunk(content: &str) -> bool {
    !content.trim().is_empty()
}

fn lang_for(filepath: &str) -> Option<LangId> {
    grammar::lang_for_path(Path::new(filepath))
}

/// Truncates an oversize raw chunk to fit `max_chunk_size`, dropping trailing
/// lines one at a time and appending an ellipsis marker so downstream
/// consumers can tell the content was cut.
fn enforce_bound(raw: RawChunk, max_chunk_size: usize) -> RawChunk {
    if count_tokens(&raw.content) <= max_chunk_size {
        return raw;
    }
    let suffix = "\n...";
    let budget = max_chunk_size.saturating_sub(count_tokens(suffix));

    let mut lines: Vec<&str> = raw.content.split('\n').collect();
    while lines.len() > 1 && count_tokens(&lines.join("\n")) > budget {
        lines.pop();
    }
    let mut truncated = lines.join("\n");
    truncated.push_str(suffix);

    RawChunk {
        content: truncated,
        start_line: raw.start_line,
        end_line: raw.end_line,
        metadata: raw.metadata,
    }
}

/// Splits `file` into raw chunks without assigning final identity.
pub fn chunk_document_without_id(file: &SourceFile, max_chunk_size: usize) -> Result<Vec<RawChunk>> {
    if file.content.chars().count() > MAX_FILE_CHARS {
        return Err(Error::InvalidState("file exceeds maximum chunkable size"));
    }
    if !should_chunk(&file.content) {
        return Ok(Vec::new());
    }

    let lang = lang_for(&file.filepath);
    let mut raw = match lang {
        Some(lang) => code_chunker(&file.filepath, &file.content, max_chunk_size, lang)?,
        None => basic_chunker(&file.content, max_chunk_size),
    };

    if lang.is_none() {
        if let Some(first) = raw.first_mut() {
            let basename = Path::new(&file.filepath)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.filepath.clone());
            first.metadata = crate::types::ChunkMetadata::file_stub(&basename);
        }
    }

    Ok(raw
        .into_iter()
        .map(|c| enforce_bound(c, max_chunk_size))
        .collect())
}

/// Splits `file` and assigns final chunk identity (dense index, shared digest).
pub fn chunk_document(file: &SourceFile, max_chunk_size: usize) -> Result<Vec<Chunk>> {
    let raw = chunk_document_without_id(file, max_chunk_size)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, r)| Chunk {
            digest: file.digest.clone(),
            content: r.content,
            start_line: r.start_line,
            end_line: r.end_line,
            filepath: file.filepath.clone(),
            index,
            metadata: r.metadata,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filepath: &str, content: &str) -> SourceFile {
        SourceFile {
            filepath: filepath.to_string(),
            content: content.to_string(),
            digest: "fixed-digest".to_string(),
        }
    }

    #[test]
    fn whitespace_only_file_yields_no_chunks() {
        let f = file("empty.py", "   \n\t\n");
        assert!(chunk_document(&f, 200).unwrap().is_empty());
    }

    #[test]
    fn python_file_routes_through_code_chunker() {
        let f = file("a.py", "def f():\n    pass\n");
        let chunks = chunk_document(&f, 200).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.filepath == "a.py"));
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn unknown_extension_routes_through_basic_chunker() {
        let f = file("notes.txt", "line one\nline two\n");
        let chunks = chunk_document(&f, 200).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn fallback_first_chunk_carries_the_file_stub() {
        let f = file("README.md", "line one\nline two\nline three\n");
        let chunks = chunk_document(&f, 10).unwrap();
        assert!(!chunks.is_empty());
        assert_eq!(
            chunks[0].metadata.symbol_type,
            Some(crate::types::SymbolType::File)
        );
        assert_eq!(chunks[0].metadata.symbol_name.as_deref(), Some("README.md"));
        assert!(chunks.iter().all(|c| count_tokens(&c.content) <= 10));
    }

    #[test]
    fn chunks_get_sequential_indices() {
        let body: String = (0..200).map(|i| format!("x{i} = {i}\n")).collect();
        let f = file("big.txt", &body);
        let chunks = chunk_document(&f, 30).unwrap();
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        let expected: Vec<usize> = (0..chunks.len()).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn all_chunks_share_the_file_digest() {
        let f = file("a.py", "def f():\n    pass\n\ndef g():\n    pass\n");
        let chunks = chunk_document(&f, 200).unwrap();
        assert!(chunks.iter().all(|c| c.digest == "fixed-digest"));
    }

    #[test]
    fn oversize_file_is_rejected() {
        let content: String = "x".repeat(MAX_FILE_CHARS + 1);
        let f = file("huge.txt", &content);
        assert!(chunk_document(&f, 200).is_err());
    }
}

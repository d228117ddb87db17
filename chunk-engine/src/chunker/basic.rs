//! Line-level token-bounded splitter, used for unsupported or non-code files.

use crate::tokenizer::count_tokens;
use crate::types::{ChunkMetadata, RawChunk};

/// Headroom subtracted from `max_chunk_size` before a line is allowed to join
/// the current accumulator. Carried unchanged from the original implementation;
/// its exact origin is undocumented, but the token-bound invariant depends on
/// this precise boundary.
const HEADROOM: usize = 5;

pub fn basic_chunker(content: &str, max_chunk_size: usize) -> Vec<RawChunk> {
    let mut out = Vec::new();
    let mut acc = String::new();
    let mut acc_tokens = 0usize;
    let mut acc_start_line = 0usize;
    let limit = max_chunk_size.saturating_sub(HEADROOM);

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    for (line_idx, line) in lines.iter().enumerate() {
        let line_tokens = count_tokens(line);

        if line_tokens > max_chunk_size {
            // Individually oversize line: never joins the accumulator, but the
            // boundary still advances past it.
            if !acc.is_empty() {
                out.push(finish(&acc, acc_start_line, line_idx.saturating_sub(1)));
                acc.clear();
                acc_tokens = 0;
            }
            acc_start_line = line_idx + 1;
            continue;
        }

        if acc_tokens + line_tokens > limit && !acc.is_empty() {
            out.push(finish(&acc, acc_start_line, line_idx.saturating_sub(1)));
            acc.clear();
            acc_tokens = 0;
            acc_start_line = line_idx;
        }

        acc.push_str(line);
        acc_tokens += line_tokens;
    }

    if !acc.is_empty() {
        let end_line = lines.len().saturating_sub(1);
        out.push(finish(&acc, acc_start_line, end_line));
    }

    out
}

fn finish(acc: &str, start_line: usize, end_line: usize) -> RawChunk {
    RawChunk {
        content: acc.to_string(),
        start_line,
        end_line,
        metadata: ChunkMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_yields_no_chunks() {
        assert!(basic_chunker("", 100).is_empty());
    }

    #[test]
    fn small_file_is_one_chunk() {
        let chunks = basic_chunker("a = 1\nb = 2\n", 1000);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn respects_token_bound() {
        let content: String = (0..500).map(|i| format!("line_{i} = {i}\n")).collect();
        let chunks = basic_chunker(&content, 50);
        for c in &chunks {
            assert!(count_tokens(&c.content) <= 50);
        }
        assert!(chunks.len() > 1);
    }
}

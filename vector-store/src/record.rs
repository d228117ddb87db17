//! Canonical data models and public API types for the vector store row schema:
//! uuid, path, cachekey, content, start_line, end_line, index, metadata, embedding.

use chunk_engine::{Chunk, ChunkMetadata};
use serde::Serialize;
use serde_json::Value;

/// A chunk paired with the embedding vector it is (or will be) stored under.
#[derive(Clone, Debug)]
pub struct StoreRecord {
    pub path: String,
    /// Content digest, used as a cache key to skip re-embedding unchanged chunks.
    pub cachekey: String,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub index: usize,
    pub metadata: ChunkMetadata,
    pub embedding: Option<Vec<f32>>,
}

impl StoreRecord {
    /// Builds a record from an already-chunked `Chunk`, without an embedding yet.
    pub fn from_chunk(chunk: Chunk) -> Self {
        Self {
            path: chunk.filepath,
            cachekey: chunk.digest,
            content: chunk.content,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            index: chunk.index,
            metadata: chunk.metadata,
            embedding: None,
        }
    }

    /// Deterministic point id: `relpath_startline_endline_index`, with path
    /// separators sanitized so the id is stable across platforms.
    pub fn stable_id(&self) -> String {
        let sanitized = self
            .path
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect::<String>();
        format!("{sanitized}_{}_{}_{}", self.start_line, self.end_line, self.index)
    }
}

/// Filter abstraction used by retrieval methods.
#[derive(Clone, Debug)]
pub enum StoreFilter {
    /// Filter by exact `path` equality.
    ByPath(String),
    /// Filter by exact field equality.
    ByFieldEq { key: String, value: Value },
    /// Conjunction of filters.
    And(Vec<StoreFilter>),
    /// Disjunction of filters.
    Or(Vec<StoreFilter>),
}

/// Normalized query parameters for a retrieval call.
#[derive(Clone, Debug)]
pub struct StoreQuery<'a> {
    /// Input query text to be embedded.
    pub text: &'a str,
    /// Number of results to return.
    pub top_k: u64,
    /// Optional filter to narrow down the search space.
    pub filter: Option<StoreFilter>,
}

/// Normalized retrieval hit, rehydrated from the point payload.
#[derive(Clone, Debug, Serialize)]
pub struct StoreHit {
    /// Similarity score returned by the backing store.
    pub score: f32,
    pub path: String,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub index: usize,
    pub metadata: ChunkMetadata,
}

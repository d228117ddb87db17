//! Error types for the indexer crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Chunk(#[from] chunk_engine::Error),

    #[error(transparent)]
    Store(#[from] vector_store::StoreError),

    #[error("indexing cancelled")]
    Cancelled,
}

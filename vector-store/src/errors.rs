//! Error types used across the vector store library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider error: {0}")]
    Provider(String),

    /// Named after the backing store's own failures rather than `Qdrant`
    /// directly, so the public API stays meaningful if the backend ever changes.
    #[error("store error: {0}")]
    Store(String),

    #[error("missing embedding")]
    MissingEmbedding,

    #[error("vector size mismatch: got={got}, want={want}")]
    VectorSizeMismatch { got: usize, want: usize },
}

//! High-level vector store facade: chunk ingestion + retrieval over Qdrant.
//!
//! This crate provides a clean API to:
//! - Ingest [`chunk_engine::Chunk`]s, embedding them on the fly or reusing
//!   precomputed vectors.
//! - Retrieve top-K chunk hits for a textual query.
//!
//! The design is flat (no deep nesting) and splits responsibilities into
//! focused modules.

mod config;
pub mod embed;
mod errors;
mod filters;
mod ingest;
pub mod qdrant_facade;
pub mod record;
mod retrieve;

pub use config::{DistanceKind, StoreConfig, VectorSpace};
pub use embed::ollama::{OllamaConfig, OllamaEmbedder};
pub use embed::{EmbeddingPolicy, EmbeddingsProvider};
pub use errors::StoreError;
pub use record::{StoreFilter, StoreHit, StoreQuery, StoreRecord};

use tracing::info;

/// High-level facade that wires configuration and the Qdrant client.
///
/// `VectorStore` is the single entry point recommended for application code:
/// it ingests chunk records and answers similarity queries against them.
pub struct VectorStore {
    cfg: StoreConfig,
    client: qdrant_facade::QdrantFacade,
}

impl VectorStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the client initialization fails.
    pub fn new(cfg: StoreConfig) -> Result<Self, StoreError> {
        info!("VectorStore::new collection={}", cfg.collection);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    /// Ingests a batch of chunk records, embedding any that lack a
    /// precomputed vector, and upserts them into the collection.
    ///
    /// # Errors
    /// Returns errors on vector size mismatch or backing-store failures.
    pub async fn ingest(
        &self,
        records: Vec<StoreRecord>,
        policy: EmbeddingPolicy<'_>,
    ) -> Result<usize, StoreError> {
        info!("VectorStore::ingest records={}", records.len());
        ingest::ingest_records(&self.cfg, &self.client, records, policy).await
    }

    /// Performs a low-level vector search and returns `(score, payload)` tuples.
    ///
    /// # Errors
    /// Returns [`StoreError::Store`] if the search fails.
    pub async fn search_by_vector(
        &self,
        query_vector: Vec<f32>,
        top_k: u64,
        filter: Option<StoreFilter>,
        with_payload: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, StoreError> {
        let qfilter = filter.as_ref().map(filters::to_qdrant_filter);
        retrieve::search_by_vector(
            &self.cfg,
            &self.client,
            query_vector,
            top_k,
            qfilter,
            with_payload,
            self.cfg.exact_search,
        )
        .await
    }

    /// Deletes every point whose `path` field equals `path`.
    ///
    /// # Errors
    /// Returns [`StoreError::Store`] if the backing delete call fails.
    pub async fn delete_by_path(&self, path: &str) -> Result<(), StoreError> {
        info!("VectorStore::delete_by_path path={path}");
        let filter = filters::to_qdrant_filter(&StoreFilter::ByPath(path.to_string()));
        self.client.delete_by_filter(filter).await
    }

    /// Embeds `query.text`, searches the collection, and rehydrates chunk hits.
    ///
    /// # Errors
    /// Returns embedding errors or backing-store failures.
    pub async fn retrieve(
        &self,
        query: StoreQuery<'_>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<StoreHit>, StoreError> {
        retrieve::retrieve(&self.cfg, &self.client, query, provider).await
    }
}

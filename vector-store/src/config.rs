//! Library configuration and distance kinds.

use crate::errors::StoreError;

/// Distance metric kind for the Qdrant collection.
#[derive(Clone, Copy, Debug)]
pub enum DistanceKind {
    Cosine,
    Dot,
    Euclid,
}

/// High-level configuration for the Qdrant-backed vector store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub distance: DistanceKind,
    pub upsert_batch: usize,
    pub exact_search: bool,
    /// Expected embedding dimensionality (e.g. EMBEDDING_DIM=1024).
    pub embedding_dim: Option<usize>,
    /// Parallelism for embedding provider calls (EMBEDDING_CONCURRENCY).
    pub embedding_concurrency: Option<usize>,
}

impl StoreConfig {
    /// Builds a `StoreConfig` from environment variables.
    ///
    /// Recognized vars:
    /// - VECTOR_STORE_URL (required), VECTOR_STORE_COLLECTION (required)
    /// - VECTOR_STORE_DISTANCE = Cosine|Dot|Euclid (default: Cosine)
    /// - VECTOR_STORE_UPSERT_BATCH (default: 256)
    /// - VECTOR_STORE_API_KEY (optional)
    /// - VECTOR_STORE_EXACT_SEARCH=true/false (default: false)
    /// - EMBEDDING_DIM (optional)
    /// - EMBEDDING_CONCURRENCY (optional)
    pub fn from_env() -> Result<Self, StoreError> {
        use std::env;
        let url = env::var("VECTOR_STORE_URL")
            .map_err(|_| StoreError::Config("VECTOR_STORE_URL is required".into()))?;
        let collection = env::var("VECTOR_STORE_COLLECTION")
            .map_err(|_| StoreError::Config("VECTOR_STORE_COLLECTION is required".into()))?;

        let distance = match env::var("VECTOR_STORE_DISTANCE")
            .unwrap_or_else(|_| "Cosine".into())
            .as_str()
        {
            "Cosine" | "cosine" => DistanceKind::Cosine,
            "Dot" | "dot" => DistanceKind::Dot,
            "Euclid" | "euclid" | "L2" => DistanceKind::Euclid,
            other => {
                return Err(StoreError::Config(format!(
                    "Unknown VECTOR_STORE_DISTANCE: {other}"
                )));
            }
        };

        let upsert_batch = env::var("VECTOR_STORE_UPSERT_BATCH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(256);

        let exact_search = env::var("VECTOR_STORE_EXACT_SEARCH")
            .ok()
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let api_key = env::var("VECTOR_STORE_API_KEY").ok();

        let embedding_dim = env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());

        let embedding_concurrency = env::var("EMBEDDING_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());

        Ok(Self {
            qdrant_url: url,
            qdrant_api_key: api_key,
            collection,
            distance,
            upsert_batch,
            exact_search,
            embedding_dim,
            embedding_concurrency,
        })
    }

    /// Validates mandatory fields.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(StoreError::Config("empty VECTOR_STORE_URL".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(StoreError::Config("empty VECTOR_STORE_COLLECTION".into()));
        }
        Ok(())
    }
}

/// Vector space settings used for collection creation.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    pub size: usize,
    pub distance: DistanceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_collection() {
        let cfg = StoreConfig {
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: "".into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            exact_search: false,
            embedding_dim: None,
            embedding_concurrency: None,
        };
        assert!(cfg.validate().is_err());
    }
}

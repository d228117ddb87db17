//! Timeout-bounded wrapper around `VectorStore::retrieve`.
//!
//! The store's own `retrieve` is stateless and safe to call concurrently; the
//! timeout policy lives here because it is a caller concern, not a storage one.

use std::time::Duration;

use tracing::warn;
use vector_store::{EmbeddingsProvider, StoreHit, StoreQuery, VectorStore};

/// Retrieves chunk hits for a query, bounded by `timeout`. Returns an empty
/// list (rather than an error) if the underlying call does not finish in time.
pub async fn retrieve_with_timeout(
    store: &VectorStore,
    query: StoreQuery<'_>,
    provider: &dyn EmbeddingsProvider,
    timeout: Duration,
) -> Vec<StoreHit> {
    match tokio::time::timeout(timeout, store.retrieve(query, provider)).await {
        Ok(Ok(hits)) => hits,
        Ok(Err(e)) => {
            warn!("retriever: retrieve failed: {e}");
            Vec::new()
        }
        Err(_) => {
            warn!("retriever: retrieve timed out after {:?}", timeout);
            Vec::new()
        }
    }
}

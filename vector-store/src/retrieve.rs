//! Retrieval helpers for vector search and context building.
//!
//! This module encapsulates two core functionalities:
//! 1. Low-level vector search through the backing store.
//! 2. Embedding a free-text query and rehydrating chunk hits from it.

use crate::config::StoreConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::StoreError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{StoreHit, StoreQuery};
use chunk_engine::ChunkMetadata;
use qdrant_client::qdrant::Filter;
use tracing::{debug, info, trace, warn};

/// Executes a low-level vector search. Thin wrapper around
/// `QdrantFacade::search` that adds logging and error propagation.
pub async fn search_by_vector(
    _cfg: &StoreConfig,
    client: &QdrantFacade,
    query_vector: Vec<f32>,
    top_k: u64,
    filter: Option<Filter>,
    with_payload: bool,
    exact: bool,
) -> Result<Vec<(f32, serde_json::Value)>, StoreError> {
    debug!(
        "search_by_vector: top_k={}, with_payload={}, exact={}",
        top_k, with_payload, exact
    );
    trace!("search_by_vector: query_vector_dim={}", query_vector.len());

    let res = client
        .search(query_vector, top_k, filter, with_payload, exact)
        .await?;

    debug!("search_by_vector: got {} hits", res.len());
    Ok(res)
}

/// Embeds `query.text`, searches the backing store, and rehydrates each hit
/// into a [`StoreHit`]. Points whose payload cannot be parsed back into the
/// chunk schema are logged and omitted rather than failing the whole call.
pub async fn retrieve(
    cfg: &StoreConfig,
    client: &QdrantFacade,
    query: StoreQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<StoreHit>, StoreError> {
    info!("retrieve: embedding query text, top_k={}", query.top_k);
    trace!("retrieve: raw query text={}", query.text);

    let qvec = provider.embed(query.text).await?;
    debug!("retrieve: query embedding length={}", qvec.len());

    let qfilter = query.filter.as_ref().map(crate::filters::to_qdrant_filter);

    let hits = client
        .search(qvec, query.top_k, qfilter, true, cfg.exact_search)
        .await?;

    if hits.is_empty() {
        warn!("retrieve: no hits found for query");
    } else {
        info!("retrieve: {} hits retrieved", hits.len());
    }

    let mut out = Vec::with_capacity(hits.len());
    for (score, payload) in hits {
        match extract_hit(&payload, score) {
            Some(hit) => out.push(hit),
            None => warn!("retrieve: skipping hit with unparseable payload"),
        }
    }

    info!("retrieve: {} hits rehydrated", out.len());
    Ok(out)
}

/// Rehydrates a point payload into a [`StoreHit`]. Returns `None` when the
/// mandatory fields (path, content, line bounds) are missing or malformed.
fn extract_hit(payload: &serde_json::Value, score: f32) -> Option<StoreHit> {
    let obj = payload.as_object()?;
    let path = obj.get("path")?.as_str()?.to_string();
    let content = obj.get("content")?.as_str()?.to_string();
    let start_line = obj.get("start_line")?.as_u64()? as usize;
    let end_line = obj.get("end_line")?.as_u64()? as usize;
    let index = obj.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as usize;

    let metadata = match obj.get("metadata") {
        Some(raw) => match serde_json::from_value::<ChunkMetadata>(raw.clone()) {
            Ok(m) => m,
            Err(e) => {
                warn!("retrieve: malformed metadata payload for {path}: {e}");
                ChunkMetadata::default()
            }
        },
        None => ChunkMetadata::default(),
    };

    Some(StoreHit {
        score,
        path,
        content,
        start_line,
        end_line,
        index,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_hit_requires_path_and_content() {
        let payload = serde_json::json!({"content": "x"});
        assert!(extract_hit(&payload, 0.9).is_none());
    }

    #[test]
    fn extract_hit_rehydrates_full_payload() {
        let payload = serde_json::json!({
            "path": "a.py",
            "content": "def f(): pass",
            "start_line": 0,
            "end_line": 1,
            "index": 2,
            "metadata": {"symbol_type": "function", "symbol_name": "f"}
        });
        let hit = extract_hit(&payload, 0.5).unwrap();
        assert_eq!(hit.path, "a.py");
        assert_eq!(hit.index, 2);
        assert_eq!(hit.metadata.symbol_name.as_deref(), Some("f"));
    }

    #[test]
    fn extract_hit_defaults_metadata_when_malformed() {
        let payload = serde_json::json!({
            "path": "a.py",
            "content": "x",
            "start_line": 0,
            "end_line": 0,
            "metadata": "not an object"
        });
        let hit = extract_hit(&payload, 0.1).unwrap();
        assert!(hit.metadata.symbol_name.is_none());
    }

    /// Exercises the real ingest -> qdrant -> retrieve path (not a hand-built
    /// payload): a non-trivial [`ChunkMetadata`] goes through `json_to_qvalue`,
    /// then `qpayload_to_json`, then `extract_hit`, and must come back equal.
    #[test]
    fn extract_hit_round_trips_real_metadata_through_qdrant_value_kinds() {
        let mut metadata = ChunkMetadata::default();
        metadata.symbol_type = Some(chunk_engine::SymbolType::Class);
        metadata.symbol_name = Some("Calculator".to_string());
        metadata.exports = vec!["Calculator".to_string()];
        metadata.imports = vec!["crate::ops::Add".to_string()];
        metadata
            .symbol_definitions
            .insert("add".to_string(), "line:4".to_string());

        let metadata_json = serde_json::to_value(&metadata).unwrap();

        let mut payload_map = std::collections::HashMap::new();
        payload_map.insert(
            "path".to_string(),
            crate::ingest::json_to_qvalue(serde_json::Value::String("calc.rs".to_string())),
        );
        payload_map.insert(
            "content".to_string(),
            crate::ingest::json_to_qvalue(serde_json::Value::String("struct Calculator;".to_string())),
        );
        payload_map.insert(
            "start_line".to_string(),
            crate::ingest::json_to_qvalue(serde_json::Value::Number(0.into())),
        );
        payload_map.insert(
            "end_line".to_string(),
            crate::ingest::json_to_qvalue(serde_json::Value::Number(3.into())),
        );
        payload_map.insert(
            "metadata".to_string(),
            crate::ingest::json_to_qvalue(metadata_json),
        );

        let payload = crate::qdrant_facade::qpayload_to_json(payload_map);
        let hit = extract_hit(&payload, 0.77).unwrap();

        assert_eq!(hit.path, "calc.rs");
        assert_eq!(hit.metadata, metadata);
    }
}

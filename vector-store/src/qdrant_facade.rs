//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`.

use crate::config::{DistanceKind, StoreConfig, VectorSpace};
use crate::errors::StoreError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder,
};
use tracing::{debug, info, warn};

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
///
/// This struct encapsulates:
/// - The underlying Qdrant client.
/// - The target collection name.
/// - The distance function used in the vector space.
pub struct QdrantFacade {
    pub(crate) client: Qdrant,
    pub(crate) collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the modern builder-based API of `qdrant-client` and supports
    /// optional API key authentication.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?; // Early validation of config.

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Store(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the given vector space configuration.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<(), StoreError> {
        info!(
            "Ensuring collection '{}' with size={} distance={:?}",
            self.collection, space.size, self.distance
        );

        // Try to fetch collection info first.
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Collection '{}' not found, will be created (error={})",
                    self.collection, err
                );
            }
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        // Create collection with vector configuration.
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| StoreError::Store(e.to_string()))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    /// Upserts (inserts or updates) a batch of points into the collection.
    ///
    /// Returns the number of points acknowledged by Qdrant.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, StoreError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        info!(
            "Upserting {} points into collection '{}'",
            points.len(),
            self.collection
        );

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| StoreError::Store(e.to_string()))?;

        debug!("Upsert operation result={:?}", res.result);

        Ok(res.result.and_then(|r| r.operation_id).unwrap_or(0))
    }

    /// Deletes every point matching `filter` from the collection.
    ///
    /// Used by the indexer to drop stale rows for a path before re-indexing
    /// or on explicit removal.
    pub async fn delete_by_filter(&self, filter: Filter) -> Result<(), StoreError> {
        info!("Deleting points in '{}' matching filter", self.collection);

        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(filter))
            .await
            .map_err(|e| StoreError::Store(e.to_string()))?;

        Ok(())
    }

    /// Performs a similarity search in Qdrant.
    ///
    /// Returns `(score, payload)` tuples with results sorted by score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
        with_payload: bool,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, StoreError> {
        info!(
            "Searching in '{}' with top_k={}, with_payload={}, exact={}",
            self.collection, top_k, with_payload, exact
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(with_payload);

        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| StoreError::Store(e.to_string()))?;

        // Convert raw Qdrant payloads into JSON.
        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let score = r.score;
            let payload_json = qpayload_to_json(r.payload);
            out.push((score, payload_json));
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

/// Converts a single Qdrant value into JSON, recursing into `Struct`/
/// `ListValue` kinds so a nested payload round-trips back into a real
/// object instead of opaque text.
fn qvalue_to_json(v: QValue) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => serde_json::Value::String(s),
        Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(K::NullValue(_)) => serde_json::Value::Null,
        Some(K::StructValue(s)) => {
            let mut m = serde_json::Map::new();
            for (k, v) in s.fields {
                m.insert(k, qvalue_to_json(v));
            }
            serde_json::Value::Object(m)
        }
        Some(K::ListValue(l)) => {
            serde_json::Value::Array(l.values.into_iter().map(qvalue_to_json).collect())
        }
        None => serde_json::Value::Null,
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
pub(crate) fn qpayload_to_json(p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        m.insert(k, qvalue_to_json(v));
    }
    serde_json::Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::json_to_qvalue;

    #[test]
    fn nested_metadata_round_trips_through_qdrant_value_kinds() {
        let original = serde_json::json!({
            "symbol_type": "class",
            "symbol_name": "Calculator",
            "symbol_definitions": {"add": "line:2"},
            "imports": ["os", "sys"],
            "extends": null,
            "references_to": [],
        });

        let mut payload = std::collections::HashMap::new();
        payload.insert("metadata".to_string(), json_to_qvalue(original.clone()));

        let round_tripped = qpayload_to_json(payload);
        assert_eq!(round_tripped.get("metadata"), Some(&original));
    }
}

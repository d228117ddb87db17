//! End-to-end ingestion pipeline: resolve vectors for a batch of chunk
//! records, then upsert them into the collection.

use crate::config::{StoreConfig, VectorSpace};
use crate::embed::EmbeddingPolicy;
use crate::errors::StoreError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::StoreRecord;

use qdrant_client::qdrant::{
    ListValue, PointId, PointStruct, Struct, Value as QValue, Vector, Vectors, point_id, value, vectors,
};
use std::collections::HashMap;
use tracing::trace;

/// Ingests a batch of records, computing embeddings for any that lack one
/// and upserting the result into the collection.
///
/// # Errors
/// Returns vector size mismatch or backing-store errors.
pub async fn ingest_records(
    cfg: &StoreConfig,
    client: &QdrantFacade,
    mut records: Vec<StoreRecord>,
    policy: EmbeddingPolicy<'_>,
) -> Result<usize, StoreError> {
    if records.is_empty() {
        trace!("ingest::ingest_records no records provided");
        return Ok(0);
    }

    let vector_size = determine_vector_size(&records, &policy).await?;
    trace!("ingest::ingest_records vector_size={vector_size}");

    client
        .ensure_collection(&VectorSpace {
            size: vector_size,
            distance: cfg.distance,
        })
        .await?;

    let mut total = 0usize;
    let batch_size = cfg.upsert_batch.max(1);
    for chunk in records.drain(..).collect::<Vec<_>>().chunks(batch_size) {
        let points = build_points(chunk, vector_size, &policy).await?;
        trace!("ingest::ingest_records upserting batch size={}", points.len());
        total += client.upsert_points(points).await? as usize;
    }

    trace!("ingest::ingest_records total_upserted={total}");
    Ok(total)
}

async fn determine_vector_size(
    records: &[StoreRecord],
    policy: &EmbeddingPolicy<'_>,
) -> Result<usize, StoreError> {
    if let Some(v) = records.iter().find_map(|r| r.embedding.as_ref()) {
        return Ok(v.len());
    }
    match policy {
        EmbeddingPolicy::PrecomputedOr(p) | EmbeddingPolicy::ProviderOnly(p) => {
            let v = p.embed(&records[0].content).await?;
            Ok(v.len())
        }
    }
}

async fn build_points(
    chunk: &[StoreRecord],
    vector_size: usize,
    policy: &EmbeddingPolicy<'_>,
) -> Result<Vec<PointStruct>, StoreError> {
    trace!("ingest::build_points chunk_size={}", chunk.len());
    let mut pts = Vec::with_capacity(chunk.len());

    for record in chunk {
        let vector = match (&record.embedding, policy) {
            (Some(v), _) => v.clone(),
            (None, EmbeddingPolicy::PrecomputedOr(p)) => p.embed(&record.content).await?,
            (None, EmbeddingPolicy::ProviderOnly(p)) => p.embed(&record.content).await?,
        };

        if vector.len() != vector_size {
            return Err(StoreError::VectorSizeMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }

        let metadata_json =
            serde_json::to_value(&record.metadata).map_err(|e| StoreError::Parse(e.to_string()))?;

        let mut payload_map: HashMap<String, QValue> = HashMap::new();
        payload_map.insert("path".into(), json_to_qvalue(serde_json::Value::String(record.path.clone())));
        payload_map.insert(
            "cachekey".into(),
            json_to_qvalue(serde_json::Value::String(record.cachekey.clone())),
        );
        payload_map.insert(
            "content".into(),
            json_to_qvalue(serde_json::Value::String(record.content.clone())),
        );
        payload_map.insert(
            "start_line".into(),
            json_to_qvalue(serde_json::Value::Number((record.start_line as i64).into())),
        );
        payload_map.insert(
            "end_line".into(),
            json_to_qvalue(serde_json::Value::Number((record.end_line as i64).into())),
        );
        payload_map.insert(
            "index".into(),
            json_to_qvalue(serde_json::Value::Number((record.index as i64).into())),
        );
        payload_map.insert("metadata".into(), json_to_qvalue(metadata_json));

        let vectors_wrapped = Vectors {
            vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
                data: vector,
                ..Default::default()
            })),
        };

        let uuid = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_URL, record.stable_id().as_bytes());
        let point_id = PointId {
            point_id_options: Some(point_id::PointIdOptions::Uuid(uuid.to_string())),
        };

        pts.push(PointStruct {
            id: Some(point_id),
            payload: payload_map,
            vectors: Some(vectors_wrapped),
            ..Default::default()
        });
    }

    Ok(pts)
}

/// Converts `serde_json::Value` into `qdrant::Value`, recursing into nested
/// objects/arrays as `Struct`/`ListValue` payload kinds rather than
/// stringifying them, so a round trip through the store yields back a real
/// object instead of opaque JSON text.
pub(crate) fn json_to_qvalue(v: serde_json::Value) -> QValue {
    use serde_json::Value as J;
    use value::Kind as K;

    match v {
        J::Null => QValue { kind: Some(K::NullValue(0)) },
        J::String(s) => QValue { kind: Some(K::StringValue(s)) },
        J::Number(n) => {
            if let Some(i) = n.as_i64() {
                QValue { kind: Some(K::IntegerValue(i)) }
            } else if let Some(f) = n.as_f64() {
                QValue { kind: Some(K::DoubleValue(f)) }
            } else {
                QValue { kind: Some(K::StringValue(n.to_string())) }
            }
        }
        J::Bool(b) => QValue { kind: Some(K::BoolValue(b)) },
        J::Array(items) => {
            let values = items.into_iter().map(json_to_qvalue).collect();
            QValue { kind: Some(K::ListValue(ListValue { values })) }
        }
        J::Object(map) => {
            let fields = map.into_iter().map(|(k, v)| (k, json_to_qvalue(v))).collect();
            QValue { kind: Some(K::StructValue(Struct { fields })) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunk_engine::ChunkMetadata;

    fn record(path: &str, index: usize) -> StoreRecord {
        StoreRecord {
            path: path.to_string(),
            cachekey: "digest".to_string(),
            content: "def f(): pass".to_string(),
            start_line: 0,
            end_line: 0,
            index,
            metadata: ChunkMetadata::default(),
            embedding: Some(vec![0.1, 0.2, 0.3]),
        }
    }

    #[test]
    fn stable_id_sanitizes_path_separators() {
        let r = record("src/a/b.py", 2);
        assert_eq!(r.stable_id(), "src_a_b.py_0_0_2");
    }

    #[tokio::test]
    async fn determine_vector_size_prefers_precomputed_embedding() {
        let records = vec![record("a.py", 0)];
        let provider = crate::embed::noop_embedder::NoopEmbedder;
        let policy = EmbeddingPolicy::PrecomputedOr(&provider);
        let size = determine_vector_size(&records, &policy).await.unwrap();
        assert_eq!(size, 3);
    }
}

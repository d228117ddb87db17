//! Batch orchestration over a `RefreshPlan`: chunk, embed, and upsert changed
//! files into a [`vector_store::VectorStore`], then run the cross-file
//! resolver over everything that was (re)computed this batch.
//!
//! Per-file atomicity: all chunks of one file are buffered and upserted in a
//! single call, so a cancelled (dropped) future never issues a partial write.

pub mod errors;
pub mod plan;
pub mod progress;
pub mod retriever;

pub use errors::IndexError;
pub use plan::{IndexResultKind, PathAndCacheKey, RefreshPlan};
pub use progress::{IndexingProgress, ProgressStatus};
pub use retriever::retrieve_with_timeout;

use std::path::{Path, PathBuf};

use chunk_engine::{Chunk, SourceFile};
use tracing::{debug, info, instrument, warn};
use vector_store::{EmbeddingPolicy, EmbeddingsProvider, StoreRecord, VectorStore};

/// Orchestrates chunking, embedding, and upserting of a project's files into
/// a vector store, following the three-bucket refresh plan contract.
pub struct Indexer<'a> {
    base: Option<PathBuf>,
    max_chunk_size: usize,
    store: VectorStore,
    provider: &'a dyn EmbeddingsProvider,
}

impl<'a> Indexer<'a> {
    /// Builds an indexer rooted at an optional `base` directory. When `base`
    /// is set, stored paths are relativized against it; paths outside the
    /// base are kept absolute.
    pub fn new(
        base: Option<PathBuf>,
        max_chunk_size: usize,
        store: VectorStore,
        provider: &'a dyn EmbeddingsProvider,
    ) -> Self {
        Self {
            base,
            max_chunk_size,
            store,
            provider,
        }
    }

    fn relativize(&self, path: &Path) -> String {
        relativize_against(self.base.as_deref(), path)
    }

    /// Embeds `query`, searches the store, and rehydrates hits with absolute
    /// paths when a base is configured. Never fails: on timeout or error the
    /// result is an empty list (see [`retriever::retrieve_with_timeout`]).
    pub async fn retrieve(
        &self,
        query: vector_store::StoreQuery<'_>,
        timeout: std::time::Duration,
    ) -> Vec<vector_store::StoreHit> {
        let mut hits = retriever::retrieve_with_timeout(&self.store, query, self.provider, timeout).await;
        if let Some(base) = &self.base {
            for hit in &mut hits {
                let joined = base.join(&hit.path);
                hit.path = joined.to_string_lossy().replace('\\', "/");
            }
        }
        hits
    }

    /// Runs one batch to completion, invoking `on_progress` once per file as
    /// each bucket item finishes, and returns the full progress log.
    ///
    /// # Errors
    /// Only configuration-level failures (none here, since the store is
    /// already constructed) or `IndexError::Cancelled` surface here;
    /// per-file parse/storage errors are caught, logged, and reported as an
    /// `error` progress record while the batch continues.
    #[instrument(skip(self, plan, on_progress))]
    pub async fn run_batch(
        &self,
        plan: &RefreshPlan,
        mut on_progress: impl FnMut(IndexingProgress),
    ) -> Result<Vec<IndexingProgress>, IndexError> {
        let total = plan.compute.len() + plan.add_tag.len() + plan.delete.len();
        info!(
            "Indexer::run_batch compute={} add_tag={} delete={} total={total}",
            plan.compute.len(),
            plan.add_tag.len(),
            plan.delete.len()
        );

        let mut log = Vec::with_capacity(total);
        let mut done = 0usize;
        let mut accumulated: Vec<Chunk> = Vec::new();

        for item in &plan.compute {
            let progress = self.run_compute(item, &mut accumulated).await;
            done += 1;
            let record = progress_record(&item.path, progress, total, done, IndexResultKind::Compute);
            on_progress(record.clone());
            log.push(record);
        }

        if !accumulated.is_empty() {
            self.resolve_and_persist(&mut accumulated).await;
        }

        for item in &plan.add_tag {
            debug!("add_tag: relinking {}", item.path);
            done += 1;
            let record = IndexingProgress::new(
                item.path.clone(),
                ProgressStatus::Success,
                done as f32 / total.max(1) as f32,
                IndexResultKind::AddTag,
            );
            on_progress(record.clone());
            log.push(record);
        }

        for item in &plan.delete {
            let status = match self.store.delete_by_path(&item.path).await {
                Ok(()) => ProgressStatus::Success,
                Err(e) => {
                    warn!("delete failed for {}: {e}", item.path);
                    ProgressStatus::Error
                }
            };
            done += 1;
            let record = IndexingProgress::new(
                item.path.clone(),
                status,
                done as f32 / total.max(1) as f32,
                IndexResultKind::Delete,
            );
            on_progress(record.clone());
            log.push(record);
        }

        info!("Indexer::run_batch finished, {} progress records", log.len());
        Ok(log)
    }

    /// Reads, chunks, embeds, and upserts one `compute` file. Returns
    /// `Ok(())` on success or `Err` with a message suitable for a progress
    /// record; never propagates, so one bad file cannot halt the batch.
    async fn run_compute(
        &self,
        item: &PathAndCacheKey,
        accumulated: &mut Vec<Chunk>,
    ) -> Result<(), String> {
        let path = Path::new(&item.path);
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;

        if !chunk_engine::chunker::should_chunk(&content) {
            debug!("skipping empty/whitespace file {}", item.path);
            return Ok(());
        }

        let source = SourceFile {
            filepath: self.relativize(path),
            content,
            digest: item.cache_key.clone(),
        };

        let chunks = chunk_engine::chunker::chunk_document(&source, self.max_chunk_size)
            .map_err(|e| e.to_string())?;

        if chunks.is_empty() {
            return Ok(());
        }

        let records: Vec<StoreRecord> = chunks
            .iter()
            .cloned()
            .map(StoreRecord::from_chunk)
            .collect();

        self.store
            .ingest(records, EmbeddingPolicy::ProviderOnly(self.provider))
            .await
            .map_err(|e| e.to_string())?;

        accumulated.extend(chunks);
        Ok(())
    }

    /// Pass 2: back-fills cross-file relational metadata over every chunk
    /// accumulated this batch, then re-embeds and re-upserts so the stored
    /// payload reflects the updated metadata.
    async fn resolve_and_persist(&self, chunks: &mut Vec<Chunk>) {
        info!("resolving cross-file metadata over {} chunks", chunks.len());
        chunk_engine::resolver::resolve_cross_file(chunks);

        let records: Vec<StoreRecord> = chunks.iter().cloned().map(StoreRecord::from_chunk).collect();
        if let Err(e) = self
            .store
            .ingest(records, EmbeddingPolicy::ProviderOnly(self.provider))
            .await
        {
            warn!("resolver re-upsert failed: {e}");
        }
    }
}

/// Relativizes `path` against `base` when one is configured; paths outside
/// the base (or with no base at all) are kept as-is, `\`-normalized to `/`.
fn relativize_against(base: Option<&Path>, path: &Path) -> String {
    match base {
        Some(base) => pathdiff::diff_paths(path, base)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .replace('\\', "/"),
        None => path.to_string_lossy().replace('\\', "/"),
    }
}

fn progress_record(
    path: &str,
    result: Result<(), String>,
    total: usize,
    done: usize,
    kind: IndexResultKind,
) -> IndexingProgress {
    let fraction = done as f32 / total.max(1) as f32;
    match result {
        Ok(()) => IndexingProgress::new(path.to_string(), ProgressStatus::Success, fraction, kind),
        Err(msg) => {
            warn!("compute failed for {path}: {msg}");
            IndexingProgress::new(format!("{path}: {msg}"), ProgressStatus::Error, fraction, kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relativize_strips_the_base_prefix() {
        let result = relativize_against(Some(Path::new("/proj")), Path::new("/proj/src/a.py"));
        assert_eq!(result, "src/a.py");
    }

    #[test]
    fn relativize_keeps_absolute_path_with_no_base() {
        let result = relativize_against(None, Path::new("/proj/src/a.py"));
        assert_eq!(result, "/proj/src/a.py");
    }

    #[test]
    fn progress_record_reports_error_status_on_failure() {
        let record = progress_record("a.py", Err("boom".into()), 2, 1, IndexResultKind::Compute);
        assert_eq!(record.status, ProgressStatus::Error);
        assert!(record.desc.contains("boom"));
    }

    #[test]
    fn progress_record_reports_success_status() {
        let record = progress_record("a.py", Ok(()), 2, 1, IndexResultKind::Compute);
        assert_eq!(record.status, ProgressStatus::Success);
        assert_eq!(record.desc, "a.py");
    }
}

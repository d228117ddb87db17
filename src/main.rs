//! Demonstration CLI: chunk and index a project directory, then run one
//! retrieval query against it.
//!
//! Configuration is read entirely from the environment here; the library
//! crates themselves take plain constructor arguments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexer::{Indexer, PathAndCacheKey, RefreshPlan};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vector_store::{OllamaConfig, OllamaEmbedder, StoreConfig, StoreQuery, VectorStore};

fn sha256_hex(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn build_plan(root: &Path) -> RefreshPlan {
    let mut plan = RefreshPlan::default();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        plan.compute.push(PathAndCacheKey::new(
            path.to_string_lossy().to_string(),
            sha256_hex(&content),
        ));
    }
    plan
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root: PathBuf = std::env::var("PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    let max_chunk_size: usize = std::env::var("MAX_CHUNK_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(chunk_engine::DEFAULT_MAX_CHUNK_SIZE);

    let store_cfg = StoreConfig::from_env()?;
    let store = VectorStore::new(store_cfg)?;

    let ollama_cfg = OllamaConfig {
        url: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
        model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "nomic-embed-text".into()),
        dim: std::env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(384),
    };
    let provider = OllamaEmbedder::new(ollama_cfg);

    let indexer = Indexer::new(Some(root.clone()), max_chunk_size, store, &provider);

    let plan = build_plan(&root);
    info!("indexing {} files under {}", plan.compute.len(), root.display());

    let log = indexer
        .run_batch(&plan, |p| info!(status = p.status.as_str(), desc = %p.desc, "progress"))
        .await?;
    let errors = log.iter().filter(|p| p.status == indexer::ProgressStatus::Error).count();
    if errors > 0 {
        error!("{errors} files failed during indexing");
    }

    if let Ok(query_text) = std::env::var("DEMO_QUERY") {
        let hits = indexer
            .retrieve(
                StoreQuery {
                    text: &query_text,
                    top_k: 5,
                    filter: None,
                },
                Duration::from_secs(5),
            )
            .await;
        for hit in hits {
            println!("{}:{}-{} (score={:.3})", hit.path, hit.start_line, hit.end_line, hit.score);
        }
    }

    Ok(())
}

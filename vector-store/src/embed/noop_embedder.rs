use crate::{EmbeddingsProvider, StoreError};
use std::{future::Future, pin::Pin};

#[derive(Clone)]
pub struct NoopEmbedder;

impl EmbeddingsProvider for NoopEmbedder {
    fn embed<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>> {
        Box::pin(async { Err(StoreError::MissingEmbedding) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_errors() {
        let result = NoopEmbedder.embed("anything").await;
        assert!(matches!(result, Err(StoreError::MissingEmbedding)));
    }
}

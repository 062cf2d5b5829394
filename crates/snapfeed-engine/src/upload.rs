//! Image upload pipeline: store the blob, then resolve its durable URL.

use std::sync::Arc;

use uuid::Uuid;

use snapfeed_core::DomainError;

use crate::context::EngineContext;

const CONTEXT: &str = "Image upload failed";

pub(crate) struct ImageUploader {
    ctx: Arc<EngineContext>,
}

impl ImageUploader {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Upload `blob` under a fresh key and return its retrieval URL.
    ///
    /// Only a fully resolved URL is ever returned, so callers can write it
    /// into documents without checking upload state.
    pub(crate) async fn upload(&self, blob: Vec<u8>) -> Result<String, DomainError> {
        let _progress = self.ctx.state.in_progress.begin();
        let key = format!("{}/{}", self.ctx.config.image_prefix, Uuid::new_v4());

        let stored = self
            .ctx
            .blobs
            .upload(&key, blob)
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;

        let url = self
            .ctx
            .blobs
            .resolve_url(&stored)
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;

        tracing::debug!(key = %stored.key, size = stored.size, "Image uploaded");
        Ok(url)
    }
}

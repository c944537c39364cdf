use async_trait::async_trait;
use std::path::Path;

/// Capability seam for the external image labeling service.
///
/// Callers never distinguish "not configured" from "errored": both present
/// as an unavailable provider or an empty tag list.
#[async_trait]
pub trait LabelProvider: Send + Sync {
    /// Whether a remote client was configured and initialized
    fn is_available(&self) -> bool;

    /// Derive tags for an image. Returns an empty list when unavailable or
    /// on any remote failure; never errors.
    async fn analyze_image(&self, path: &Path) -> Vec<String>;
}

/// Provider used when no external service is configured
pub struct NoopLabelProvider;

#[async_trait]
impl LabelProvider for NoopLabelProvider {
    fn is_available(&self) -> bool {
        false
    }

    async fn analyze_image(&self, _path: &Path) -> Vec<String> {
        Vec::new()
    }
}

use crate::category::Category;
use crate::models::AnalysisContext;
use async_trait::async_trait;

/// Category-specific heuristic tag extractor.
///
/// Analyzers never fail at this boundary: unreadable or corrupt content
/// degrades to a category-appropriate fallback list, and the request as a
/// whole proceeds.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Category this analyzer handles
    fn category(&self) -> Category;

    /// Derive raw candidate tags for a file
    async fn analyze(&self, ctx: &AnalysisContext) -> Vec<String>;
}

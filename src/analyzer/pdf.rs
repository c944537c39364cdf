use crate::analyzer::ContentAnalyzer;
use crate::category::Category;
use crate::models::AnalysisContext;
use crate::rules::RuleSet;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lopdf::Document;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Number of leading pages sampled for keyword scanning
const SAMPLE_PAGES: usize = 3;

/// Word count above which a document counts as text-heavy
const TEXT_HEAVY_WORDS: usize = 1000;

/// PDF/document analyzer: page-count tiers plus keyword classification of a
/// text sample from the leading pages
pub struct PdfAnalyzer {
    rules: Arc<RuleSet>,
}

impl PdfAnalyzer {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    fn local_tags(rules: &RuleSet, path: &Path) -> Result<Vec<String>> {
        let doc = Document::load(path)
            .with_context(|| format!("Failed to load PDF: {}", path.display()))?;
        let pages = doc.get_pages();
        let num_pages = pages.len();

        let mut tags = vec!["pdf".to_string(), "document".to_string()];

        if num_pages <= 3 {
            tags.extend(["single-page".to_string(), "flyer".to_string()]);
        } else if num_pages <= 5 {
            tags.extend(["short-document".to_string(), "brief".to_string()]);
        } else if num_pages <= 20 {
            tags.extend(["medium-document".to_string(), "report".to_string()]);
        } else {
            tags.extend([
                "long-document".to_string(),
                "book".to_string(),
                "manual".to_string(),
            ]);
        }

        let mut sample = String::new();
        for page_num in pages.keys().take(SAMPLE_PAGES) {
            if let Ok(page_text) = doc.extract_text(&[*page_num]) {
                sample.push_str(&page_text);
                sample.push('\n');
            }
        }
        if sample.trim().is_empty() {
            // Fallback extractor when lopdf yields no text
            if let Ok(text) = pdf_extract::extract_text(path) {
                sample = text;
            }
        }
        let sample = sample.to_lowercase();

        if !sample.trim().is_empty() {
            if sample.split_whitespace().count() > TEXT_HEAVY_WORDS {
                tags.push("text-heavy".to_string());
            }

            // Every matching keyword category is added, not just the first
            for &(category, keywords) in rules.pdf_keywords {
                if keywords.iter().any(|k| sample.contains(k)) {
                    tags.push(category.to_string());
                }
            }
        }

        Ok(tags)
    }

    fn fallback() -> Vec<String> {
        vec!["pdf".to_string(), "document".to_string(), "error".to_string()]
    }
}

#[async_trait]
impl ContentAnalyzer for PdfAnalyzer {
    fn category(&self) -> Category {
        Category::Document
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Vec<String> {
        let rules = Arc::clone(&self.rules);
        let path = ctx.path.clone();

        match tokio::task::spawn_blocking(move || Self::local_tags(&rules, &path)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                warn!("pdf analysis failed for {}: {e:#}", ctx.path.display());
                Self::fallback()
            }
            Err(e) => {
                warn!("pdf analysis task failed for {}: {e}", ctx.path.display());
                Self::fallback()
            }
        }
    }
}

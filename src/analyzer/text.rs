use crate::analyzer::ContentAnalyzer;
use crate::category::Category;
use crate::models::AnalysisContext;
use crate::rules::RuleSet;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Byte cap on the sampled content
const SAMPLE_BYTES: usize = 10_000;

/// Line count above which the file counts as large
const LARGE_FILE_LINES: usize = 100;

/// Text/code analyzer driven by the ordered extension rule table
pub struct TextAnalyzer {
    rules: Arc<RuleSet>,
}

impl TextAnalyzer {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    fn local_tags(rules: &RuleSet, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?;
        let sample_len = bytes.len().min(SAMPLE_BYTES);
        let content = String::from_utf8_lossy(&bytes[..sample_len]);

        let mut tags = vec!["text".to_string()];

        // First matching rule wins; later rules are not consulted
        if let Some(ext) = crate::utils::get_extension(path) {
            if let Some(rule) = rules
                .text_rules
                .iter()
                .find(|rule| rule.extensions.contains(&ext.as_str()))
            {
                tags.extend(rule.tags.iter().map(|t| t.to_string()));
                if let Some(probe) = rule.probe {
                    tags.extend(probe(&content).into_iter().map(str::to_string));
                }
            }
        }

        if content.matches('\n').count() > LARGE_FILE_LINES {
            tags.push("large-file".to_string());
        }

        Ok(tags)
    }

    fn fallback() -> Vec<String> {
        vec!["text".to_string(), "error".to_string()]
    }
}

#[async_trait]
impl ContentAnalyzer for TextAnalyzer {
    fn category(&self) -> Category {
        Category::Text
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Vec<String> {
        let rules = Arc::clone(&self.rules);
        let path = ctx.path.clone();

        match tokio::task::spawn_blocking(move || Self::local_tags(&rules, &path)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                warn!("text analysis failed for {}: {e:#}", ctx.path.display());
                Self::fallback()
            }
            Err(e) => {
                warn!("text analysis task failed for {}: {e}", ctx.path.display());
                Self::fallback()
            }
        }
    }
}

use crate::analyzer::ContentAnalyzer;
use crate::category::Category;
use crate::models::AnalysisContext;
use crate::rules::RuleSet;
use async_trait::async_trait;

/// Audio/video analyzer: a pure extension lookup against the category's
/// table, no file I/O
pub struct MediaAnalyzer {
    category: Category,
    table: &'static [(&'static str, &'static [&'static str])],
}

impl MediaAnalyzer {
    pub fn video(rules: &RuleSet) -> Self {
        Self {
            category: Category::Video,
            table: rules.video_extensions,
        }
    }

    pub fn audio(rules: &RuleSet) -> Self {
        Self {
            category: Category::Audio,
            table: rules.audio_extensions,
        }
    }
}

#[async_trait]
impl ContentAnalyzer for MediaAnalyzer {
    fn category(&self) -> Category {
        self.category
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Vec<String> {
        let mut tags = vec![self.category.as_str().to_string(), "media".to_string()];

        if let Some(ext) = ctx.extension() {
            if let Some(&(_, extras)) = self.table.iter().find(|(e, _)| *e == ext) {
                tags.extend(extras.iter().map(|t| t.to_string()));
            }
        }

        tags
    }
}

use crate::analyzer::{
    ContentAnalyzer, ImageAnalyzer, MediaAnalyzer, PdfAnalyzer, TextAnalyzer,
};
use crate::category::{categorize, Category};
use crate::config::Config;
use crate::models::{AnalysisContext, FileRecord};
use crate::rules::RuleSet;
use crate::tagger::TagProcessor;
use crate::vision::{LabelProvider, VisionService};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// End-to-end classification pipeline: category resolution, local content
/// analysis, optional label augmentation, and tag normalization.
///
/// Built once at startup; all state is read-only afterwards, so one
/// processor serves concurrent requests.
pub struct FileProcessor {
    rules: Arc<RuleSet>,
    tags: TagProcessor,
    analyzers: Vec<Arc<dyn ContentAnalyzer>>,
    min_confidence: f32,
    max_tags: usize,
}

impl FileProcessor {
    pub fn new(config: &Config) -> Self {
        let rules = Arc::new(RuleSet::default());
        let vision: Arc<dyn LabelProvider> =
            Arc::new(VisionService::new(config, Arc::clone(&rules)));
        Self::assemble(config, rules, vision)
    }

    /// Build with an explicit label provider instead of the configured one
    pub fn with_label_provider(config: &Config, vision: Arc<dyn LabelProvider>) -> Self {
        Self::assemble(config, Arc::new(RuleSet::default()), vision)
    }

    fn assemble(config: &Config, rules: Arc<RuleSet>, vision: Arc<dyn LabelProvider>) -> Self {
        let analyzers: Vec<Arc<dyn ContentAnalyzer>> = vec![
            Arc::new(ImageAnalyzer::new(vision)),
            Arc::new(PdfAnalyzer::new(Arc::clone(&rules))),
            Arc::new(TextAnalyzer::new(Arc::clone(&rules))),
            Arc::new(MediaAnalyzer::video(&rules)),
            Arc::new(MediaAnalyzer::audio(&rules)),
        ];

        Self {
            tags: TagProcessor::new(Arc::clone(&rules), config.tagging.max_tags),
            rules,
            analyzers,
            min_confidence: config.tagging.min_confidence,
            max_tags: config.tagging.max_tags,
        }
    }

    /// Resolve a media type to a category
    pub fn categorize(&self, media_type: &str) -> Category {
        categorize(&self.rules, media_type)
    }

    /// The tag processor, for merging user-supplied tags into an existing
    /// set
    pub fn tag_processor(&self) -> &TagProcessor {
        &self.tags
    }

    /// Run the category's analyzer and return the raw, unnormalized tag
    /// candidates. Categories without an analyzer yield just the category
    /// name.
    pub async fn analyze(&self, path: &Path, media_type: &str) -> Vec<String> {
        let category = self.categorize(media_type);
        let ctx = AnalysisContext::new(
            path.to_path_buf(),
            media_type.to_string(),
            category,
            self.min_confidence,
            self.max_tags,
        );

        match self
            .analyzers
            .iter()
            .find(|analyzer| analyzer.category() == category)
        {
            Some(analyzer) => analyzer.analyze(&ctx).await,
            None => vec![category.as_str().to_string()],
        }
    }

    /// Classify and tag one file, returning the record handed to storage
    pub async fn process_file(&self, path: &Path, media_type: &str) -> FileRecord {
        let raw = self.analyze(path, media_type).await;
        let tags = self.tags.process(&raw);
        FileRecord::new(path, media_type, self.categorize(media_type), tags)
    }

    /// Classify and tag many files, one at a time, in input order
    pub async fn process_batch(&self, files: &[(PathBuf, String)]) -> Vec<FileRecord> {
        let mut records = Vec::with_capacity(files.len());
        for (path, media_type) in files {
            records.push(self.process_file(path, media_type).await);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    struct StubProvider {
        tags: Vec<String>,
    }

    #[async_trait]
    impl LabelProvider for StubProvider {
        fn is_available(&self) -> bool {
            true
        }

        async fn analyze_image(&self, _path: &Path) -> Vec<String> {
            self.tags.clone()
        }
    }

    fn processor() -> FileProcessor {
        FileProcessor::new(&Config::default())
    }

    #[tokio::test]
    async fn test_image_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        RgbImage::from_pixel(200, 100, Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let record = processor().process_file(&path, "image/png").await;

        assert_eq!(record.category, Category::Image);
        assert_eq!(record.filename, "photo.png");
        // "image" carries the highest priority and sorts first
        assert_eq!(record.tags[0], "image");
        assert!(record.tags.contains(&"png".to_string()));
        assert!(record.tags.contains(&"landscape".to_string()));
        assert!(record.tags.len() <= 15);
    }

    #[tokio::test]
    async fn test_text_end_to_end_normalizes_code_tag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tool.py");
        std::fs::write(&path, "import sys\ndef run():\n    pass\n").unwrap();

        let record = processor().process_file(&path, "text/x-python").await;

        assert_eq!(record.category, Category::Text);
        // "code" and "script" both normalize to "programming"
        assert!(record.tags.contains(&"programming".to_string()));
        assert!(!record.tags.contains(&"code".to_string()));
        assert!(record.tags.contains(&"python".to_string()));
    }

    #[tokio::test]
    async fn test_category_without_analyzer_yields_category_tag() {
        let record = processor()
            .process_file(Path::new("/uploads/sheet.xlsx"), "application/vnd.ms-excel")
            .await;
        assert_eq!(record.category, Category::Spreadsheet);
        assert_eq!(record.tags, vec!["spreadsheet".to_string()]);
    }

    #[tokio::test]
    async fn test_other_category_filters_to_empty() {
        // "other" is a stop tag, so unrecognized files end with no tags
        let record = processor()
            .process_file(Path::new("/uploads/blob"), "application/octet-stream")
            .await;
        assert_eq!(record.category, Category::Other);
        assert!(record.tags.is_empty());
    }

    #[tokio::test]
    async fn test_augmenter_tags_flow_through_normalization() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        RgbImage::from_pixel(100, 100, Rgb([0, 0, 255]))
            .save(&path)
            .unwrap();

        let processor = FileProcessor::with_label_provider(
            &Config::default(),
            Arc::new(StubProvider {
                tags: vec!["Beach".to_string(), "unknown".to_string()],
            }),
        );
        let record = processor.process_file(&path, "image/png").await;

        assert!(record.tags.contains(&"beach".to_string()));
        // Stop tags from the augmenter are filtered like any other
        assert!(!record.tags.contains(&"unknown".to_string()));
    }

    #[tokio::test]
    async fn test_media_end_to_end() {
        let record = processor()
            .process_file(Path::new("/uploads/clip.mp4"), "video/mp4")
            .await;
        assert_eq!(record.category, Category::Video);
        assert_eq!(record.tags[0], "video");
        assert!(record.tags.contains(&"mp4".to_string()));
        assert!(record.tags.contains(&"h264".to_string()));
    }

    #[tokio::test]
    async fn test_process_batch_keeps_input_order() {
        let files = vec![
            (PathBuf::from("/uploads/a.mp4"), "video/mp4".to_string()),
            (PathBuf::from("/uploads/b.mp3"), "audio/mpeg".to_string()),
        ];
        let records = processor().process_batch(&files).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, Category::Video);
        assert_eq!(records[1].category, Category::Audio);
    }

    #[tokio::test]
    async fn test_merge_custom_tags_via_tag_processor() {
        let p = processor();
        let existing = vec!["image".to_string(), "jpeg".to_string()];
        let custom = vec!["Vacation".to_string()];
        let merged = p.tag_processor().merge(&[&existing, &custom]);

        assert_eq!(merged[0], "image");
        assert!(merged.contains(&"vacation".to_string()));
    }
}

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inputs to one analysis run. Created per request from the stored file
/// path, the declared media type, and startup configuration; discarded once
/// the pipeline returns.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Path to the stored file (already validated by the upload collaborator)
    pub path: PathBuf,
    /// Declared media type
    pub media_type: String,
    /// Category resolved from the media type
    pub category: Category,
    /// Minimum confidence for external labels
    pub min_confidence: f32,
    /// Upper bound on the final tag list
    pub max_tags: usize,
}

impl AnalysisContext {
    pub fn new(
        path: PathBuf,
        media_type: String,
        category: Category,
        min_confidence: f32,
        max_tags: usize,
    ) -> Self {
        Self {
            path,
            media_type,
            category,
            min_confidence,
            max_tags,
        }
    }

    /// Lower-cased file extension, without the dot
    pub fn extension(&self) -> Option<String> {
        crate::utils::get_extension(&self.path)
    }

    /// File name component of the path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The classification result handed to the storage collaborator. Tags
/// round-trip as an ordered string list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub filename: String,
    pub path: PathBuf,
    pub media_type: String,
    pub category: Category,
    pub tags: Vec<String>,
}

impl FileRecord {
    pub fn new(path: &Path, media_type: &str, category: Category, tags: Vec<String>) -> Self {
        Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            media_type: media_type.to_string(),
            category,
            tags,
        }
    }
}

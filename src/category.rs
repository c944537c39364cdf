use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a file, derived from its media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Video,
    Audio,
    Document,
    Spreadsheet,
    Archive,
    Text,
    Code,
    Other,
}

impl Category {
    /// Lower-case name of the category, usable directly as a tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Document => "document",
            Category::Spreadsheet => "spreadsheet",
            Category::Archive => "archive",
            Category::Text => "text",
            Category::Code => "code",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a media type to a category.
///
/// Exact entries win over prefix entries, and prefix entries are scanned in
/// declaration order (first match wins). Unresolved input yields
/// `Category::Other`; this function never fails.
pub fn categorize(rules: &RuleSet, media_type: &str) -> Category {
    if let Some(&(_, category)) = rules
        .mime_exact
        .iter()
        .find(|(mime, _)| *mime == media_type)
    {
        return category;
    }

    for &(prefix, category) in rules.mime_prefixes {
        if media_type.starts_with(prefix) {
            return category;
        }
    }

    Category::Other
}

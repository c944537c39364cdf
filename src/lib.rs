pub mod analyzer;
pub mod category;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod tagger;
pub mod utils;
pub mod vision;

pub use analyzer::ContentAnalyzer;
pub use category::{categorize, Category};
pub use config::Config;
pub use models::{AnalysisContext, FileRecord};
pub use pipeline::FileProcessor;
pub use rules::RuleSet;
pub use tagger::TagProcessor;
pub use vision::{LabelProvider, NoopLabelProvider, VisionService};

pub mod image;
pub mod media;
pub mod pdf;
pub mod text;
pub mod r#trait;

pub use image::ImageAnalyzer;
pub use media::MediaAnalyzer;
pub use pdf::PdfAnalyzer;
pub use r#trait::ContentAnalyzer;
pub use text::TextAnalyzer;

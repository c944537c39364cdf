use crate::analyzer::ContentAnalyzer;
use crate::category::Category;
use crate::models::AnalysisContext;
use crate::vision::LabelProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Pixel counts for the resolution tiers
const PIXELS_4K: u64 = 3840 * 2160;
const PIXELS_HD: u64 = 1920 * 1080;
const PIXELS_SD: u64 = 800 * 600;

/// Image analyzer: local decode plus optional external label augmentation.
///
/// Local tags always come first and never depend on the augmenter's
/// outcome; augmenter tags are appended verbatim when the provider reports
/// itself available.
pub struct ImageAnalyzer {
    vision: Arc<dyn LabelProvider>,
}

impl ImageAnalyzer {
    pub fn new(vision: Arc<dyn LabelProvider>) -> Self {
        Self { vision }
    }

    fn local_tags(path: &Path) -> Result<Vec<String>> {
        let reader = image::ImageReader::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to probe image format: {}", path.display()))?;
        let format = reader.format();
        let img = reader
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))?;

        let mut tags = vec!["image".to_string()];
        if let Some(ext) = format.and_then(|f| f.extensions_str().first()) {
            tags.push((*ext).to_string());
        }

        let (width, height) = (img.width(), img.height());

        // Orientation buckets; ratios in the gaps add no tag
        let ratio = if height == 0 {
            1.0
        } else {
            f64::from(width) / f64::from(height)
        };
        if (0.9..=1.1).contains(&ratio) {
            tags.extend(["square".to_string(), "balanced".to_string()]);
        } else if ratio > 1.5 {
            tags.extend(["landscape".to_string(), "wide".to_string()]);
        } else if ratio < 0.7 {
            tags.extend(["portrait".to_string(), "vertical".to_string()]);
        }

        let pixels = u64::from(width) * u64::from(height);
        if pixels >= PIXELS_4K {
            tags.extend(["4k".to_string(), "ultra-hd".to_string()]);
        } else if pixels >= PIXELS_HD {
            tags.extend(["high resolution".to_string(), "hd".to_string()]);
        } else if pixels >= PIXELS_SD {
            tags.extend(["low resolution".to_string(), "sd".to_string()]);
        }

        match img.color() {
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => {
                tags.push("color".to_string());
            }
            ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                tags.extend(["grayscale".to_string(), "black-white".to_string()]);
            }
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => {
                tags.extend(["color".to_string(), "transparent".to_string()]);
            }
            _ => {}
        }

        Self::dominant_color(&img, &mut tags);

        Ok(tags)
    }

    /// Downsample to a single pixel and bucket its RGB into one of a few
    /// named tags; unmatched pixels add nothing
    fn dominant_color(img: &DynamicImage, tags: &mut Vec<String>) {
        let pixel = img.resize_exact(1, 1, FilterType::Triangle).to_rgb8();
        let [r, g, b] = pixel.get_pixel(0, 0).0;

        if r > 200 && g < 100 && b < 100 {
            tags.push("red".to_string());
        } else if r < 100 && g > 200 && b < 100 {
            tags.push("green".to_string());
        } else if r < 100 && g < 100 && b > 200 {
            tags.push("blue".to_string());
        } else if r > 200 && g > 200 && b > 200 {
            tags.push("bright".to_string());
        } else if r < 50 && g < 50 && b < 50 {
            tags.push("dark".to_string());
        }
    }

    fn fallback() -> Vec<String> {
        vec!["image".to_string(), "unknown".to_string()]
    }
}

#[async_trait]
impl ContentAnalyzer for ImageAnalyzer {
    fn category(&self) -> Category {
        Category::Image
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> Vec<String> {
        let path = ctx.path.clone();
        let mut tags = match tokio::task::spawn_blocking(move || Self::local_tags(&path)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                warn!("image analysis failed for {}: {e:#}", ctx.path.display());
                return Self::fallback();
            }
            Err(e) => {
                warn!("image analysis task failed for {}: {e}", ctx.path.display());
                return Self::fallback();
            }
        };

        // Augmenter failures contribute zero tags; local tags stand either way
        if self.vision.is_available() {
            tags.extend(self.vision.analyze_image(&ctx.path).await);
        }

        tags
    }
}

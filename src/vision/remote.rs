use crate::config::Config;
use crate::rules::RuleSet;
use crate::vision::LabelProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Document keywords searched in the first detected text block
const DOC_KEYWORDS: &[(&str, &str)] = &[
    ("invoice", "invoice"),
    ("receipt", "receipt"),
    ("contract", "contract"),
    ("certificate", "certificate"),
    ("diploma", "diploma"),
];

/// Likelihood level at which content counts as safe
const SAFE_LEVEL: &str = "VERY_UNLIKELY";

/// Label provider backed by a Vision-style `images:annotate` REST endpoint.
///
/// One call runs four sub-analyses (labels, dominant colors, detected text,
/// safe-search) and concatenates their tags. Availability is decided once at
/// construction; a missing key or failed client init leaves the service
/// permanently unavailable for the process lifetime.
pub struct VisionService {
    client: Option<reqwest::Client>,
    endpoint: String,
    api_key: String,
    min_confidence: f32,
    rules: Arc<RuleSet>,
}

impl VisionService {
    pub fn new(config: &Config, rules: Arc<RuleSet>) -> Self {
        let mut service = Self {
            client: None,
            endpoint: config.vision.endpoint.trim_end_matches('/').to_string(),
            api_key: String::new(),
            min_confidence: config.tagging.min_confidence,
            rules,
        };

        if !config.vision.enabled {
            return service;
        }

        let Some(api_key) = config.vision_api_key() else {
            warn!("label service enabled but no API key configured; augmentation disabled");
            return service;
        };

        match reqwest::Client::builder().build() {
            Ok(client) => {
                service.client = Some(client);
                service.api_key = api_key;
            }
            Err(e) => {
                warn!("label service client init failed; augmentation disabled: {e}");
            }
        }

        service
    }

    async fn annotate(&self, client: &reqwest::Client, path: &Path) -> Result<AnnotateResponse> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let content = base64::engine::general_purpose::STANDARD.encode(bytes);

        let request = AnnotateBatchRequest {
            requests: vec![AnnotateRequest {
                image: ImageSource { content },
                features: vec![
                    Feature::new("LABEL_DETECTION", Some(10)),
                    Feature::new("IMAGE_PROPERTIES", None),
                    Feature::new("TEXT_DETECTION", Some(5)),
                    Feature::new("SAFE_SEARCH_DETECTION", None),
                ],
            }],
        };

        let url = format!("{}/v1/images:annotate?key={}", self.endpoint, self.api_key);
        let batch: AnnotateBatchResponse = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Annotation request failed")?
            .error_for_status()
            .context("Annotation request rejected")?
            .json()
            .await
            .context("Failed to decode annotation response")?;

        Ok(batch.responses.into_iter().next().unwrap_or_default())
    }

    /// Tags for labels at or above the confidence threshold, plus a scene
    /// category when a label matches the category keyword table
    fn label_tags(rules: &RuleSet, min_confidence: f32, labels: &[EntityAnnotation]) -> Vec<String> {
        let mut tags = Vec::new();
        for label in labels {
            if label.score < min_confidence {
                continue;
            }
            let lower = label.description.to_lowercase();
            tags.push(lower.replace(' ', "-"));
            if let Some(category) = rules.label_category(&lower) {
                tags.push(category.to_string());
            }
        }
        tags
    }

    /// Palette names for up to the top three dominant colors, each distinct
    /// name added once
    fn color_tags(rules: &RuleSet, properties: Option<&ImageProperties>) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        let Some(properties) = properties else {
            return tags;
        };

        for info in properties.dominant_colors.colors.iter().take(3) {
            let rgb = [
                info.color.red.round() as u8,
                info.color.green.round() as u8,
                info.color.blue.round() as u8,
            ];
            if let Some(name) = rules.nearest_color(rgb) {
                if !tags.iter().any(|t| t == name) {
                    tags.push(name.to_string());
                }
            }
        }
        tags
    }

    /// `text-content` when any text is detected, plus document-keyword tags
    /// found in the first text block
    fn text_tags(annotations: &[EntityAnnotation]) -> Vec<String> {
        let mut tags = Vec::new();
        let Some(first) = annotations.first() else {
            return tags;
        };

        tags.push("text-content".to_string());
        let text = first.description.to_lowercase();
        for &(keyword, tag) in DOC_KEYWORDS {
            if text.contains(keyword) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    /// Positive safe-content signal only: both adult and violence at the
    /// lowest likelihood. Elevated likelihoods add nothing; no `flagged`
    /// tag is ever emitted.
    fn safe_tags(safe: Option<&SafeSearchAnnotation>) -> Vec<String> {
        match safe {
            Some(s) if s.adult == SAFE_LEVEL && s.violence == SAFE_LEVEL => {
                vec!["professional".to_string(), "safe-content".to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn extract_tags(&self, response: &AnnotateResponse) -> Vec<String> {
        let mut tags = Vec::new();
        tags.extend(Self::label_tags(
            &self.rules,
            self.min_confidence,
            &response.label_annotations,
        ));
        tags.extend(Self::color_tags(
            &self.rules,
            response.image_properties_annotation.as_ref(),
        ));
        tags.extend(Self::text_tags(&response.text_annotations));
        tags.extend(Self::safe_tags(response.safe_search_annotation.as_ref()));
        tags
    }

    /// Analyze many images sequentially; a failed image contributes an
    /// empty list, never an error
    pub async fn analyze_batch(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Vec<String>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let tags = self.analyze_image(path).await;
            results.push((path.clone(), tags));
        }
        results
    }
}

#[async_trait]
impl LabelProvider for VisionService {
    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    async fn analyze_image(&self, path: &Path) -> Vec<String> {
        let Some(client) = self.client.as_ref() else {
            return Vec::new();
        };

        match self.annotate(client, path).await {
            Ok(response) => {
                let tags = self.extract_tags(&response);
                debug!(
                    "label service contributed {} tags for {}",
                    tags.len(),
                    path.display()
                );
                tags
            }
            Err(e) => {
                warn!("label service analysis failed for {}: {e:#}", path.display());
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotateBatchRequest {
    requests: Vec<AnnotateRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    image: ImageSource,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageSource {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

impl Feature {
    fn new(r#type: &'static str, max_results: Option<u32>) -> Self {
        Self { r#type, max_results }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    image_properties_annotation: Option<ImageProperties>,
    #[serde(default)]
    safe_search_annotation: Option<SafeSearchAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageProperties {
    #[serde(default)]
    dominant_colors: DominantColors,
}

#[derive(Debug, Default, Deserialize)]
struct DominantColors {
    #[serde(default)]
    colors: Vec<ColorInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct ColorInfo {
    #[serde(default)]
    color: RgbColor,
}

#[derive(Debug, Default, Deserialize)]
struct RgbColor {
    #[serde(default)]
    red: f32,
    #[serde(default)]
    green: f32,
    #[serde(default)]
    blue: f32,
}

#[derive(Debug, Default, Deserialize)]
struct SafeSearchAnnotation {
    #[serde(default)]
    adult: String,
    #[serde(default)]
    violence: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TaggingConfig, VisionConfig};

    fn disabled_service() -> VisionService {
        VisionService::new(&Config::default(), Arc::new(RuleSet::default()))
    }

    fn label(description: &str, score: f32) -> EntityAnnotation {
        EntityAnnotation {
            description: description.to_string(),
            score,
        }
    }

    fn color(red: f32, green: f32, blue: f32) -> ColorInfo {
        ColorInfo {
            color: RgbColor { red, green, blue },
        }
    }

    #[test]
    fn test_disabled_by_config_is_unavailable() {
        assert!(!disabled_service().is_available());
    }

    #[tokio::test]
    async fn test_unavailable_service_returns_empty_without_io() {
        let service = disabled_service();
        let tags = service
            .analyze_image(Path::new("/nonexistent/image.png"))
            .await;
        assert!(tags.is_empty());
    }

    #[test]
    fn test_enabled_without_key_stays_unavailable() {
        // Scoped env guard: make sure the fallback variable does not leak in.
        std::env::remove_var("TAGWISE_VISION_API_KEY");
        let config = Config {
            tagging: TaggingConfig::default(),
            vision: VisionConfig {
                enabled: true,
                api_key: None,
                ..VisionConfig::default()
            },
        };
        let service = VisionService::new(&config, Arc::new(RuleSet::default()));
        assert!(!service.is_available());
    }

    #[test]
    fn test_label_tags_apply_confidence_threshold() {
        let rules = RuleSet::default();
        let labels = vec![label("Blue Sky", 0.95), label("Maybe A Dog", 0.4)];
        let tags = VisionService::label_tags(&rules, 0.7, &labels);

        assert!(tags.contains(&"blue-sky".to_string()));
        assert!(tags.contains(&"nature".to_string()));
        assert!(!tags.iter().any(|t| t.contains("dog")));
    }

    #[test]
    fn test_label_tags_hyphenate_spaces() {
        let rules = RuleSet::default();
        let tags = VisionService::label_tags(&rules, 0.7, &[label("Street Food Market", 0.9)]);
        assert_eq!(tags[0], "street-food-market");
    }

    #[test]
    fn test_color_tags_take_top_three_distinct() {
        let rules = RuleSet::default();
        let properties = ImageProperties {
            dominant_colors: DominantColors {
                colors: vec![
                    color(250.0, 5.0, 5.0),
                    color(245.0, 10.0, 10.0),
                    color(5.0, 5.0, 250.0),
                    color(5.0, 250.0, 5.0),
                ],
            },
        };
        let tags = VisionService::color_tags(&rules, Some(&properties));
        // The fourth color is past the top-three window; the second one
        // duplicates "red".
        assert_eq!(tags, vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn test_color_tags_reject_distant_colors() {
        let rules = RuleSet::default();
        let properties = ImageProperties {
            dominant_colors: DominantColors {
                colors: vec![color(0.0, 255.0, 255.0)],
            },
        };
        assert!(VisionService::color_tags(&rules, Some(&properties)).is_empty());
        assert!(VisionService::color_tags(&rules, None).is_empty());
    }

    #[test]
    fn test_text_tags_detect_document_keywords() {
        let annotations = vec![label("INVOICE\nTotal due: $42\ncontract ref 7", 0.0)];
        let tags = VisionService::text_tags(&annotations);

        assert_eq!(tags[0], "text-content");
        assert!(tags.contains(&"invoice".to_string()));
        assert!(tags.contains(&"contract".to_string()));
        assert!(!tags.contains(&"diploma".to_string()));
    }

    #[test]
    fn test_text_tags_empty_without_detection() {
        assert!(VisionService::text_tags(&[]).is_empty());
    }

    #[test]
    fn test_safe_tags_positive_signal_only() {
        let safe = SafeSearchAnnotation {
            adult: "VERY_UNLIKELY".to_string(),
            violence: "VERY_UNLIKELY".to_string(),
        };
        assert_eq!(
            VisionService::safe_tags(Some(&safe)),
            vec!["professional".to_string(), "safe-content".to_string()]
        );
    }

    #[test]
    fn test_safe_tags_never_emit_flagged() {
        // Elevated likelihoods contribute nothing; in particular no
        // "flagged" tag exists in this contract.
        let levels = ["VERY_UNLIKELY", "UNLIKELY", "POSSIBLE", "LIKELY", "VERY_LIKELY"];
        for adult in levels {
            for violence in levels {
                let safe = SafeSearchAnnotation {
                    adult: adult.to_string(),
                    violence: violence.to_string(),
                };
                let tags = VisionService::safe_tags(Some(&safe));
                assert!(!tags.contains(&"flagged".to_string()));
                if adult != "VERY_UNLIKELY" || violence != "VERY_UNLIKELY" {
                    assert!(tags.is_empty());
                }
            }
        }
        assert!(VisionService::safe_tags(None).is_empty());
    }

    #[test]
    fn test_extract_tags_concatenates_sub_analyses() {
        let config = Config::default();
        let service = VisionService::new(&config, Arc::new(RuleSet::default()));
        let response = AnnotateResponse {
            label_annotations: vec![label("Beach", 0.9)],
            text_annotations: vec![label("receipt #12", 0.0)],
            image_properties_annotation: Some(ImageProperties {
                dominant_colors: DominantColors {
                    colors: vec![color(250.0, 250.0, 250.0)],
                },
            }),
            safe_search_annotation: Some(SafeSearchAnnotation {
                adult: "VERY_UNLIKELY".to_string(),
                violence: "VERY_UNLIKELY".to_string(),
            }),
        };

        let tags = service.extract_tags(&response);
        assert_eq!(
            tags,
            vec![
                "beach".to_string(),
                "nature".to_string(),
                "white".to_string(),
                "text-content".to_string(),
                "receipt".to_string(),
                "professional".to_string(),
                "safe-content".to_string(),
            ]
        );
    }

    #[test]
    fn test_annotate_response_decodes_wire_format() {
        let raw = r#"{
            "responses": [{
                "labelAnnotations": [{"description": "Sky", "score": 0.98}],
                "textAnnotations": [{"description": "hello"}],
                "imagePropertiesAnnotation": {
                    "dominantColors": {"colors": [{"color": {"red": 10, "green": 20, "blue": 250}}]}
                },
                "safeSearchAnnotation": {"adult": "VERY_UNLIKELY", "violence": "UNLIKELY"}
            }]
        }"#;
        let batch: AnnotateBatchResponse = serde_json::from_str(raw).unwrap();
        let response = &batch.responses[0];
        assert_eq!(response.label_annotations[0].description, "Sky");
        assert_eq!(response.text_annotations.len(), 1);
        assert!(response.image_properties_annotation.is_some());
        assert_eq!(
            response.safe_search_annotation.as_ref().unwrap().violence,
            "UNLIKELY"
        );
    }
}

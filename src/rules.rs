use crate::category::Category;

/// One entry of the ordered text-analysis table: a set of extensions, the
/// base tags they imply, and an optional probe run against the sampled
/// content. Rules are matched in declaration order, first match wins.
pub struct TextRule {
    pub extensions: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub probe: Option<fn(&str) -> Vec<&'static str>>,
}

/// Immutable rule tables consumed by the classifier, analyzers, augmenter,
/// and tag processor. Built once at startup and passed explicitly; there is
/// no hidden global state.
pub struct RuleSet {
    /// Exact media-type entries, checked before prefixes
    pub mime_exact: &'static [(&'static str, Category)],
    /// Prefix entries, scanned in order; first match wins
    pub mime_prefixes: &'static [(&'static str, Category)],
    /// Ordered extension rules for text/code files
    pub text_rules: &'static [TextRule],
    /// PDF content keywords: (category tag, keywords that imply it)
    pub pdf_keywords: &'static [(&'static str, &'static [&'static str])],
    /// Video extension table: (extension, extra tags)
    pub video_extensions: &'static [(&'static str, &'static [&'static str])],
    /// Audio extension table: (extension, extra tags)
    pub audio_extensions: &'static [(&'static str, &'static [&'static str])],
    /// Raw tag to canonical tag
    pub synonyms: &'static [(&'static str, &'static str)],
    /// Tag ordering weight, higher sorts first; unlisted tags weigh 0
    pub priorities: &'static [(&'static str, i32)],
    /// Tags always discarded
    pub stop_tags: &'static [&'static str],
    /// Vision label categories: (category tag, label keywords)
    pub label_categories: &'static [(&'static str, &'static [&'static str])],
    /// Named palette for dominant-color matching
    pub color_palette: &'static [([u8; 3], &'static str)],
}

impl RuleSet {
    /// Canonical form of a tag after synonym mapping (identity by default).
    /// Expects already lower-cased input.
    pub fn canonical<'a>(&self, tag: &'a str) -> &'a str {
        self.synonyms
            .iter()
            .find(|(raw, _)| *raw == tag)
            .map(|&(_, canonical)| canonical)
            .unwrap_or(tag)
    }

    /// Ordering weight for a tag; unlisted tags weigh 0
    pub fn priority(&self, tag: &str) -> i32 {
        self.priorities
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|&(_, weight)| weight)
            .unwrap_or(0)
    }

    /// Whether a tag is always discarded
    pub fn is_stop_tag(&self, tag: &str) -> bool {
        self.stop_tags.contains(&tag)
    }

    /// Category tag for a vision label, if any keyword matches
    pub fn label_category(&self, label: &str) -> Option<&'static str> {
        self.label_categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
            .map(|&(category, _)| category)
    }

    /// Nearest palette color by Euclidean RGB distance, accepted only when
    /// the distance stays under a fixed threshold
    pub fn nearest_color(&self, rgb: [u8; 3]) -> Option<&'static str> {
        const MAX_DISTANCE: f64 = 150.0;

        let mut best: Option<(f64, &'static str)> = None;
        for &(known, name) in self.color_palette {
            let distance = rgb
                .iter()
                .zip(known.iter())
                .map(|(&a, &b)| {
                    let d = f64::from(a) - f64::from(b);
                    d * d
                })
                .sum::<f64>()
                .sqrt();

            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, name));
            }
        }

        best.and_then(|(distance, name)| (distance < MAX_DISTANCE).then_some(name))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            mime_exact: MIME_EXACT,
            mime_prefixes: MIME_PREFIXES,
            text_rules: TEXT_RULES,
            pdf_keywords: PDF_KEYWORDS,
            video_extensions: VIDEO_EXTENSIONS,
            audio_extensions: AUDIO_EXTENSIONS,
            synonyms: TAG_SYNONYMS,
            priorities: TAG_PRIORITIES,
            stop_tags: STOP_TAGS,
            label_categories: LABEL_CATEGORIES,
            color_palette: COLOR_PALETTE,
        }
    }
}

/// Media types with a category that cannot be derived from their prefix
pub const MIME_EXACT: &[(&str, Category)] = &[
    ("application/pdf", Category::Document),
    ("application/msword", Category::Document),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Category::Document,
    ),
    ("application/vnd.ms-excel", Category::Spreadsheet),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Category::Spreadsheet,
    ),
    ("application/zip", Category::Archive),
    ("application/x-rar-compressed", Category::Archive),
    ("application/x-7z-compressed", Category::Archive),
];

/// Prefix fallbacks, scanned in this order
pub const MIME_PREFIXES: &[(&str, Category)] = &[
    ("image/", Category::Image),
    ("video/", Category::Video),
    ("audio/", Category::Audio),
    ("text/", Category::Text),
];

fn probe_python(content: &str) -> Vec<&'static str> {
    if content.contains("import") && content.contains("def") {
        vec!["script"]
    } else {
        Vec::new()
    }
}

fn probe_javascript(content: &str) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if content.contains("function") || content.contains("const") {
        tags.push("script");
    }
    let lower = content.to_lowercase();
    if lower.contains("react") || lower.contains("component") {
        tags.extend(["react", "frontend"]);
    }
    tags
}

fn probe_html(content: &str) -> Vec<&'static str> {
    if content.to_lowercase().contains("<html") {
        vec!["webpage"]
    } else {
        Vec::new()
    }
}

fn probe_java(content: &str) -> Vec<&'static str> {
    if content.contains("class") && content.contains("public") {
        vec!["oop"]
    } else {
        Vec::new()
    }
}

fn probe_c_family(content: &str) -> Vec<&'static str> {
    if content.contains("#include") {
        vec!["native"]
    } else {
        Vec::new()
    }
}

/// Ordered text-analysis rules, first matching extension set wins
pub const TEXT_RULES: &[TextRule] = &[
    TextRule {
        extensions: &["py", "python"],
        tags: &["code", "python", "programming"],
        probe: Some(probe_python),
    },
    TextRule {
        extensions: &["js", "jsx", "ts", "tsx"],
        tags: &["code", "javascript", "programming"],
        probe: Some(probe_javascript),
    },
    TextRule {
        extensions: &["html", "htm"],
        tags: &["code", "html", "web", "markup"],
        probe: Some(probe_html),
    },
    TextRule {
        extensions: &["css"],
        tags: &["code", "css", "stylesheet", "design"],
        probe: None,
    },
    TextRule {
        extensions: &["java"],
        tags: &["code", "java", "programming"],
        probe: Some(probe_java),
    },
    TextRule {
        extensions: &["cpp", "c", "h", "hpp"],
        tags: &["code", "c++", "c", "programming"],
        probe: Some(probe_c_family),
    },
    TextRule {
        extensions: &["php"],
        tags: &["code", "php", "backend", "web"],
        probe: None,
    },
    TextRule {
        extensions: &["sql"],
        tags: &["code", "sql", "database", "query"],
        probe: None,
    },
    TextRule {
        extensions: &["json"],
        tags: &["data", "json", "config"],
        probe: None,
    },
    TextRule {
        extensions: &["md", "markdown"],
        tags: &["markdown", "documentation", "readme"],
        probe: None,
    },
    TextRule {
        extensions: &["csv"],
        tags: &["csv", "data", "spreadsheet"],
        probe: None,
    },
];

/// Content keywords that place a PDF into a document category. All matching
/// categories are added, not just the first.
pub const PDF_KEYWORDS: &[(&str, &[&str])] = &[
    ("invoice", &["invoice", "fatura", "pagamento", "total"]),
    ("financial", &["financial", "financeiro", "contabilidade"]),
    ("contract", &["contract", "contrato", "acordo"]),
    ("legal", &["legal", "juridico", "tribunal"]),
    ("proposal", &["proposal", "proposta", "orçamento"]),
    ("budget", &["budget", "orçamento", "custo"]),
    ("report", &["report", "relatório", "análise"]),
    ("presentation", &["presentation", "apresentação", "slide"]),
];

pub const VIDEO_EXTENSIONS: &[(&str, &[&str])] = &[
    ("mp4", &["mp4", "h264"]),
    ("avi", &["avi"]),
    ("mov", &["mov", "quicktime"]),
    ("mkv", &["mkv", "matroska"]),
    ("webm", &["webm", "vp9"]),
];

pub const AUDIO_EXTENSIONS: &[(&str, &[&str])] = &[
    ("mp3", &["mp3", "mpeg"]),
    ("wav", &["wav", "lossless"]),
    ("flac", &["flac", "lossless", "high-quality"]),
    ("ogg", &["ogg", "vorbis"]),
    ("m4a", &["m4a", "aac"]),
];

/// Synonym normalization map, raw tag to canonical form
pub const TAG_SYNONYMS: &[(&str, &str)] = &[
    ("jpg", "jpeg"),
    ("jpeg", "jpeg"),
    ("png", "png"),
    ("gif", "gif"),
    ("pic", "image"),
    ("picture", "image"),
    ("photo", "image"),
    ("img", "image"),
    ("movie", "video"),
    ("clip", "video"),
    ("sound", "audio"),
    ("music", "audio"),
    ("doc", "document"),
    ("paper", "document"),
    ("file", "document"),
    ("code", "programming"),
    ("script", "programming"),
    ("dev", "development"),
    ("frontend", "front-end"),
    ("backend", "back-end"),
];

/// Tag ordering weights; higher sorts first, unlisted tags weigh 0
pub const TAG_PRIORITIES: &[(&str, i32)] = &[
    ("image", 10),
    ("video", 10),
    ("audio", 10),
    ("document", 10),
    ("code", 9),
    ("programming", 9),
    ("python", 8),
    ("javascript", 8),
    ("react", 8),
    ("high-resolution", 7),
    ("4k", 7),
    ("hd", 7),
    ("pdf", 6),
    ("web", 5),
    ("frontend", 5),
    ("backend", 5),
];

/// Tags that carry no information and are always dropped
pub const STOP_TAGS: &[&str] = &["unknown", "error", "other", "undefined"];

/// Vision label keywords grouped into broad scene categories
pub const LABEL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "nature",
        &["sky", "cloud", "tree", "flower", "grass", "mountain", "water", "ocean", "beach"],
    ),
    (
        "urban",
        &["building", "street", "city", "architecture", "road", "car", "vehicle"],
    ),
    (
        "people",
        &["person", "face", "portrait", "people", "crowd", "group"],
    ),
    (
        "indoor",
        &["room", "furniture", "interior", "home", "office", "kitchen"],
    ),
    (
        "food",
        &["food", "dish", "meal", "cuisine", "dessert", "drink", "restaurant"],
    ),
    (
        "technology",
        &["computer", "phone", "screen", "device", "electronic", "technology"],
    ),
    ("animal", &["animal", "pet", "dog", "cat", "bird", "wildlife"]),
    (
        "sport",
        &["sport", "game", "athlete", "competition", "exercise", "fitness"],
    ),
];

/// Named palette used to bucket reported dominant colors
pub const COLOR_PALETTE: &[([u8; 3], &str)] = &[
    ([255, 0, 0], "red"),
    ([0, 255, 0], "green"),
    ([0, 0, 255], "blue"),
    ([255, 255, 0], "yellow"),
    ([255, 165, 0], "orange"),
    ([128, 0, 128], "purple"),
    ([255, 192, 203], "pink"),
    ([0, 0, 0], "black"),
    ([255, 255, 255], "white"),
    ([128, 128, 128], "gray"),
];

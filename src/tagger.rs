use crate::rules::RuleSet;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns raw, noisy tag candidates into the final bounded, ordered tag set.
///
/// The pipeline always runs normalize, filter, prioritize in that order. The
/// output never exceeds `max_tags`, never contains a stop tag, and never
/// contains two case-insensitively equal tags.
pub struct TagProcessor {
    rules: Arc<RuleSet>,
    max_tags: usize,
}

impl TagProcessor {
    pub fn new(rules: Arc<RuleSet>, max_tags: usize) -> Self {
        Self { rules, max_tags }
    }

    /// Lower-case every tag and replace it with its canonical synonym
    pub fn normalize(&self, tags: &[String]) -> Vec<String> {
        tags.iter()
            .map(|tag| {
                let lower = tag.to_lowercase();
                self.rules.canonical(&lower).to_string()
            })
            .collect()
    }

    /// Drop stop tags and duplicates, keeping each tag's first occurrence
    pub fn filter(&self, tags: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        tags.iter()
            .map(|tag| tag.to_lowercase())
            .filter(|tag| !tag.is_empty())
            .filter(|tag| !self.rules.is_stop_tag(tag))
            .filter(|tag| seen.insert(tag.clone()))
            .collect()
    }

    /// Sort by `(priority, tag)` descending and truncate to the configured
    /// maximum. Equal-priority tags tie-break in reverse lexicographic
    /// order; this is the contract, not an accident of the sort call.
    pub fn prioritize(&self, tags: &[String]) -> Vec<String> {
        let mut sorted: Vec<String> = tags.to_vec();
        sorted.sort_by(|a, b| {
            let pa = self.rules.priority(a);
            let pb = self.rules.priority(b);
            pb.cmp(&pa).then_with(|| b.cmp(a))
        });
        sorted.truncate(self.max_tags);
        sorted
    }

    /// Full pipeline: normalize, filter, prioritize
    pub fn process(&self, raw_tags: &[String]) -> Vec<String> {
        let normalized = self.normalize(raw_tags);
        let filtered = self.filter(&normalized);
        self.prioritize(&filtered)
    }

    /// Concatenate multiple raw lists in argument order and reprocess.
    /// Adding user-supplied tags to an existing set is
    /// `merge(&[existing, custom])`.
    pub fn merge(&self, tag_lists: &[&[String]]) -> Vec<String> {
        let all: Vec<String> = tag_lists.iter().flat_map(|l| l.iter().cloned()).collect();
        self.process(&all)
    }

    /// Case-insensitive intersection test between a search query and a
    /// file's tags
    pub fn matches(&self, search_tags: &[String], file_tags: &[String]) -> bool {
        let file_lower: std::collections::HashSet<String> =
            file_tags.iter().map(|t| t.to_lowercase()).collect();
        search_tags
            .iter()
            .any(|t| file_lower.contains(&t.to_lowercase()))
    }

    /// Tag usage counts across many files, most frequent first
    pub fn statistics(&self, all_file_tags: &[Vec<String>]) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for file_tags in all_file_tags {
            for tag in file_tags {
                *counts.entry(tag.to_lowercase()).or_insert(0) += 1;
            }
        }

        let mut stats: Vec<(String, usize)> = counts.into_iter().collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }
}

//! Free-text category label normalization
//!
//! Group titles in the wild mix languages, emoji decorations and provider
//! prefixes. Classification resolves each title in three stages, each consulted
//! only if the previous one did not fire:
//!
//! 1. translation table (case-insensitive substring, longest key first)
//! 2. country override -> the international label
//! 3. keyword buckets, in configured order
//!
//! A title nothing matches keeps its cleaned form; labels are never discarded.
//! All tables are immutable data injected at construction.

use crate::config::ClassifierConfig;
use crate::models::PlaylistEntry;

pub struct TitleClassifier {
    /// (lowercased key, canonical label), sorted longest key first so a longer
    /// key can never be shadowed by one of its own substrings.
    translations: Vec<(String, String)>,
    /// (canonical label, lowercased keywords), in configured order.
    buckets: Vec<(String, Vec<String>)>,
    countries: Vec<String>,
    international_label: String,
}

impl TitleClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let mut translations: Vec<(String, String)> = config
            .translations
            .iter()
            .map(|t| (t.from.to_lowercase(), t.to.clone()))
            .collect();
        // Longest key first, lexicographic within a length, so substring
        // shadowing is deterministic.
        translations.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let buckets = config
            .buckets
            .iter()
            .map(|b| {
                (
                    b.label.clone(),
                    b.keywords.iter().map(|k| k.to_lowercase()).collect(),
                )
            })
            .collect();

        let countries = config.countries.iter().map(|c| c.to_lowercase()).collect();

        Self {
            translations,
            buckets,
            countries,
            international_label: config.international_label.clone(),
        }
    }

    /// Classify every non-empty group title in place.
    pub fn apply(&self, entries: &mut [PlaylistEntry]) {
        for entry in entries.iter_mut() {
            if let Some(title) = entry.group_title.as_deref() {
                if !title.is_empty() {
                    entry.group_title = Some(self.classify(title));
                }
            }
        }
    }

    /// Resolve one raw group title to its canonical label.
    pub fn classify(&self, raw_title: &str) -> String {
        let cleaned = collapse_whitespace(raw_title);
        let translated = self.translate(&cleaned);

        // The country check runs on the translated title and wins over buckets.
        if self.contains_country(&translated) {
            return self.international_label.clone();
        }

        if let Some(label) = self.bucket_for(&translated) {
            return label;
        }

        translated
    }

    fn translate(&self, title: &str) -> String {
        let lower = title.to_lowercase();
        for (key, canonical) in &self.translations {
            if lower.contains(key.as_str()) {
                return canonical.clone();
            }
        }
        title.to_string()
    }

    fn contains_country(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.countries.iter().any(|c| lower.contains(c.as_str()))
    }

    fn bucket_for(&self, title: &str) -> Option<String> {
        let lower = title.to_lowercase();
        for (label, keywords) in &self.buckets {
            if keywords.iter().any(|k| lower.contains(k.as_str())) {
                return Some(label.clone());
            }
        }
        None
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

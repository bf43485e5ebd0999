//! Application configuration
//!
//! Loaded from a TOML file when one exists, otherwise built from defaults.
//! The classifier tables live here as plain data: they are injected into the
//! classifier at construction, never consulted as global state.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::Stage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub epg: EpgConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stage sequence, run in order. Each stage consumes and returns the full
    /// record set, so the sequence is reorderable without code changes.
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// HEAD-check every stream and drop entries that do not answer 2xx.
    pub liveness_enabled: bool,
    pub liveness_timeout_seconds: u64,
    pub liveness_concurrency: usize,
    /// Inspect stream content and classify SD/HD/FHD.
    pub quality_enabled: bool,
    pub quality_timeout_seconds: u64,
    /// Quality probing is far more expensive than a HEAD check, so it gets
    /// its own (much smaller) pool.
    pub quality_concurrency: usize,
    pub quality_classifier: QualityClassifierKind,
    /// Cap on body bytes read when sniffing the payload for resolution markers.
    pub sniff_max_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityClassifierKind {
    /// GET the stream and look for literal resolution markers in the payload.
    Payload,
    /// Ask ffprobe for the video stream's width/height.
    Ffprobe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    pub enabled: bool,
    /// XMLTV document URLs, merged in order with last-write-wins on name collision.
    pub sources: Vec<String>,
    /// Minimum similarity ratio for assigning a channel id.
    pub similarity_threshold: f64,
    /// Minimum ratio for an unmatched channel to appear in the diagnostics block.
    pub report_threshold: f64,
    pub fetch_concurrency: usize,
    pub fetch_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Source-language or legacy label -> canonical label. Substring matched
    /// case-insensitively, longest key first.
    pub translations: Vec<Translation>,
    /// Canonical label -> keywords, evaluated in listed order.
    pub buckets: Vec<KeywordBucket>,
    /// Titles containing any of these become the international label.
    pub countries: Vec<String>,
    pub international_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordBucket {
    pub label: String,
    pub keywords: Vec<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from("consolidated.m3u")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: default_output(),
            pipeline: PipelineConfig::default(),
            fetch: FetchConfig::default(),
            probe: ProbeConfig::default(),
            epg: EpgConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                Stage::Dedup,
                Stage::Classify,
                Stage::Probe,
                Stage::EpgMatch,
                Stage::Rank,
            ],
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            liveness_enabled: false,
            liveness_timeout_seconds: 10,
            liveness_concurrency: 100,
            quality_enabled: false,
            quality_timeout_seconds: 60,
            quality_concurrency: 10,
            quality_classifier: QualityClassifierKind::Payload,
            sniff_max_bytes: 256 * 1024,
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sources: Vec::new(),
            similarity_threshold: 0.80,
            report_threshold: 0.75,
            fetch_concurrency: 8,
            fetch_timeout_seconds: 30,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            translations: default_translations(),
            buckets: default_buckets(),
            countries: default_countries(),
            international_label: "International".to_string(),
        }
    }
}

impl Config {
    /// Read configuration from `path` if the file exists, otherwise defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }
}

fn tr(from: &str, to: &str) -> Translation {
    Translation {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Default label translation table.
///
/// Canonical labels appear as their own keys so classification is idempotent:
/// a second pass maps every canonical label straight back to itself before any
/// shorter key can shadow it (matching is longest-key-first).
fn default_translations() -> Vec<Translation> {
    vec![
        tr("Anak", "Kids"),
        tr("Berita", "News"),
        tr("Olahraga", "Sports"),
        tr("Film", "Movies"),
        tr("Hiburan", "Entertainment"),
        tr("Musik", "Music"),
        tr("Dokumenter", "Documentary"),
        tr("Daerah", "Regional"),
        tr("Lokal", "Regional"),
        tr("Dakwah", "Religious"),
        tr("Islami", "Religious"),
        tr("Keagamaan", "Religious"),
        tr("Religi", "Religious"),
        tr("Pengetahuan", "Knowledge"),
        tr("Gaya Hidup", "Lifestyle"),
        tr("Informasi", "Information"),
        tr("Nasional", "National"),
        tr("Singapura", "Singapore"),
        tr("Jepang", "Japan"),
        tr("Liga Champion", "Sports"),
        tr("Liga Eropa", "Sports"),
        tr("Liga Inggris", "Sports"),
        tr("BRI Liga 1", "Sports"),
        tr("Badminton", "Sports"),
        tr("HBO Group", "Movies"),
        tr("Indonesia Channels", "National"),
        tr("Christian Channels", "Religious"),
        tr("VOD Indo", "Indonesian VOD"),
        tr("Internet Radio", "Internet Radio"),
        tr("Radio", "Radio"),
        tr("Sports", "Sports"),
        tr("News", "News"),
        tr("Movies", "Movies"),
        tr("Kids", "Kids"),
        tr("Music", "Music"),
        tr("Entertainment", "Entertainment"),
        tr("Documentary", "Documentary"),
        tr("Regional", "Regional"),
        tr("Religious", "Religious"),
        tr("Knowledge", "Knowledge"),
        tr("Lifestyle", "Lifestyle"),
        tr("Information", "Information"),
        tr("International", "International"),
        tr("National", "National"),
        tr("Korean Channels", "Korean Channels"),
        tr("Taiwan Channels", "Taiwan Channels"),
        tr("Indonesian VOD", "Indonesian VOD"),
    ]
}

fn default_buckets() -> Vec<KeywordBucket> {
    fn bucket(label: &str, keywords: &[&str]) -> KeywordBucket {
        KeywordBucket {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    vec![
        bucket("Sports", &["sports", "sport", "football", "liga", "cup", "champion"]),
        bucket("News", &["news", "berita", "informasi"]),
        bucket("Movies", &["movies", "film", "cinema", "hbo"]),
        bucket("Entertainment", &["entertainment", "hiburan"]),
        bucket("Kids", &["kids", "anak"]),
        bucket("Music", &["music", "musik"]),
        bucket("Documentary", &["documentary", "dokumenter"]),
        bucket("Regional", &["regional", "daerah", "lokal"]),
        bucket("International", &["international", "internasional", "global"]),
        bucket("Religious", &["religious", "islami", "dakwah", "keagamaan"]),
        bucket("Knowledge", &["knowledge", "pengetahuan"]),
        bucket("Lifestyle", &["lifestyle", "gaya hidup"]),
        bucket("Internet Radio", &["internet radio", "radio"]),
    ]
}

fn default_countries() -> Vec<String> {
    [
        "Indonesia", "Malaysia", "Singapore", "Brunei", "Taiwan", "Korea", "Japan", "China",
        "India", "Thailand", "Vietnam", "Philippines", "Australia", "New Zealand", "USA",
        "Canada", "Mexico", "Brazil", "Argentina", "Chile", "Colombia", "Peru", "Venezuela",
        "Russia", "Germany", "France", "UK", "Italy", "Spain", "Netherlands", "Belgium",
        "Sweden", "Norway", "Denmark", "Finland", "Poland", "Ukraine", "Czech Republic",
        "Austria", "Switzerland", "Portugal", "Greece", "Turkey", "Saudi Arabia", "UAE",
        "Israel", "South Africa", "Nigeria", "Egypt", "Kenya", "Morocco",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.epg.similarity_threshold, 0.80);
        assert_eq!(reparsed.pipeline.stages, config.pipeline.stages);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            inputs = ["playlist.m3u"]

            [probe]
            liveness_enabled = true
            liveness_timeout_seconds = 6
            liveness_concurrency = 50
            quality_enabled = false
            quality_timeout_seconds = 60
            quality_concurrency = 10
            quality_classifier = "payload"
            sniff_max_bytes = 65536
            "#,
        )
        .unwrap();

        assert_eq!(config.inputs, vec!["playlist.m3u"]);
        assert!(config.probe.liveness_enabled);
        assert_eq!(config.probe.liveness_timeout_seconds, 6);
        assert_eq!(config.epg.similarity_threshold, 0.80);
        assert!(!config.classifier.translations.is_empty());
    }

    #[test]
    fn canonical_labels_are_translation_fixed_points() {
        let classifier = ClassifierConfig::default();
        for bucket in &classifier.buckets {
            assert!(
                classifier
                    .translations
                    .iter()
                    .any(|t| t.from == bucket.label && t.to == bucket.label),
                "bucket label {:?} has no identity translation",
                bucket.label
            );
        }
    }
}

//! EPG index construction
//!
//! Fetches every configured XMLTV source through the [`Fetcher`], pulls out
//! `(channel id, display-name)` pairs, and merges the per-source maps into one
//! [`EpgIndex`]. A failed source logs a warning and contributes zero entries.
//! Merging happens in configured source order with last-write-wins on key
//! collision, so the result is deterministic even though fetching is not.

pub mod matcher;

use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::config::EpgConfig;
use crate::models::EpgIndex;
use crate::sources::Fetcher;
use crate::utils::worker_pool::WorkerPool;

pub use matcher::EpgMatcher;

pub struct EpgIndexBuilder<'a> {
    fetcher: &'a dyn Fetcher,
    channel_regex: Regex,
}

impl<'a> EpgIndexBuilder<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Result<Self> {
        // Only (id, display-name) pairs are needed; any XMLTV-shaped document
        // that exposes them is acceptable.
        let channel_regex =
            Regex::new(r#"<channel id="([^"]+)">\s*<display-name>([^<]+)</display-name>"#)?;
        Ok(Self {
            fetcher,
            channel_regex,
        })
    }

    pub async fn build(&self, config: &EpgConfig) -> EpgIndex {
        info!(
            "Building EPG index from {} sources, concurrency {}",
            config.sources.len(),
            config.fetch_concurrency
        );

        let pool = WorkerPool::new(
            config.fetch_concurrency,
            Duration::from_secs(config.fetch_timeout_seconds),
        );
        let results = pool
            .run(config.sources.clone(), |url| async move {
                self.fetcher.fetch(&url).await
            })
            .await;

        let mut index = EpgIndex::new();
        for (url, content) in config.sources.iter().zip(results) {
            match content {
                Some(content) => {
                    let extracted = self.extract_channel_ids(&content);
                    info!("EPG source {} contributed {} channels", url, extracted.len());
                    // Later sources overwrite earlier ones on collision.
                    index.extend(extracted);
                }
                None => warn!("EPG source {} failed, contributing nothing", url),
            }
        }

        info!("EPG index built: {} distinct channel names", index.len());
        index
    }

    fn extract_channel_ids(&self, content: &str) -> EpgIndex {
        let mut ids = EpgIndex::new();
        for captures in self.channel_regex.captures_iter(content) {
            let channel_id = captures[1].trim().to_string();
            let display_name = captures[2].trim().to_lowercase();
            if !channel_id.is_empty() && !display_name.is_empty() {
                ids.insert(display_name, channel_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubFetcher {
        documents: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, SourceError> {
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| SourceError::timeout(url))
        }
    }

    fn config(sources: &[&str]) -> EpgConfig {
        EpgConfig {
            enabled: true,
            sources: sources.iter().map(|s| s.to_string()).collect(),
            ..EpgConfig::default()
        }
    }

    #[tokio::test]
    async fn extracts_and_normalizes_channel_names() {
        let xml = r#"<tv>
<channel id="Trans7.id">
  <display-name>Trans 7</display-name>
</channel>
<channel id="RCTI.id"><display-name> RCTI </display-name></channel>
</tv>"#;
        let fetcher = StubFetcher {
            documents: HashMap::from([("http://epg/a".to_string(), xml.to_string())]),
        };
        let builder = EpgIndexBuilder::new(&fetcher).unwrap();

        let index = builder.build(&config(&["http://epg/a"])).await;
        assert_eq!(index.get("trans 7").map(String::as_str), Some("Trans7.id"));
        assert_eq!(index.get("rcti").map(String::as_str), Some("RCTI.id"));
    }

    #[tokio::test]
    async fn later_source_overwrites_earlier_on_collision() {
        let first = r#"<channel id="Old.id"><display-name>Trans 7</display-name></channel>"#;
        let second = r#"<channel id="New.id"><display-name>Trans 7</display-name></channel>"#;
        let fetcher = StubFetcher {
            documents: HashMap::from([
                ("http://epg/a".to_string(), first.to_string()),
                ("http://epg/b".to_string(), second.to_string()),
            ]),
        };
        let builder = EpgIndexBuilder::new(&fetcher).unwrap();

        let index = builder.build(&config(&["http://epg/a", "http://epg/b"])).await;
        assert_eq!(index.get("trans 7").map(String::as_str), Some("New.id"));
    }

    #[tokio::test]
    async fn failed_source_contributes_zero_entries() {
        let xml = r#"<channel id="A.id"><display-name>A One</display-name></channel>"#;
        let fetcher = StubFetcher {
            documents: HashMap::from([("http://epg/ok".to_string(), xml.to_string())]),
        };
        let builder = EpgIndexBuilder::new(&fetcher).unwrap();

        let index = builder
            .build(&config(&["http://epg/gone", "http://epg/ok"]))
            .await;
        assert_eq!(index.len(), 1);
    }
}

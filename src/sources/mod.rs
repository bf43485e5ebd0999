//! External document access
//!
//! The pipeline never talks to the network directly; it goes through the
//! [`Fetcher`] trait so EPG building and input loading can be tested against
//! canned documents. Any fetch failure is a zero contribution, never fatal to
//! the run; the only fatal case is ending up with no records at all.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::{AppError, ParseError, SourceError};
use crate::models::PlaylistEntry;
use crate::playlist::parse_playlist;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a document as text, failing within the fetcher's timeout.
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::timeout(url)
                } else {
                    SourceError::request(url, e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(SourceError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::request(url, e.to_string()))
    }
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load and parse every configured input (file path or URL), concatenating the
/// entry lists in input order. A failed input logs a warning and contributes
/// nothing; a run that yields zero records from a non-empty input list fails.
pub async fn load_playlists(
    inputs: &[String],
    fetcher: &dyn Fetcher,
) -> Result<Vec<PlaylistEntry>, AppError> {
    let mut entries = Vec::new();

    for input in inputs {
        let content = if is_url(input) {
            match fetcher.fetch(input).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping playlist source {}: {}", input, e);
                    continue;
                }
            }
        } else {
            match tokio::fs::read_to_string(input).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping playlist file {}: {}", input, e);
                    continue;
                }
            }
        };

        let parsed = parse_playlist(&content);
        info!("Loaded {} records from {}", parsed.len(), input);
        entries.extend(parsed);
    }

    if entries.is_empty() {
        return Err(AppError::Parse(ParseError::NoRecords));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn stub(documents: &[(&str, &str)]) -> StubFetcher {
        StubFetcher {
            documents: documents
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn concatenates_feeds_in_input_order() {
        let fetcher = stub(&[
            ("http://feed/a", "#EXTINF:-1,A\nhttp://x/1\n"),
            ("http://feed/b", "#EXTINF:-1,B\nhttp://x/2\n"),
        ]);
        let inputs = vec!["http://feed/a".to_string(), "http://feed/b".to_string()];

        let entries = load_playlists(&inputs, &fetcher).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn failed_source_contributes_nothing() {
        let fetcher = stub(&[("http://feed/ok", "#EXTINF:-1,A\nhttp://x/1\n")]);
        let inputs = vec!["http://feed/gone".to_string(), "http://feed/ok".to_string()];

        let entries = load_playlists(&inputs, &fetcher).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn zero_records_overall_is_fatal() {
        let fetcher = stub(&[]);
        let inputs = vec!["http://feed/gone".to_string()];

        let result = load_playlists(&inputs, &fetcher).await;
        assert!(matches!(
            result,
            Err(AppError::Parse(ParseError::NoRecords))
        ));
    }
}

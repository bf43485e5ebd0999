//! Liveness and quality probing over the record set
//!
//! Two independent probe kinds, each optional: a header-only liveness check
//! that can drop dead entries, and a quality probe that annotates resolution
//! tier and measured latency. Each kind fans out through the shared worker
//! pool with its own concurrency limit and timeout; tasks receive a read-only
//! snapshot of the stream URL and results are merged back by record position
//! once the whole batch has completed.

pub mod quality;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::{ProbeConfig, QualityClassifierKind};
use crate::errors::ProbeError;
use crate::models::{PlaylistEntry, ProbeOutcome, QualityTier};
use crate::utils::worker_pool::WorkerPool;

pub use quality::{FfprobeClassifier, PayloadSniffer, QualityClassifier, QualityReading};

#[async_trait]
pub trait LivenessChecker: Send + Sync {
    /// Whether the stream URL currently answers. One shot, no retry.
    async fn check(&self, url: &str) -> Result<bool, ProbeError>;
}

/// HEAD-request liveness check; alive iff the response status is 2xx.
pub struct HttpLivenessChecker {
    client: reqwest::Client,
}

impl HttpLivenessChecker {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LivenessChecker for HttpLivenessChecker {
    async fn check(&self, url: &str) -> Result<bool, ProbeError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ProbeError::Unclassifiable {
                url: format!("{url}: {e}"),
            })?;
        Ok(response.status().is_success())
    }
}

pub struct ProbeEngine {
    config: ProbeConfig,
    liveness: Arc<dyn LivenessChecker>,
    quality: Arc<dyn QualityClassifier>,
}

impl ProbeEngine {
    pub fn new(
        config: ProbeConfig,
        liveness: Arc<dyn LivenessChecker>,
        quality: Arc<dyn QualityClassifier>,
    ) -> Self {
        Self {
            config,
            liveness,
            quality,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        let client = reqwest::Client::new();
        let quality: Arc<dyn QualityClassifier> = match config.quality_classifier {
            QualityClassifierKind::Payload => {
                Arc::new(PayloadSniffer::new(client.clone(), config.sniff_max_bytes))
            }
            QualityClassifierKind::Ffprobe => Arc::new(FfprobeClassifier),
        };
        Self::new(
            config.clone(),
            Arc::new(HttpLivenessChecker::new(client)),
            quality,
        )
    }

    /// Run the enabled probe kinds over the record set.
    ///
    /// Liveness filtering removes entries that did not answer; a failed or
    /// timed-out quality probe leaves its entry annotated `Unknown`.
    pub async fn run(&self, mut entries: Vec<PlaylistEntry>) -> Vec<PlaylistEntry> {
        if self.config.liveness_enabled {
            entries = self.filter_alive(entries).await;
        }
        if self.config.quality_enabled {
            entries = self.annotate_quality(entries).await;
        }
        entries
    }

    async fn filter_alive(&self, entries: Vec<PlaylistEntry>) -> Vec<PlaylistEntry> {
        let total = entries.len();
        info!(
            "Liveness probe: {} streams, concurrency {}, timeout {}s",
            total, self.config.liveness_concurrency, self.config.liveness_timeout_seconds
        );

        let pool = WorkerPool::new(
            self.config.liveness_concurrency,
            Duration::from_secs(self.config.liveness_timeout_seconds),
        );
        let urls: Vec<String> = entries.iter().map(|e| e.stream_url.clone()).collect();
        let results = pool
            .run(urls, |url| {
                let checker = Arc::clone(&self.liveness);
                async move { checker.check(&url).await }
            })
            .await;

        let mut surviving = Vec::with_capacity(entries.len());
        for (entry, alive) in entries.into_iter().zip(results) {
            let mut entry = entry;
            match alive {
                Some(true) => {
                    let outcome = entry.probe.get_or_insert(ProbeOutcome {
                        alive: true,
                        quality: QualityTier::Unknown,
                        latency_seconds: None,
                    });
                    outcome.alive = true;
                    surviving.push(entry);
                }
                // A timeout or error counts as dead for this run.
                Some(false) | None => {
                    debug!("Dropping dead stream: {}", entry.stream_url);
                }
            }
        }

        info!(
            "Liveness probe finished: {} of {} streams alive",
            surviving.len(),
            total
        );
        surviving
    }

    async fn annotate_quality(&self, mut entries: Vec<PlaylistEntry>) -> Vec<PlaylistEntry> {
        info!(
            "Quality probe: {} streams, concurrency {}, timeout {}s",
            entries.len(),
            self.config.quality_concurrency,
            self.config.quality_timeout_seconds
        );

        let pool = WorkerPool::new(
            self.config.quality_concurrency,
            Duration::from_secs(self.config.quality_timeout_seconds),
        );
        let urls: Vec<String> = entries.iter().map(|e| e.stream_url.clone()).collect();
        let results = pool
            .run(urls, |url| {
                let classifier = Arc::clone(&self.quality);
                async move { classifier.classify(&url).await }
            })
            .await;

        let mut classified = 0usize;
        for (entry, reading) in entries.iter_mut().zip(results) {
            let outcome = entry.probe.get_or_insert(ProbeOutcome {
                alive: true,
                quality: QualityTier::Unknown,
                latency_seconds: None,
            });
            if let Some(reading) = reading {
                outcome.quality = reading.quality;
                outcome.latency_seconds = reading.latency_seconds;
                if let Some(latency) = reading.latency_seconds {
                    entry.display_name = format!("{} ({:.1}s)", entry.display_name, latency);
                }
                classified += 1;
            }
        }

        info!(
            "Quality probe finished: {} of {} streams classified",
            classified,
            entries.len()
        );
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubLiveness;

    #[async_trait]
    impl LivenessChecker for StubLiveness {
        async fn check(&self, url: &str) -> Result<bool, ProbeError> {
            match url {
                u if u.contains("dead") => Ok(false),
                u if u.contains("error") => Err(ProbeError::Timeout {
                    url: u.to_string(),
                }),
                _ => Ok(true),
            }
        }
    }

    struct StubQuality;

    #[async_trait]
    impl QualityClassifier for StubQuality {
        async fn classify(&self, url: &str) -> Result<QualityReading, ProbeError> {
            if url.contains("fail") {
                return Err(ProbeError::Unclassifiable {
                    url: url.to_string(),
                });
            }
            Ok(QualityReading {
                quality: QualityTier::Fhd,
                latency_seconds: Some(1.25),
            })
        }
    }

    fn engine(liveness_enabled: bool, quality_enabled: bool) -> ProbeEngine {
        let config = ProbeConfig {
            liveness_enabled,
            quality_enabled,
            ..ProbeConfig::default()
        };
        ProbeEngine::new(config, Arc::new(StubLiveness), Arc::new(StubQuality))
    }

    #[tokio::test]
    async fn liveness_filtering_drops_dead_and_erroring_streams() {
        let entries = vec![
            PlaylistEntry::new("http://ok/1", "A"),
            PlaylistEntry::new("http://dead/2", "B"),
            PlaylistEntry::new("http://error/3", "C"),
            PlaylistEntry::new("http://ok/4", "D"),
        ];

        let surviving = engine(true, false).run(entries).await;
        let names: Vec<&str> = surviving.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
        assert!(surviving.iter().all(|e| e.probe.unwrap().alive));
    }

    #[tokio::test]
    async fn quality_probe_annotates_tier_and_latency() {
        let entries = vec![PlaylistEntry::new("http://ok/1", "Trans7")];

        let probed = engine(false, true).run(entries).await;
        let outcome = probed[0].probe.unwrap();
        assert_eq!(outcome.quality, QualityTier::Fhd);
        assert_eq!(outcome.latency_seconds, Some(1.25));
        assert_eq!(probed[0].display_name, "Trans7 (1.2s)");
    }

    #[tokio::test]
    async fn failed_quality_probe_keeps_entry_as_unknown() {
        let entries = vec![
            PlaylistEntry::new("http://fail/1", "A"),
            PlaylistEntry::new("http://ok/2", "B"),
        ];

        let probed = engine(false, true).run(entries).await;
        assert_eq!(probed.len(), 2);
        assert_eq!(probed[0].probe.unwrap().quality, QualityTier::Unknown);
        assert_eq!(probed[0].display_name, "A");
        assert_eq!(probed[1].probe.unwrap().quality, QualityTier::Fhd);
    }

    #[tokio::test]
    async fn disabled_probes_leave_entries_untouched() {
        let entries = vec![PlaylistEntry::new("http://dead/1", "A")];
        let probed = engine(false, false).run(entries).await;
        assert_eq!(probed.len(), 1);
        assert_eq!(probed[0].probe, None);
    }
}

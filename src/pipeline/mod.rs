//! Pipeline orchestration
//!
//! The run is a configured sequence of stages over one owned
//! `Vec<PlaylistEntry>`. Every stage completes before the next begins, so
//! stage boundaries are the only points where invariants need to hold, and
//! stages can be reordered through configuration alone.

pub mod rank;

use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::TitleClassifier;
use crate::config::Config;
use crate::epg::{EpgIndexBuilder, EpgMatcher};
use crate::models::{PlaylistEntry, UnmatchedChannel};
use crate::probe::ProbeEngine;
use crate::sources::Fetcher;

pub use rank::rank;

/// One pipeline stage. The configured sequence is run in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Dedup,
    Classify,
    Probe,
    EpgMatch,
    Rank,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Dedup => "dedup",
            Stage::Classify => "classify",
            Stage::Probe => "probe",
            Stage::EpgMatch => "epg_match",
            Stage::Rank => "rank",
        }
    }
}

/// The surviving record set plus everything the run wants to report.
pub struct ConsolidationResult {
    pub entries: Vec<PlaylistEntry>,
    pub unmatched: Vec<UnmatchedChannel>,
}

pub struct Pipeline {
    config: Config,
    classifier: TitleClassifier,
    probe_engine: ProbeEngine,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let classifier = TitleClassifier::new(&config.classifier);
        let probe_engine = ProbeEngine::from_config(&config.probe);
        Self::with_components(config, classifier, probe_engine)
    }

    /// Construction with injected components, for callers that need to swap
    /// the probe engine or classifier.
    pub fn with_components(
        config: Config,
        classifier: TitleClassifier,
        probe_engine: ProbeEngine,
    ) -> Self {
        Self {
            config,
            classifier,
            probe_engine,
        }
    }

    /// Run the configured stage sequence over the record set.
    pub async fn run(
        &self,
        mut entries: Vec<PlaylistEntry>,
        fetcher: &dyn Fetcher,
    ) -> Result<ConsolidationResult> {
        let mut unmatched = Vec::new();

        for stage in &self.config.pipeline.stages {
            let started = Instant::now();
            let before = entries.len();
            info!("Stage '{}' starting with {} records", stage.name(), before);

            match stage {
                Stage::Dedup => {
                    entries = crate::playlist::dedup_by_stream_url(entries);
                }
                Stage::Classify => {
                    self.classifier.apply(&mut entries);
                }
                Stage::Probe => {
                    entries = self.probe_engine.run(entries).await;
                }
                Stage::EpgMatch => {
                    if self.config.epg.enabled && !self.config.epg.sources.is_empty() {
                        let builder = EpgIndexBuilder::new(fetcher)?;
                        let index = builder.build(&self.config.epg).await;
                        let matcher =
                            EpgMatcher::new(index, self.config.epg.similarity_threshold)?;
                        unmatched = matcher.assign_ids(&mut entries);
                    }
                }
                Stage::Rank => {
                    rank(&mut entries);
                }
            }

            info!(
                "Stage '{}' finished: {} -> {} records in {}ms",
                stage.name(),
                before,
                entries.len(),
                started.elapsed().as_millis()
            );
        }

        Ok(ConsolidationResult { entries, unmatched })
    }
}

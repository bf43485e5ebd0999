//! Fuzzy channel-id assignment against the EPG index
//!
//! For each record the display name is normalized (annotation suffixes
//! stripped, whitespace collapsed, lowercased) and scanned against every index
//! key with the similarity ratio. The best-scoring key wins if it clears the
//! threshold; everything else lands in the unmatched list for the diagnostics
//! block. The scan is O(records x index size) and dominates this stage; a
//! candidate-generation index could cut it down but is not needed for
//! correctness.

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info};

use crate::models::{EpgIndex, PlaylistEntry, UnmatchedChannel};
use crate::utils::similarity;

pub struct EpgMatcher {
    index: EpgIndex,
    threshold: f64,
    annotation_regex: Regex,
}

impl EpgMatcher {
    pub fn new(index: EpgIndex, threshold: f64) -> Result<Self> {
        // Latency/quality annotations appended by the probe stage, e.g.
        // "Trans 7 (1.2s)" or "RCTI [HD]".
        let annotation_regex = Regex::new(r"\s*\([^)]*\)|\s*\[[^\]]*\]")?;
        Ok(Self {
            index,
            threshold,
            annotation_regex,
        })
    }

    /// Strip annotation suffixes, collapse whitespace, lowercase.
    pub fn normalize_name(&self, name: &str) -> String {
        let stripped = self.annotation_regex.replace_all(name, "");
        stripped
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .to_lowercase()
    }

    /// Assign the best-matching channel id to every record that clears the
    /// threshold, overwriting any existing `tvg-id`. Returns the channels that
    /// did not match, with their best candidate for diagnostics.
    pub fn assign_ids(&self, entries: &mut [PlaylistEntry]) -> Vec<UnmatchedChannel> {
        info!(
            "Matching {} records against {} EPG names (threshold {})",
            entries.len(),
            self.index.len(),
            self.threshold
        );

        let mut unmatched = Vec::new();
        let mut matched = 0usize;

        for entry in entries.iter_mut() {
            let normalized = self.normalize_name(&entry.display_name);

            let mut best_ratio = 0.0f64;
            let mut best_key: Option<&String> = None;
            for key in self.index.keys() {
                let ratio = similarity::ratio(&normalized, key);
                if ratio > best_ratio {
                    best_ratio = ratio;
                    best_key = Some(key);
                }
            }

            match best_key {
                Some(key) if best_ratio >= self.threshold => {
                    entry.tvg_id = Some(self.index[key].clone());
                    matched += 1;
                }
                _ => {
                    debug!(
                        "No EPG match for '{}' (best {:?} at {:.2})",
                        normalized, best_key, best_ratio
                    );
                    unmatched.push(UnmatchedChannel {
                        normalized_name: normalized,
                        best_candidate: best_key.cloned(),
                        best_ratio,
                    });
                }
            }
        }

        info!(
            "EPG matching finished: {} matched, {} unmatched",
            matched,
            unmatched.len()
        );
        unmatched
    }
}

//! Core data model for the consolidation pipeline
//!
//! A [`PlaylistEntry`] is one channel: its `#EXTINF` metadata, any auxiliary
//! directive lines that must travel with it, and the stream URL that is its
//! identity. The working `Vec<PlaylistEntry>` is created once by the parser and
//! moved stage to stage until serialization.

use serde::{Deserialize, Serialize};

/// One channel from a playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// Unique identity of the entry. Required, non-empty.
    pub stream_url: String,
    /// Human channel name shown after the comma on the `#EXTINF` line.
    pub display_name: String,
    /// `None` means not yet known; `Some("")` is a valid present-but-empty value.
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub tvg_logo: Option<String>,
    pub group_title: Option<String>,
    /// Pass-through lines (license/option directives) re-emitted verbatim, in
    /// original order, immediately before the stream URL.
    pub aux_directives: Vec<String>,
    /// Populated only when probing ran for this entry.
    pub probe: Option<ProbeOutcome>,
}

impl PlaylistEntry {
    pub fn new(stream_url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            stream_url: stream_url.into(),
            display_name: display_name.into(),
            tvg_id: None,
            tvg_name: None,
            tvg_logo: None,
            group_title: None,
            aux_directives: Vec::new(),
            probe: None,
        }
    }

    /// Whether the entry carries a usable EPG id.
    pub fn has_tvg_id(&self) -> bool {
        self.tvg_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Probed latency, or +infinity when unknown (sorts as worst).
    pub fn latency_or_worst(&self) -> f64 {
        self.probe
            .as_ref()
            .and_then(|p| p.latency_seconds)
            .unwrap_or(f64::INFINITY)
    }
}

/// Result of probing one stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub alive: bool,
    pub quality: QualityTier,
    pub latency_seconds: Option<f64>,
}

/// Resolution tier of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    Sd,
    Hd,
    Fhd,
    Unknown,
}

impl QualityTier {
    /// Classify by vertical resolution: <720 SD, <1080 HD, else FHD.
    pub fn from_height(height: u32) -> Self {
        if height < 720 {
            QualityTier::Sd
        } else if height < 1080 {
            QualityTier::Hd
        } else {
            QualityTier::Fhd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Sd => "SD",
            QualityTier::Hd => "HD",
            QualityTier::Fhd => "FHD",
            QualityTier::Unknown => "Unknown",
        }
    }
}

/// Mapping from normalized display name to EPG channel id, merged from all
/// configured sources with last-write-wins on key collision.
pub type EpgIndex = std::collections::HashMap<String, String>;

/// A channel whose best EPG candidate scored below the assignment threshold.
/// Kept for the diagnostics block at the end of the output playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedChannel {
    pub normalized_name: String,
    pub best_candidate: Option<String>,
    pub best_ratio: f64,
}

//! Pluggable stream quality classification
//!
//! The probe engine only knows the [`QualityClassifier`] trait; how a stream's
//! resolution tier is determined is swappable. Two implementations ship:
//! payload sniffing (cheap, looks for literal resolution markers in the first
//! chunk of the body) and ffprobe (accurate, needs the binary on PATH).

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::ProbeError;
use crate::models::QualityTier;

/// One quality measurement for one stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReading {
    pub quality: QualityTier,
    pub latency_seconds: Option<f64>,
}

#[async_trait]
pub trait QualityClassifier: Send + Sync {
    async fn classify(&self, url: &str) -> Result<QualityReading, ProbeError>;
}

/// Classifies by sniffing the streamed response body for resolution markers.
pub struct PayloadSniffer {
    client: reqwest::Client,
    max_bytes: usize,
}

impl PayloadSniffer {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl QualityClassifier for PayloadSniffer {
    async fn classify(&self, url: &str) -> Result<QualityReading, ProbeError> {
        let started = Instant::now();

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ProbeError::Unclassifiable {
                    url: format!("{url}: {e}"),
                })?;

        if !response.status().is_success() {
            return Err(ProbeError::BadStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let mut payload: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProbeError::Unclassifiable {
                url: format!("{url}: {e}"),
            })?;
            payload.extend_from_slice(&chunk);
            if payload.len() >= self.max_bytes {
                break;
            }
        }

        let latency = started.elapsed().as_secs_f64();
        let quality = sniff_resolution(&payload);
        debug!("Sniffed {} bytes from {}: {}", payload.len(), url, quality.as_str());

        Ok(QualityReading {
            quality,
            latency_seconds: Some(latency),
        })
    }
}

/// Look for literal resolution markers in raw payload bytes.
pub fn sniff_resolution(payload: &[u8]) -> QualityTier {
    if contains(payload, b"resolution=\"1920x1080\"") || contains(payload, b"1920x1080") {
        QualityTier::Fhd
    } else if contains(payload, b"resolution=\"1280x720\"") || contains(payload, b"1280x720") {
        QualityTier::Hd
    } else if contains(payload, b"resolution=\"640x360\"") || contains(payload, b"640x360") {
        QualityTier::Sd
    } else {
        QualityTier::Unknown
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Classifies by asking ffprobe for the first video stream's dimensions.
pub struct FfprobeClassifier;

#[async_trait]
impl QualityClassifier for FfprobeClassifier {
    async fn classify(&self, url: &str) -> Result<QualityReading, ProbeError> {
        let started = Instant::now();

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "default=nw=1:nk=1",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::Ffprobe {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Ffprobe {
                message: format!("exit status {} for {}", output.status, url),
            });
        }

        let latency = started.elapsed().as_secs_f64();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let quality = parse_ffprobe_dimensions(&stdout)
            .map(|(_, height)| QualityTier::from_height(height))
            .unwrap_or(QualityTier::Unknown);

        Ok(QualityReading {
            quality,
            latency_seconds: Some(latency),
        })
    }
}

/// Parse `-of default=nw=1:nk=1` output: one value per line, width then height.
fn parse_ffprobe_dimensions(stdout: &str) -> Option<(u32, u32)> {
    let mut values = stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok());
    let width = values.next()?;
    let height = values.next()?;
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_resolution_markers() {
        assert_eq!(sniff_resolution(b"...1920x1080..."), QualityTier::Fhd);
        assert_eq!(
            sniff_resolution(b"#EXT-X-STREAM-INF resolution=\"1280x720\""),
            QualityTier::Hd
        );
        assert_eq!(sniff_resolution(b"640x360 mp4"), QualityTier::Sd);
        assert_eq!(sniff_resolution(b"no markers here"), QualityTier::Unknown);
        assert_eq!(sniff_resolution(b""), QualityTier::Unknown);
    }

    #[test]
    fn fhd_marker_wins_when_several_present() {
        assert_eq!(
            sniff_resolution(b"640x360 1280x720 1920x1080"),
            QualityTier::Fhd
        );
    }

    #[test]
    fn parses_ffprobe_output() {
        assert_eq!(parse_ffprobe_dimensions("1920\n1080\n"), Some((1920, 1080)));
        assert_eq!(parse_ffprobe_dimensions("1280\n720"), Some((1280, 720)));
        assert_eq!(parse_ffprobe_dimensions("garbage"), None);
        assert_eq!(parse_ffprobe_dimensions("1920"), None);
    }
}

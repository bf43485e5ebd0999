//! Error type definitions for the playlist consolidator
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system. Almost everything here is recovered
//! locally: a failed source contributes nothing, a failed probe marks one
//! record, a below-threshold match is a normal outcome. Only an unreadable
//! input document at the very first parse step is fatal to a run.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching or reading an external document failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The input playlist could not be parsed at all
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Probing a single stream failed
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors reading inputs or writing the output playlist
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors fetching or reading source documents (playlists, EPG feeds)
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request did not complete within the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP error: {status} from {url}")]
    Http { status: u16, url: String },

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },

    /// Local file could not be read
    #[error("Unreadable file: {path} - {message}")]
    Unreadable { path: String, message: String },
}

/// Errors parsing a playlist document
///
/// Record-level anomalies (malformed attribute, missing URL) are not errors;
/// the parser drops or degrades the offending record and continues.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No input document yielded a single record
    #[error("No parseable records in any input")]
    NoRecords,
}

/// Per-record probe failures, converted to negative/unknown results
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe timed out: {url}")]
    Timeout { url: String },

    #[error("Stream answered {status}: {url}")]
    BadStatus { status: u16, url: String },

    #[error("Quality payload not classifiable: {url}")]
    Unclassifiable { url: String },

    #[error("ffprobe failed: {message}")]
    Ffprobe { message: String },
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a transport failure error
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }
}

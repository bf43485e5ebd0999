//! Playlist consolidation and enrichment engine
//!
//! Merges multiple IPTV playlists into one deduplicated, quality-annotated,
//! EPG-linked playlist. The heart of the crate is [`pipeline::Pipeline`]: a
//! configured sequence of stages over a single owned record collection, from
//! parse to canonical re-serialization.

pub mod classify;
pub mod config;
pub mod epg;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod playlist;
pub mod probe;
pub mod sources;
pub mod utils;

//! Stream-identity deduplication
//!
//! Later sources in a multi-feed merge are assumed more current, so when two
//! records share a stream URL the most recently seen one wins. Surviving
//! records keep first-seen order to make output diffs stable across runs.

use std::collections::HashMap;

use tracing::debug;

use crate::models::PlaylistEntry;

pub fn dedup_by_stream_url(entries: Vec<PlaylistEntry>) -> Vec<PlaylistEntry> {
    let before = entries.len();
    let mut position_of: HashMap<String, usize> = HashMap::new();
    let mut surviving: Vec<PlaylistEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = entry.stream_url.trim().to_string();
        match position_of.get(&key) {
            Some(&position) => surviving[position] = entry,
            None => {
                position_of.insert(key, surviving.len());
                surviving.push(entry);
            }
        }
    }

    if surviving.len() < before {
        debug!(
            "Deduplication removed {} of {} records",
            before - surviving.len(),
            before
        );
    }

    surviving
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, group: &str) -> PlaylistEntry {
        let mut entry = PlaylistEntry::new(url, "Ch");
        entry.group_title = Some(group.to_string());
        entry
    }

    #[test]
    fn later_record_wins() {
        let deduped = dedup_by_stream_url(vec![
            entry("http://x/1", "Sports"),
            entry("http://x/1", "News"),
        ]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].group_title.as_deref(), Some("News"));
    }

    #[test]
    fn survivors_keep_first_seen_order() {
        let deduped = dedup_by_stream_url(vec![
            entry("http://x/1", "a"),
            entry("http://x/2", "b"),
            entry("http://x/1", "c"),
            entry("http://x/3", "d"),
        ]);

        let urls: Vec<&str> = deduped.iter().map(|e| e.stream_url.as_str()).collect();
        assert_eq!(urls, vec!["http://x/1", "http://x/2", "http://x/3"]);
        assert_eq!(deduped[0].group_title.as_deref(), Some("c"));
    }

    #[test]
    fn urls_are_trimmed_before_comparison() {
        let deduped = dedup_by_stream_url(vec![
            entry("http://x/1", "a"),
            entry("  http://x/1  ", "b"),
        ]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].group_title.as_deref(), Some("b"));
    }
}

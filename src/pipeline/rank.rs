//! Deterministic ordering of the final record set
//!
//! Records with an EPG id come first, then fastest probed latency; entries
//! without a latency measurement sort as worst. The sort must be stable:
//! most entries share a key (no id, no latency) and keep their input order.

use crate::models::PlaylistEntry;

pub fn rank(entries: &mut [PlaylistEntry]) {
    entries.sort_by(|a, b| {
        let a_missing_id = !a.has_tvg_id();
        let b_missing_id = !b.has_tvg_id();
        a_missing_id
            .cmp(&b_missing_id)
            .then_with(|| a.latency_or_worst().total_cmp(&b.latency_or_worst()))
    });
}

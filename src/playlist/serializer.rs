//! [`PlaylistEntry`] list -> canonical playlist text
//!
//! One block per record: the `#EXTINF:-1` line with attributes in fixed order
//! (`tvg-name`, `tvg-id`, `tvg-logo`, `group-title`, skipping empty values),
//! the auxiliary directives verbatim, the stream URL, then exactly one blank
//! line. An optional diagnostics block of unmatched EPG candidates follows.

use std::fmt::Write;

use crate::models::{PlaylistEntry, UnmatchedChannel};

pub fn serialize_playlist(entries: &[PlaylistEntry]) -> String {
    let mut out = String::from("#EXTM3U\n");

    for entry in entries {
        let mut attributes = Vec::new();
        for (key, value) in [
            ("tvg-name", &entry.tvg_name),
            ("tvg-id", &entry.tvg_id),
            ("tvg-logo", &entry.tvg_logo),
            ("group-title", &entry.group_title),
        ] {
            if let Some(value) = value {
                if !value.is_empty() {
                    attributes.push(format!("{key}=\"{value}\""));
                }
            }
        }

        if attributes.is_empty() {
            let _ = writeln!(out, "#EXTINF:-1,{}", entry.display_name);
        } else {
            let _ = writeln!(
                out,
                "#EXTINF:-1 {},{}",
                attributes.join(" "),
                entry.display_name
            );
        }

        for directive in &entry.aux_directives {
            out.push_str(directive);
            out.push('\n');
        }

        out.push_str(&entry.stream_url);
        out.push_str("\n\n");
    }

    out
}

/// Serialize with a trailing diagnostics section listing channels whose best
/// EPG candidate scored above `report_threshold` but below the assignment
/// threshold, sorted by descending similarity.
pub fn serialize_playlist_with_diagnostics(
    entries: &[PlaylistEntry],
    unmatched: &[UnmatchedChannel],
    report_threshold: f64,
) -> String {
    let mut out = serialize_playlist(entries);

    let mut reportable: Vec<&UnmatchedChannel> = unmatched
        .iter()
        .filter(|u| u.best_ratio > report_threshold)
        .collect();
    if reportable.is_empty() {
        return out;
    }
    reportable.sort_by(|a, b| b.best_ratio.total_cmp(&a.best_ratio));

    out.push_str("# Unmatched Channels:\n");
    for channel in reportable {
        let _ = writeln!(
            out,
            "# Channel: {}, Best Match: {}, Similarity: {:.2}",
            channel.normalized_name,
            channel.best_candidate.as_deref().unwrap_or("-"),
            channel.best_ratio
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::parser::parse_playlist;

    fn sample_entry() -> PlaylistEntry {
        let mut entry = PlaylistEntry::new("http://x/1", "Trans7");
        entry.tvg_id = Some("Trans7.id".to_string());
        entry.tvg_name = Some("Trans 7".to_string());
        entry.tvg_logo = Some("http://logo/7.png".to_string());
        entry.group_title = Some("Sports".to_string());
        entry
    }

    #[test]
    fn canonical_attribute_order() {
        let out = serialize_playlist(&[sample_entry()]);
        assert!(out.contains(
            "#EXTINF:-1 tvg-name=\"Trans 7\" tvg-id=\"Trans7.id\" tvg-logo=\"http://logo/7.png\" group-title=\"Sports\",Trans7\n"
        ));
    }

    #[test]
    fn empty_attributes_are_omitted() {
        let mut entry = PlaylistEntry::new("http://x/1", "Trans7");
        entry.tvg_id = Some(String::new());
        entry.group_title = Some("Sports".to_string());

        let out = serialize_playlist(&[entry]);
        assert!(out.contains("#EXTINF:-1 group-title=\"Sports\",Trans7\n"));
        assert!(!out.contains("tvg-id"));
    }

    #[test]
    fn one_blank_line_between_records() {
        let mut second = sample_entry();
        second.stream_url = "http://x/2".to_string();
        let out = serialize_playlist(&[sample_entry(), second]);

        assert!(out.contains("http://x/1\n\n#EXTINF"));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn aux_directives_precede_url() {
        let mut entry = sample_entry();
        entry
            .aux_directives
            .push("#EXTVLCOPT:http-user-agent=VLC".to_string());

        let out = serialize_playlist(&[entry]);
        assert!(out.contains(",Trans7\n#EXTVLCOPT:http-user-agent=VLC\nhttp://x/1\n"));
    }

    #[test]
    fn round_trip_preserves_records() {
        let mut with_aux = sample_entry();
        with_aux
            .aux_directives
            .push("#KODIPROP:inputstream.adaptive.license_type=clearkey".to_string());
        let mut minimal = PlaylistEntry::new("http://x/2", "RCTI");
        minimal.group_title = Some("National".to_string());
        let entries = vec![with_aux, minimal];

        let reparsed = parse_playlist(&serialize_playlist(&entries));
        assert_eq!(reparsed, entries);
    }

    #[test]
    fn diagnostics_sorted_by_descending_similarity_and_filtered() {
        let unmatched = vec![
            UnmatchedChannel {
                normalized_name: "trans tv".to_string(),
                best_candidate: Some("trans 7".to_string()),
                best_ratio: 0.78,
            },
            UnmatchedChannel {
                normalized_name: "obscure tv".to_string(),
                best_candidate: Some("o channel".to_string()),
                best_ratio: 0.40,
            },
            UnmatchedChannel {
                normalized_name: "metro news".to_string(),
                best_candidate: Some("metro tv".to_string()),
                best_ratio: 0.79,
            },
        ];

        let out = serialize_playlist_with_diagnostics(&[sample_entry()], &unmatched, 0.75);
        let metro = out.find("metro news").unwrap();
        let trans = out.find("trans tv").unwrap();
        assert!(metro < trans);
        assert!(!out.contains("obscure tv"));
    }
}

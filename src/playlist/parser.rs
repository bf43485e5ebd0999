//! Playlist text -> [`PlaylistEntry`] list
//!
//! This is not a general M3U parser. It tolerates exactly the subset of
//! directives seen in the wild feeds this tool consolidates: an `#EXTINF`
//! metadata line, an optional run of license/option directives, and the
//! stream URL. Anything malformed degrades per record and never aborts the
//! document.

use tracing::debug;

use crate::models::PlaylistEntry;

/// Directive prefixes captured verbatim between the `#EXTINF` line and the URL.
const AUX_DIRECTIVE_PREFIXES: [&str; 3] = [
    "#KODIPROP:inputstream.adaptive.license_type",
    "#KODIPROP:inputstream.adaptive.license_key",
    "#EXTVLCOPT:",
];

fn is_aux_directive(line: &str) -> bool {
    AUX_DIRECTIVE_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Parse a playlist document into entries.
///
/// An `#EXTINF` line begins a record; the first non-empty, non-`#` line after
/// it is the stream URL and closes it. A record still open at end-of-input
/// never got a URL and is discarded. Unknown `#` lines and stray URL lines
/// outside any record are skipped.
pub fn parse_playlist(content: &str) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<PlaylistEntry> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim_end_matches('\r');

        if line.starts_with("#EXTINF") {
            if let Some(dropped) = pending.replace(parse_extinf_line(line)) {
                debug!(
                    "Dropping incomplete record without URL: {}",
                    dropped.display_name
                );
            }
            continue;
        }

        if is_aux_directive(line) {
            if let Some(entry) = pending.as_mut() {
                entry.aux_directives.push(line.to_string());
            }
            continue;
        }

        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        // Anything else is the stream URL.
        match pending.take() {
            Some(mut entry) => {
                entry.stream_url = line.trim().to_string();
                entries.push(entry);
            }
            None => debug!("Skipping URL line outside any record: {}", line.trim()),
        }
    }

    if let Some(dropped) = pending {
        debug!(
            "Dropping incomplete record at end of input: {}",
            dropped.display_name
        );
    }

    entries
}

/// Parse one `#EXTINF` line into an entry with an empty stream URL.
///
/// The display name is everything after the first comma that sits outside
/// quotes; the attribute section before it goes through a single quote-aware
/// scanner instead of one regex per field.
fn parse_extinf_line(line: &str) -> PlaylistEntry {
    let rest = line
        .strip_prefix("#EXTINF:")
        .or_else(|| line.strip_prefix("#EXTINF"))
        .unwrap_or(line);

    let (attributes_part, display_name) = split_at_display_name_comma(rest);
    let mut entry = PlaylistEntry::new(String::new(), display_name.trim());

    for (key, value) in parse_attributes(attributes_part) {
        match key.as_str() {
            "tvg-id" => entry.tvg_id = Some(value),
            "tvg-name" => entry.tvg_name = Some(value),
            "tvg-logo" => entry.tvg_logo = Some(value),
            "group-title" => entry.group_title = Some(value),
            // Unrecognized keys are ignored, not errors.
            _ => {}
        }
    }

    entry
}

/// Split the `#EXTINF` remainder into attribute section and display name.
///
/// The separator is the first comma outside quotes that does not introduce
/// another `key="value"` attribute; some feeds separate attributes with commas
/// instead of spaces and the display name still comes last.
fn split_at_display_name_comma(text: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (pos, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let rest = &text[pos + 1..];
                if !looks_like_attribute(rest) {
                    return (&text[..pos], rest);
                }
            }
            _ => {}
        }
    }
    // No display-name comma; the whole line is treated as attributes.
    (text, "")
}

fn looks_like_attribute(rest: &str) -> bool {
    let rest = rest.trim_start();
    let key_end = rest
        .char_indices()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '-' || *c == '_')
        .last()
        .map(|(pos, c)| pos + c.len_utf8());
    matches!(key_end, Some(end) if rest[end..].starts_with('='))
}

/// Scan `key="value"` pairs out of the attribute section.
///
/// A quoted value may contain spaces and commas. A quote left open at the end
/// of the line makes that attribute malformed; it is dropped and scanning
/// stops, leaving every earlier attribute intact.
fn parse_attributes(attributes: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = attributes.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        // Commas double as attribute separators in some feeds.
        if ch.is_whitespace() || ch == ',' {
            continue;
        }

        // Key runs until '='.
        let mut key_end = attributes.len();
        let mut found_eq = false;
        for (pos, c) in attributes[start..].char_indices() {
            if c == '=' {
                key_end = start + pos;
                found_eq = true;
                break;
            }
            if c.is_whitespace() || c == ',' {
                key_end = start + pos;
                break;
            }
        }
        let key = attributes[start..key_end].trim().to_string();

        // Advance the iterator past the key.
        while let Some(&(pos, _)) = chars.peek() {
            if pos < key_end {
                chars.next();
            } else {
                break;
            }
        }

        if !found_eq {
            // Bare token (e.g. the leading "-1" duration); skip it.
            continue;
        }
        chars.next(); // consume '='

        let value = match chars.peek() {
            Some(&(_, '"')) => {
                chars.next(); // opening quote
                let mut value = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    debug!("Attribute '{}' has no closing quote, dropped", key);
                    break;
                }
                value
            }
            _ => {
                // Unquoted value runs to the next whitespace.
                let mut value = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || c == ',' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
                value
            }
        };

        if !key.is_empty() {
            attrs.push((key, value));
        }
    }

    attrs
}

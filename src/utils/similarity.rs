//! String similarity scoring for fuzzy EPG name matching
//!
//! Produces a ratio in [0, 1] between a channel's normalized display name and
//! an EPG index key. Several metrics are combined because channel names mix
//! short tokens ("7", "TV") with longer words; word overlap alone punishes
//! reorderings too little and edit distance alone punishes them too much.

use std::collections::HashSet;

/// Combined similarity ratio in [0, 1].
///
/// Weighted blend of Jaro-Winkler, Levenshtein and word-overlap similarity,
/// with word overlap weighted highest for channel-name shaped strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let jw = jaro_winkler(a, b);
    let lev = levenshtein_similarity(a, b);
    let words = word_overlap(a, b);

    (jw * 0.3 + lev * 0.3 + words * 0.4).min(1.0)
}

/// Jaro-Winkler similarity (simplified implementation).
fn jaro_winkler(s1: &str, s2: &str) -> f64 {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() && s2_chars.is_empty() {
        return 1.0;
    }
    if s1_chars.is_empty() || s2_chars.is_empty() {
        return 0.0;
    }

    let match_window = (s1_chars.len().max(s2_chars.len()) / 2).saturating_sub(1);
    let mut s1_matches = vec![false; s1_chars.len()];
    let mut s2_matches = vec![false; s2_chars.len()];
    let mut matches = 0;

    for i in 0..s1_chars.len() {
        let start = i.saturating_sub(match_window);
        let end = (i + match_window + 1).min(s2_chars.len());

        for j in start..end {
            if s2_matches[j] || s1_chars[i] != s2_chars[j] {
                continue;
            }
            s1_matches[i] = true;
            s2_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0;
    let mut k = 0;
    for i in 0..s1_chars.len() {
        if !s1_matches[i] {
            continue;
        }
        while !s2_matches[k] {
            k += 1;
        }
        if s1_chars[i] != s2_chars[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let jaro = (matches as f64 / s1_chars.len() as f64
        + matches as f64 / s2_chars.len() as f64
        + (matches as f64 - transpositions as f64 / 2.0) / matches as f64)
        / 3.0;

    // Winkler prefix bonus
    let prefix_length = s1_chars
        .iter()
        .zip(s2_chars.iter())
        .take(4)
        .take_while(|(a, b)| a == b)
        .count() as f64;

    jaro + (0.1 * prefix_length * (1.0 - jaro))
}

fn levenshtein_similarity(s1: &str, s2: &str) -> f64 {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let max_len = len1.max(len2);
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(s1, s2) as f64 / max_len as f64)
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

fn word_overlap(s1: &str, s2: &str) -> f64 {
    let words1: HashSet<&str> = s1.split_whitespace().collect();
    let words2: HashSet<&str> = s2.split_whitespace().collect();

    if words1.is_empty() && words2.is_empty() {
        return 1.0;
    }

    let intersection = words1.intersection(&words2).count();
    let union = words1.union(&words2).count();

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}

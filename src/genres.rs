//! Genre label cleanup.
//!
//! Catalog pages list the same genre under several spellings ("Sci-Fi",
//! "Science Fiction", "science fiction"). [`cleanup`] collapses those into a
//! single label and drops duplicates, keeping first-seen order.

use std::collections::HashSet;

/// Spellings that map onto one canonical label. Keys are comparison keys
/// (see [`genre_key`]).
const ALIASES: &[(&str, &str)] = &[
    ("scifi", "Science Fiction"),
    ("sliceoflife", "Slice of Life"),
    ("shonen", "Shounen"),
    ("shojo", "Shoujo"),
    ("mechas", "Mecha"),
    ("romcom", "Romantic Comedy"),
    ("martialarts", "Martial Arts"),
];

/// Comparison key: lowercase alphanumerics only.
fn genre_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trim and collapse inner whitespace.
fn tidy(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical(label: &str) -> Option<(String, String)> {
    let display = tidy(label);
    let key = genre_key(&display);
    if key.is_empty() {
        return None;
    }
    match ALIASES.iter().find(|(alias, _)| *alias == key) {
        Some((_, name)) => Some((genre_key(name), (*name).to_string())),
        None => Some((key, display)),
    }
}

/// Remove empty, duplicate, and near-duplicate genre labels in place.
///
/// Idempotent: running it on its own output changes nothing.
pub fn cleanup(genres: &mut Vec<String>) {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(genres.len());

    for label in genres.drain(..) {
        if let Some((key, display)) = canonical(&label) {
            if seen.insert(key) {
                cleaned.push(display);
            }
        }
    }

    *genres = cleaned;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(input: &[&str]) -> Vec<String> {
        let mut genres: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        cleanup(&mut genres);
        genres
    }

    #[test]
    fn removes_exact_duplicates() {
        assert_eq!(cleaned(&["Action", "Drama", "Action"]), vec!["Action", "Drama"]);
    }

    #[test]
    fn removes_case_and_punctuation_variants() {
        assert_eq!(
            cleaned(&["Comedy", "comedy", "  COMEDY ", "Coming-of-Age", "coming of age"]),
            vec!["Comedy", "Coming-of-Age"]
        );
    }

    #[test]
    fn maps_aliases_to_canonical_label() {
        assert_eq!(
            cleaned(&["Sci-Fi", "Science Fiction", "science fiction", "Shonen", "Shounen"]),
            vec!["Science Fiction", "Shounen"]
        );
    }

    #[test]
    fn unaliased_labels_keep_first_seen_text() {
        assert_eq!(
            cleaned(&["seinen", "Seinen", "SUPERNATURAL", "Supernatural"]),
            vec!["seinen", "SUPERNATURAL"]
        );
    }

    #[test]
    fn drops_empty_labels() {
        assert_eq!(cleaned(&["", "   ", "-", "Horror"]), vec!["Horror"]);
    }

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(cleaned(&["Slice   of\tLife"]), vec!["Slice of Life"]);
    }

    #[test]
    fn is_idempotent() {
        let inputs: &[&[&str]] = &[
            &["Action", "action", "Sci-Fi", "SciFi", " Drama "],
            &["Romcom", "Romantic Comedy", "Mechas", "mecha", "Slice-of-Life"],
            &[],
            &["Ünïcode", "ünïcode", "Psychological"],
        ];
        for input in inputs {
            let once = cleaned(input);
            let mut twice = once.clone();
            cleanup(&mut twice);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}

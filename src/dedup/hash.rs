use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use super::normalize::normalize_text;

/// Generates the identity hash used for exact duplicate detection.
///
/// The digest covers the normalized title, the normalized venue (empty
/// string when absent), the ISO-8601 event date, and the normalized city,
/// joined with `|`. Records that differ only in capitalization or
/// whitespace collapse to the same 64-char hex digest, stable across
/// process runs.
pub fn generate_deduplication_hash(
    title: &str,
    event_date: NaiveDate,
    destination_city: &str,
    venue: Option<&str>,
) -> String {
    let normalized_title = normalize_text(title);
    let normalized_city = normalize_text(destination_city);
    let normalized_venue = venue.map(normalize_text).unwrap_or_default();

    let hash_input = format!(
        "{}|{}|{}|{}",
        normalized_title,
        normalized_venue,
        event_date.format("%Y-%m-%d"),
        normalized_city
    );

    let digest = Sha256::digest(hash_input.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_event_same_hash() {
        let a = generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        let b = generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let a = generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        let b =
            generate_deduplication_hash("SUMMER   FESTIVAL", date(2025, 7, 15), "lisbon", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_title_different_hash() {
        let a = generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        let b = generate_deduplication_hash("Winter Festival", date(2025, 7, 15), "Lisbon", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_date_different_hash() {
        let a = generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        let b = generate_deduplication_hash("Summer Festival", date(2025, 7, 16), "Lisbon", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_venue_changes_hash() {
        let without =
            generate_deduplication_hash("Summer Festival", date(2025, 7, 15), "Lisbon", None);
        let with = generate_deduplication_hash(
            "Summer Festival",
            date(2025, 7, 15),
            "Lisbon",
            Some("City Park"),
        );
        assert_ne!(without, with);

        // Normalized venue spellings agree
        let with_other_case = generate_deduplication_hash(
            "Summer Festival",
            date(2025, 7, 15),
            "Lisbon",
            Some("CITY  PARK"),
        );
        assert_eq!(with, with_other_case);
    }
}

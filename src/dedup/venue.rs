//! Heuristic venue extraction from free-form event descriptions.
//!
//! Scrapers frequently omit an explicit venue field but mention it in the
//! description ("Live at Blue Note Club on Friday"). Each heuristic is a
//! pure function; the extractor evaluates its configured list in priority
//! order and returns the first hit.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single pure extraction heuristic
pub type VenueHeuristic = fn(&str) -> Option<String>;

static AT_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bat\s+([A-Z][A-Za-z\s&'-]+?)(?:\s+(?:on|in|at|during|for|from)|[-,.|]|$)")
        .unwrap()
});

static LABELED_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:location|venue|place):\s*([A-Z][A-Za-z\s&'-]+?)(?:\s*[-,.|]|$)").unwrap()
});

static LEADING_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z\s&'-]+?)\s*[-\u{2013}\u{2014}]").unwrap());

/// `"at <Capitalized phrase>"`, stopping at a following preposition or
/// punctuation.
pub fn extract_at_phrase(text: &str) -> Option<String> {
    AT_PHRASE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Explicit `location:` / `venue:` / `place:` prefix, case-insensitive.
pub fn extract_labeled_location(text: &str) -> Option<String> {
    LABELED_LOCATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// A leading `"<Capitalized phrase> -"` pattern. Accepted only when the
/// phrase is 3-49 characters with an internal space, which filters out
/// single-word leads like "Tickets -".
pub fn extract_leading_phrase(text: &str) -> Option<String> {
    let venue = LEADING_PHRASE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())?;

    if venue.len() > 2 && venue.len() < 50 && venue.contains(' ') {
        Some(venue)
    } else {
        None
    }
}

/// The default priority order for heuristics
pub fn default_heuristics() -> Vec<VenueHeuristic> {
    vec![extract_at_phrase, extract_labeled_location, extract_leading_phrase]
}

/// Evaluates an ordered list of heuristics against free text.
pub struct VenueExtractor {
    heuristics: Vec<VenueHeuristic>,
}

impl Default for VenueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VenueExtractor {
    pub fn new() -> Self {
        Self::with_heuristics(default_heuristics())
    }

    pub fn with_heuristics(heuristics: Vec<VenueHeuristic>) -> Self {
        Self { heuristics }
    }

    /// Returns the first heuristic match, or None when nothing applies.
    pub fn extract(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.heuristics.iter().find_map(|heuristic| heuristic(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_at_pattern() {
        let extractor = VenueExtractor::new();
        assert_eq!(
            extractor.extract("Join us at Blue Note Club on Friday"),
            Some("Blue Note Club".to_string())
        );
        assert_eq!(
            extractor.extract("Concert at Parque da Cidade, free entry"),
            Some("Parque da Cidade".to_string())
        );
    }

    #[test]
    fn test_extract_labeled_location() {
        let extractor = VenueExtractor::new();
        assert_eq!(
            extractor.extract("Family day out. Venue: Gulbenkian Garden - bring snacks"),
            Some("Gulbenkian Garden".to_string())
        );
        assert_eq!(
            extractor.extract("location: Casa da Musica"),
            Some("Casa da Musica".to_string())
        );
    }

    #[test]
    fn test_extract_leading_phrase() {
        assert_eq!(
            extract_leading_phrase("Altice Arena - the biggest show of the summer"),
            Some("Altice Arena".to_string())
        );
        // Single-word leads are rejected
        assert_eq!(extract_leading_phrase("Tickets - on sale now"), None);
    }

    #[test]
    fn test_priority_order() {
        // The at-phrase heuristic wins over the leading-phrase one
        let extractor = VenueExtractor::new();
        assert_eq!(
            extractor.extract("City Hall - gather at Riverside Park for the parade"),
            Some("Riverside Park".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        let extractor = VenueExtractor::new();
        assert_eq!(extractor.extract("a quiet afternoon with no location hints"), None);
        assert_eq!(extractor.extract(""), None);
        assert_eq!(extractor.extract("   "), None);
    }

    #[test]
    fn test_custom_heuristic_list() {
        let extractor = VenueExtractor::with_heuristics(vec![extract_labeled_location]);
        assert_eq!(extractor.extract("Dinner at Faro Beach Club tonight"), None);
        assert_eq!(
            extractor.extract("Place: Faro Beach Club"),
            Some("Faro Beach Club".to_string())
        );
    }
}

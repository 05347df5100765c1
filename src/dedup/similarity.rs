use rapidfuzz::distance::indel;

use super::normalize::normalize_text;
use crate::domain::CandidateEvent;

/// Similarity ratio between two event titles, in [0, 1].
///
/// Both titles are normalized first; an empty side scores 0.0. The ratio
/// is the indel-normalized edit similarity over the character sequences,
/// symmetric and 1.0 only for post-normalization equality.
pub fn title_similarity(title_a: &str, title_b: &str) -> f64 {
    let norm_a = normalize_text(title_a);
    let norm_b = normalize_text(title_b);

    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }

    if norm_a == norm_b {
        return 1.0;
    }

    indel::normalized_similarity(norm_a.chars(), norm_b.chars())
}

/// Whether two candidates are likely the same real-world event.
///
/// Date and city are hard gates; the title is the only fuzzy dimension.
pub fn are_events_similar(a: &CandidateEvent, b: &CandidateEvent, threshold: f64) -> bool {
    if a.event_date != b.event_date {
        return false;
    }

    if normalize_text(&a.destination_city) != normalize_text(&b.destination_city) {
        return false;
    }

    title_similarity(&a.title, &b.title) >= threshold
}

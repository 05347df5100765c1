use crate::domain::{CandidateEvent, MergedEvent};

/// Wraps a single enriched candidate as a merged record of its own.
pub fn singleton(event: CandidateEvent, deduplication_hash: String) -> MergedEvent {
    let sources = vec![event.source.clone()];
    let urls = event
        .url
        .iter()
        .filter(|u| !u.is_empty())
        .cloned()
        .collect();

    MergedEvent {
        event,
        deduplication_hash,
        sources,
        urls,
        duplicate_count: 1,
    }
}

/// Merges a group of records that share one identity into a single
/// representative.
///
/// The representative is the most complete member: longest description
/// first, then venue presence, then url presence; the earliest member wins
/// ties. Provenance lists are unioned in first-seen order and
/// `duplicate_count` sums the constituents. The representative's own
/// scalar fields are left untouched; backfilling gaps from the persisted
/// row happens at the persistence layer.
///
/// Returns None only for an empty group.
pub fn merge_group(mut group: Vec<MergedEvent>) -> Option<MergedEvent> {
    if group.len() <= 1 {
        return group.pop();
    }

    let mut best_idx = 0;
    let mut best_key = completeness_key(&group[0].event);
    for (idx, member) in group.iter().enumerate().skip(1) {
        let key = completeness_key(&member.event);
        if key > best_key {
            best_key = key;
            best_idx = idx;
        }
    }

    let mut sources: Vec<String> = Vec::new();
    let mut urls: Vec<String> = Vec::new();
    let mut duplicate_count = 0;

    for member in &group {
        for source in &member.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        for url in &member.urls {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        duplicate_count += member.duplicate_count;
    }

    let best = group.swap_remove(best_idx);

    Some(MergedEvent {
        event: best.event,
        deduplication_hash: best.deduplication_hash,
        sources,
        urls,
        duplicate_count,
    })
}

/// Completeness ranking: description length, venue presence, url presence
fn completeness_key(event: &CandidateEvent) -> (usize, bool, bool) {
    (
        event.description.as_deref().map(str::len).unwrap_or(0),
        event.venue.is_some(),
        event.url.is_some(),
    )
}

//! Client-side filter view over the cached event collection.
//!
//! The query never leaves the client. Matching is a case-insensitive
//! substring test against the title and the [`SEARCHABLE_ATTRIBUTES`] that
//! are present as JSON strings.

use crate::event::Event;

/// Attributes searched in addition to the title.
pub const SEARCHABLE_ATTRIBUTES: &[&str] = &["description", "location"];

/// Derive the displayed subset of `events` for `query`.
///
/// An empty or whitespace-only query returns the input unchanged. The result
/// is always a subsequence of `events` in input order.
pub fn filter(events: &[Event], query: &str) -> Vec<Event> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|event| matches(event, &needle))
        .cloned()
        .collect()
}

/// Searchable text fields of an event, title first.
pub fn searchable_fields(event: &Event) -> impl Iterator<Item = &str> {
    std::iter::once(event.title.as_str()).chain(
        SEARCHABLE_ATTRIBUTES
            .iter()
            .filter_map(|key| event.attribute_str(key)),
    )
}

/// `needle` must already be trimmed and lowercased.
pub(crate) fn matches(event: &Event, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    searchable_fields(event).any(|field| field.to_lowercase().contains(needle))
}

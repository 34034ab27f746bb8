// Text search over names, descriptions and rendered visit dates
use serde::{Deserialize, Serialize};

use crate::dataset::Place;
use crate::dates::{searchable_renderings, visit_summary};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS: usize = 10;

/// Matching rule used by "jump to first match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JumpPolicy {
    /// Name or space-joined raw date codes.
    #[default]
    NameAndCodes,
    /// Same matcher as the result list.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub min_query_len: usize,
    pub max_results: usize,
    pub jump_policy: JumpPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: MIN_QUERY_LEN,
            max_results: MAX_RESULTS,
            jump_policy: JumpPolicy::default(),
        }
    }
}

/// One row of the result list.
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub place: &'a Place,
    pub summary: String,
}

/// Lowercased, trimmed query; None when too short to search.
fn normalize(query: &str, min_len: usize) -> Option<String> {
    let q = query.trim().to_lowercase();
    (q.chars().count() >= min_len).then_some(q)
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Incremental matcher: name, details, history and every date rendering.
pub fn matches_full(place: &Place, query: &str) -> bool {
    contains(Some(&place.name), query)
        || contains(place.details.as_deref(), query)
        || contains(place.history.as_deref(), query)
        || place.visit_dates.iter().any(|c| searchable_renderings(*c).contains(query))
}

/// Enter-key matcher: name or the raw codes joined by spaces.
pub fn matches_name_and_codes(place: &Place, query: &str) -> bool {
    if contains(Some(&place.name), query) {
        return true;
    }
    let joined = place.visit_dates.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ");
    joined.contains(query)
}

/// Results in dataset order, capped at `max_results`.
pub fn search<'a>(places: &'a [Place], query: &str, settings: &SearchSettings) -> Vec<SearchHit<'a>> {
    let Some(q) = normalize(query, settings.min_query_len) else {
        return Vec::new();
    };
    places
        .iter()
        .filter(|p| matches_full(p, &q))
        .take(settings.max_results)
        .map(|place| SearchHit { place, summary: visit_summary(&place.visit_dates) })
        .collect()
}

/// First place matched under the configured jump policy, without a result cap.
pub fn first_match<'a>(places: &'a [Place], query: &str, settings: &SearchSettings) -> Option<&'a Place> {
    let q = normalize(query, settings.min_query_len)?;
    places.iter().find(|p| match settings.jump_policy {
        JumpPolicy::NameAndCodes => matches_name_and_codes(p, &q),
        JumpPolicy::Full => matches_full(p, &q),
    })
}

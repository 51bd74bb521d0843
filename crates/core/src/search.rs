use crate::models::{QueryFilters, SearchIndexEntry};
use crate::query::{parse_query, QueryTerm};

pub const MAX_RESULTS: usize = 50;

fn passes_filters(entry: &SearchIndexEntry, filters: &QueryFilters) -> bool {
    let Some(volume) = filters.volume else {
        return true;
    };
    if entry.volume != volume {
        return false;
    }
    filters.part.map_or(true, |part| entry.part == part)
}

fn evaluation_text(entry: &SearchIndexEntry) -> String {
    format!(
        "{} {}",
        entry.title.to_lowercase(),
        entry.excerpt.to_lowercase()
    )
}

/// Evaluates already-parsed terms over the index, keeping index order.
pub fn evaluate(
    terms: &[QueryTerm],
    filters: &QueryFilters,
    index: &[SearchIndexEntry],
) -> Vec<SearchIndexEntry> {
    if terms.is_empty() && !filters.is_active() {
        return Vec::new();
    }

    index
        .iter()
        .filter(|entry| passes_filters(entry, filters))
        .filter(|entry| {
            if terms.is_empty() {
                return true;
            }
            let text = evaluation_text(entry);
            terms.iter().all(|term| term.matches(&text))
        })
        .take(MAX_RESULTS)
        .cloned()
        .collect()
}

/// Parses `query` and evaluates it over `index`. At most [`MAX_RESULTS`] hits.
pub fn search_index(
    query: &str,
    filters: &QueryFilters,
    index: &[SearchIndexEntry],
) -> Vec<SearchIndexEntry> {
    let terms = if query.trim().is_empty() {
        Vec::new()
    } else {
        parse_query(query)
    };
    evaluate(&terms, filters, index)
}

//! Search helpers shared by the content repositories.
//!
//! Plain repository searches are case-insensitive substring scans over names
//! and comma-joined tag strings. Fuzzy song lookup goes through the
//! [`SearchStrategy`] abstraction, which ranks candidate names by relevance.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::constants::search::MIN_FUZZY_SCORE;

/// Something with a display name and a comma-joined tag string.
pub trait Searchable {
    /// Name matched by queries.
    fn search_name(&self) -> &str;

    /// Comma-joined tags.
    fn search_tags(&self) -> &str;
}

/// Iterate over the non-empty, trimmed tags of a comma-joined tag string.
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Sorted unique tags across many tag strings.
pub fn unique_tags<'a>(tag_strings: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = tag_strings.into_iter().flat_map(split_tags).collect();
    set.into_iter().map(String::from).collect()
}

/// Number of records carrying each tag.
pub fn tag_counts<'a>(tag_strings: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tags in tag_strings {
        let distinct: BTreeSet<&str> = split_tags(tags).collect();
        for tag in distinct {
            *counts.entry(tag.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Whether `query` (already lowercased) occurs in any single tag.
pub fn any_tag_contains(tags: &str, query: &str) -> bool {
    tags.split(',').any(|t| t.to_lowercase().contains(query))
}

/// Tag filter: an empty filter accepts everything, otherwise the filter must
/// occur somewhere in the tag string.
pub fn tag_filter_matches(tags: &str, filter: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    filter.is_empty() || tags.to_lowercase().contains(&filter)
}

/// Name-or-tag search with an optional tag filter, the search every
/// repository except songs offers.
pub fn name_or_tag_matches<T: Searchable>(item: &T, query: &str, tag: &str) -> bool {
    let query = query.trim().to_lowercase();
    let matches_query =
        item.search_name().to_lowercase().contains(&query) || any_tag_contains(item.search_tags(), &query);
    matches_query && tag_filter_matches(item.search_tags(), tag)
}

/// Trait for ranking search strategies.
///
/// Different strategies can be combined to provide comprehensive
/// matching with fallbacks.
pub trait SearchStrategy: Send + Sync {
    /// Rank candidate names against a query.
    ///
    /// # Returns
    /// Indices into `names`, most relevant first, at most `limit` of them.
    fn rank(&self, query: &str, names: &[&str], limit: usize) -> Vec<usize>;

    /// Get the name of this search strategy (for debugging/logging).
    fn name(&self) -> &'static str;
}

/// Apply a strategy to a slice of searchable items.
pub fn find_matches<'a, T: Searchable>(
    strategy: &dyn SearchStrategy,
    query: &str,
    items: &'a [T],
    limit: usize,
) -> Vec<&'a T> {
    let names: Vec<&str> = items.iter().map(Searchable::search_name).collect();
    strategy
        .rank(query, &names, limit)
        .into_iter()
        .filter_map(|i| items.get(i))
        .collect()
}

/// Fuzzy string matching search strategy.
pub struct FuzzySearch {
    /// Minimum score threshold (0-1000).
    pub min_score: i64,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self { min_score: MIN_FUZZY_SCORE }
    }
}

impl SearchStrategy for FuzzySearch {
    fn rank(&self, query: &str, names: &[&str], limit: usize) -> Vec<usize> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<_> = names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let score = matcher
                    .fuzzy_match(&name.to_lowercase(), &query_lower)
                    .unwrap_or(0);
                (score >= self.min_score).then_some((i, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().take(limit).map(|(i, _)| i).collect()
    }

    fn name(&self) -> &'static str {
        "FuzzySearch"
    }
}

/// Liturgical term mapping for common service music.
pub struct LiturgicalSearch {
    mappings: Vec<(&'static str, &'static [&'static str])>,
}

impl Default for LiturgicalSearch {
    fn default() -> Self {
        Self {
            mappings: vec![
                ("gloria patri", &["gloria patri", "glory be"]),
                ("doxology", &["doxology", "praise god from whom", "old 100th"]),
                ("lords prayer", &["lord's prayer", "our father"]),
                ("kyrie", &["kyrie", "lord have mercy"]),
                ("sanctus", &["sanctus", "holy holy holy", "holy, holy, holy"]),
                ("agnus dei", &["agnus dei", "lamb of god"]),
                ("benediction", &["benediction", "blessing"]),
                ("communion", &["communion", "lord's supper", "eucharist"]),
            ],
        }
    }
}

impl SearchStrategy for LiturgicalSearch {
    fn rank(&self, query: &str, names: &[&str], limit: usize) -> Vec<usize> {
        let query_lower = query.to_lowercase();

        let search_terms: Vec<&str> = self
            .mappings
            .iter()
            .filter(|(key, _)| query_lower.contains(key))
            .flat_map(|(_, terms)| terms.iter().copied())
            .collect();

        if search_terms.is_empty() {
            return Vec::new();
        }

        names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let name_lower = name.to_lowercase();
                search_terms.iter().any(|term| name_lower.contains(term))
            })
            .map(|(i, _)| i)
            .take(limit)
            .collect()
    }

    fn name(&self) -> &'static str {
        "LiturgicalSearch"
    }
}

/// Composite search that tries multiple strategies.
pub struct CompositeSearch {
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl CompositeSearch {
    /// Create a new composite search with the given strategies.
    pub fn new(strategies: Vec<Box<dyn SearchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Create with default strategies (liturgical + fuzzy).
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(LiturgicalSearch::default()),
            Box::new(FuzzySearch::default()),
        ])
    }
}

impl SearchStrategy for CompositeSearch {
    fn rank(&self, query: &str, names: &[&str], limit: usize) -> Vec<usize> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for strategy in &self.strategies {
            for index in strategy.rank(query, names, limit) {
                if seen.insert(index) {
                    results.push(index);
                    if results.len() >= limit {
                        return results;
                    }
                }
            }
        }

        results
    }

    fn name(&self) -> &'static str {
        "CompositeSearch"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    struct Entry(&'static str, &'static str);

    impl Searchable for Entry {
        fn search_name(&self) -> &str {
            self.0
        }

        fn search_tags(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_unique_tags_and_counts() {
        let tags = ["worship, hymn", "hymn,,christmas ", ""];
        assert_eq!(unique_tags(tags), vec!["christmas", "hymn", "worship"]);

        let counts = tag_counts(tags);
        assert_eq!(counts.get("hymn"), Some(&2));
        assert_eq!(counts.get("worship"), Some(&1));
    }

    #[test]
    fn test_name_or_tag_matches() {
        let entry = Entry("Blue Sky Background", "outdoor,Summer");
        assert!(name_or_tag_matches(&entry, "sky", ""));
        assert!(name_or_tag_matches(&entry, "SUMMER", ""));
        assert!(name_or_tag_matches(&entry, "", "outdoor"));
        assert!(!name_or_tag_matches(&entry, "sky", "winter"));
    }

    #[test]
    fn test_fuzzy_search() {
        let items = vec![
            Entry("Amazing Grace", ""),
            Entry("How Great Thou Art", ""),
            Entry("Be Thou My Vision", ""),
        ];

        let results = find_matches(&FuzzySearch::default(), "amazing", &items, 10);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "Amazing Grace");
    }

    #[test]
    fn test_liturgical_search() {
        let items = vec![
            Entry("Praise God From Whom All Blessings Flow", ""),
            Entry("Random Song", ""),
        ];

        let results = find_matches(&CompositeSearch::with_defaults(), "doxology", &items, 10);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "Praise God From Whom All Blessings Flow");
    }
}

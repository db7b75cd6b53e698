//! Token search over events, polities, wars and territorial changes

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::Serialize;

use crate::core::types::Year;
use crate::history::output::WorldBundle;

/// Record kinds, ordered alphabetically by wire name
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Change,
    Event,
    Polity,
    War,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub kind: SearchKind,
    pub id: String,
    /// `None` for records without a year (polities)
    pub year: Option<Year>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Clone, Debug)]
struct SearchEntry {
    result: SearchResult,
    haystack: String,
}

/// Inverted index from token to entry positions
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    postings: AHashMap<String, Vec<usize>>,
}

/// Lowercase, then split on every run of characters outside `[a-z0-9]`
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Result order: year ascending with yearless last, then kind, title, id
///
/// Titles and ids compare case-insensitively first; raw bytes only break ties.
pub fn result_order(a: &SearchResult, b: &SearchResult) -> Ordering {
    (a.year.is_none(), a.year, a.kind)
        .cmp(&(b.year.is_none(), b.year, b.kind))
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.to_lowercase().cmp(&b.id.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

fn unique_tokens(text: &str) -> Vec<String> {
    let mut seen = AHashSet::new();
    tokenize(text).into_iter().filter(|t| seen.insert(t.clone())).collect()
}

impl SearchIndex {
    /// Index events, initial polities, wars and changes, in that order
    pub fn build(world: &WorldBundle) -> Self {
        let mut docs: Vec<(SearchResult, String)> = Vec::new();

        for event in &world.events {
            docs.push((
                SearchResult {
                    kind: SearchKind::Event,
                    id: event.id.to_string(),
                    year: Some(event.year),
                    title: event.title.clone(),
                    snippet: event.explanation.first().cloned(),
                },
                format!("{} {} {}", event.title, event.explanation.join(" "), event.id),
            ));
        }
        for polity in &world.polities_initial {
            docs.push((
                SearchResult {
                    kind: SearchKind::Polity,
                    id: polity.id.to_string(),
                    year: None,
                    title: polity.name.clone(),
                    snippet: Some(polity.name.clone()),
                },
                format!("{} {}", polity.name, polity.id),
            ));
        }
        for war in &world.wars {
            docs.push((
                SearchResult {
                    kind: SearchKind::War,
                    id: war.id.to_string(),
                    year: Some(war.start_year),
                    title: war.name.clone(),
                    snippet: war.explanation.first().cloned(),
                },
                format!("{} {}", war.name, war.id),
            ));
        }
        for change in &world.territorial_changes {
            let title = format!("{} {}", change.change_type.as_str(), change.id);
            docs.push((
                SearchResult {
                    kind: SearchKind::Change,
                    id: change.id.to_string(),
                    year: Some(change.year),
                    title: title.clone(),
                    snippet: Some(change.reason.clone()),
                },
                format!("{} {}", title, change.reason),
            ));
        }

        Self::from_entries(docs)
    }

    /// Index `(result, searchable text)` pairs in the given order
    fn from_entries(docs: Vec<(SearchResult, String)>) -> Self {
        // Tokenizing is independent per entry; collect keeps entry order
        let tokens: Vec<Vec<String>> = docs.par_iter().map(|(_, text)| unique_tokens(text)).collect();

        let mut postings: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (index, entry_tokens) in tokens.into_iter().enumerate() {
            for token in entry_tokens {
                postings.entry(token).or_default().push(index);
            }
        }

        let entries = docs
            .into_iter()
            .map(|(result, text)| SearchEntry {
                result,
                haystack: text.trim().to_lowercase(),
            })
            .collect();

        Self { entries, postings }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries holding every query token whose text contains the whole query
    ///
    /// Sorted by [`result_order`].
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let tokens = tokenize(query);
        let Some((first, rest)) = tokens.split_first() else {
            return Vec::new();
        };

        let mut candidates: Vec<usize> = self.postings.get(first).cloned().unwrap_or_default();
        for token in rest {
            let Some(list) = self.postings.get(token) else {
                return Vec::new();
            };
            let keep: AHashSet<usize> = list.iter().copied().collect();
            candidates.retain(|i| keep.contains(i));
        }

        let needle = query.to_lowercase();
        let mut hits: Vec<&SearchResult> = candidates
            .into_iter()
            .map(|i| &self.entries[i])
            .filter(|entry| entry.haystack.contains(&needle))
            .map(|entry| &entry.result)
            .collect();

        hits.sort_by(|a, b| result_order(a, b));
        hits.into_iter().take(limit).cloned().collect()
    }
}

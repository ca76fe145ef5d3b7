//! Map document type and tag combinations to extension codes and legal
//! notes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Extensions, Key, Note};

/// One row of a scenario table.
///
/// A scenario applies when `types` is empty or contains the document
/// type, and every tag in `tags` is present on the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Key>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

impl Scenario {
    pub fn matches(&self, doc_type: &str, doc_tags: &[Key]) -> bool {
        let type_ok = self.types.is_empty() || self.types.iter().any(|t| t == doc_type);
        let tags_ok = self.tags.iter().all(|t| doc_tags.contains(t));
        type_ok && tags_ok
    }
}

/// The scenarios of one document schema (e.g. "bill/invoice"), in table
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub schema: String,
    pub list: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn summary_for(&self, doc_type: &str, doc_tags: &[Key]) -> ScenarioSummary {
        resolve(doc_type, doc_tags, [self])
    }

    /// Every extension key some scenario in the set can write.
    pub fn ext_keys(&self) -> impl Iterator<Item = &str> {
        self.list.iter().flat_map(|s| s.ext.keys().map(String::as_str))
    }
}

/// The merged outcome of every matching scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub notes: Vec<Note>,
    pub ext: Extensions,
}

/// Resolve a document's scenarios across several sets.
///
/// Sets and scenarios are scanned in order. For every extension key the
/// first matching scenario that sets it wins; notes are collected in order
/// with at most one per `src`.
pub fn resolve<'a>(
    doc_type: &str,
    doc_tags: &[Key],
    sets: impl IntoIterator<Item = &'a ScenarioSet>,
) -> ScenarioSummary {
    let mut notes: Vec<Note> = Vec::new();
    let mut ext: BTreeMap<String, String> = BTreeMap::new();

    for scenario in sets
        .into_iter()
        .flat_map(|set| set.list.iter())
        .filter(|s| s.matches(doc_type, doc_tags))
    {
        if let Some(note) = &scenario.note {
            if !notes.iter().any(|n| n.src == note.src) {
                notes.push(note.clone());
            }
        }
        for (k, v) in &scenario.ext {
            ext.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    ScenarioSummary { notes, ext }
}

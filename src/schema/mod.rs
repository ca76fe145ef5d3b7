//! Self-describing documents: schema identifiers, the [`Document`] sum type
//! and the [`Object`] envelope that carries a `$schema` property.

mod document;
mod object;

pub use document::{Document, DocumentKind, Message};
pub use object::Object;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every schema identifier.
pub const SCHEMA_BASE: &str = "https://tarifa.dev/draft-0/";

/// A schema identifier URL, e.g. `https://tarifa.dev/draft-0/bill/invoice`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for a short schema name such as `"bill/invoice"`.
    pub fn for_short(short: &str) -> Self {
        Self(format!("{SCHEMA_BASE}{short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the base URL (`"bill/invoice"`).
    pub fn short(&self) -> &str {
        self.0.strip_prefix(SCHEMA_BASE).unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The document kinds an envelope may carry.
///
/// `SchemaRegistry::default()` enables every kind; a restricted registry
/// makes [`Object::wrap`] and [`Object::from_json_with`] treat the others
/// as unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    enabled: BTreeSet<DocumentKind>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self {
            enabled: DocumentKind::ALL.iter().copied().collect(),
        }
    }
}

impl SchemaRegistry {
    /// A registry with no kinds enabled.
    pub fn empty() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    pub fn with(mut self, kind: DocumentKind) -> Self {
        self.enabled.insert(kind);
        self
    }

    pub fn is_enabled(&self, kind: DocumentKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// The enabled kind registered under `id`.
    pub fn lookup(&self, id: &str) -> Option<DocumentKind> {
        DocumentKind::from_id(id).filter(|k| self.is_enabled(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names() {
        let id = DocumentKind::Invoice.id();
        assert_eq!(id.as_str(), "https://tarifa.dev/draft-0/bill/invoice");
        assert_eq!(id.short(), "bill/invoice");
        assert_eq!(SchemaId::for_short("note/message"), DocumentKind::Message.id());
    }

    #[test]
    fn restricted_registry() {
        let registry = SchemaRegistry::empty().with(DocumentKind::Message);
        assert_eq!(
            registry.lookup(DocumentKind::Message.id().as_str()),
            Some(DocumentKind::Message)
        );
        assert_eq!(registry.lookup(DocumentKind::Invoice.id().as_str()), None);
        assert_eq!(SchemaRegistry::default().lookup("https://example.com/x"), None);
    }
}

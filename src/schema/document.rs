use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SchemaId;
use crate::core::{
    BillingError, CorrectionOptions, Invoice, Meta, ValidationError, ValidationErrors,
};
use crate::tax::Registry;

/// Registered document kinds. The schema identifier doubles as the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Invoice,
    Message,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Invoice, DocumentKind::Message];

    pub fn short(&self) -> &'static str {
        match self {
            Self::Invoice => Invoice::SHORT_SCHEMA,
            Self::Message => Message::SHORT_SCHEMA,
        }
    }

    pub fn id(&self) -> SchemaId {
        SchemaId::for_short(self.short())
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id().as_str() == id)
    }
}

/// A plain text message, the simplest document an envelope can carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl Message {
    pub const SHORT_SCHEMA: &'static str = "note/message";

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Any payload an envelope can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Invoice(Box<Invoice>),
    Message(Message),
}

impl From<Invoice> for Document {
    fn from(invoice: Invoice) -> Self {
        Self::Invoice(Box::new(invoice))
    }
}

impl From<Message> for Document {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Invoice(_) => DocumentKind::Invoice,
            Self::Message(_) => DocumentKind::Message,
        }
    }

    pub fn schema(&self) -> SchemaId {
        self.kind().id()
    }

    pub(crate) fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Invoice(inv) => serde_json::to_value(inv),
            Self::Message(msg) => serde_json::to_value(msg),
        }
    }

    pub(crate) fn from_value(kind: DocumentKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            DocumentKind::Invoice => Self::Invoice(Box::new(serde_json::from_value(value)?)),
            DocumentKind::Message => Self::Message(serde_json::from_value(value)?),
        })
    }

    /// Calculate the payload; kinds without calculations succeed untouched.
    pub fn calculate(&mut self, registry: &Registry) -> Result<(), BillingError> {
        match self {
            Self::Invoice(inv) => inv.calculate(registry),
            Self::Message(_) => Ok(()),
        }
    }

    pub fn validate(&self, registry: &Registry) -> Result<(), BillingError> {
        match self {
            Self::Invoice(inv) => inv.validate(registry),
            Self::Message(msg) => {
                if msg.content.trim().is_empty() {
                    ValidationErrors(vec![ValidationError::new(
                        "content",
                        "content must not be empty",
                    )])
                    .into_result()
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn correct(&mut self, opts: &CorrectionOptions) -> Result<(), BillingError> {
        match self {
            Self::Invoice(inv) => inv.correct(opts),
            Self::Message(_) => Err(BillingError::NotCorrectable),
        }
    }

    pub fn correction_options_schema(&self) -> Option<Value> {
        match self {
            Self::Invoice(_) => Some(Invoice::correction_options_schema()),
            Self::Message(_) => None,
        }
    }
}

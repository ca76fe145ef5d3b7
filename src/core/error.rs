use thiserror::Error;

use crate::tax::TaxError;

/// Errors that can occur while building, calculating, validating or
/// correcting a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// The invoice has no supplier party.
    #[error("invoice has no supplier")]
    MissingSupplier,

    /// No regime is registered for the effective tax identity.
    #[error("no tax regime for country '{country}'{}", zone_suffix(.zone))]
    UnknownRegime {
        country: String,
        zone: Option<String>,
    },

    /// Neither a value date nor an issue date is available.
    #[error("issue date cannot be empty")]
    MissingDate,

    /// A document tag is not part of the regime's enumeration.
    #[error("invalid document tag: {0}")]
    InvalidTag(String),

    /// The tax identity used for calculations could not be determined.
    #[error("unable to determine tax identity: {0}")]
    UnresolvableTaxIdentity(String),

    /// The tax total calculator rejected a category or rate.
    #[error("tax calculation failed: {0}")]
    TaxCalculation(#[from] TaxError),

    /// An intermediate amount exceeded the decimal range.
    #[error("amount overflow in {0}")]
    AmountOverflow(String),

    /// An envelope payload type or schema identifier is not registered.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A document refers to an addon that is not registered.
    #[error("unknown addon: {0}")]
    UnknownAddon(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// The payload does not support corrections.
    #[error("document cannot be corrected")]
    NotCorrectable,

    /// Correction options were rejected.
    #[error("correction error: {0}")]
    Correction(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn zone_suffix(zone: &Option<String>) -> String {
    zone.as_deref()
        .map(|z| format!(" zone '{z}'"))
        .unwrap_or_default()
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "lines[0].taxes[1].ext").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Source of the rule: an addon key, a regime country or a rule ID.
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error attributed to a rule source.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    /// Re-root the field under `path`, keeping an existing rule or
    /// falling back to `rule`.
    pub(crate) fn nested(mut self, path: &str, rule: &str) -> Self {
        self.field = match (path.is_empty(), self.field.is_empty()) {
            (true, _) => self.field,
            (false, true) => path.to_string(),
            (false, false) => format!("{path}.{}", self.field),
        };
        if self.rule.is_none() {
            self.rule = Some(rule.to_string());
        }
        self
    }
}

/// All validation failures found in a document, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// True if any error points at `field` exactly.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Convert into a result: `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), BillingError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(BillingError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&msg)
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

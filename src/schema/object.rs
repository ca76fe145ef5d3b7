use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::document::Document;
use super::{SchemaId, SchemaRegistry};
use crate::core::{BillingError, CorrectionOptions, ValidationError, ValidationErrors};
use crate::tax::Registry;

const SCHEMA_KEY: &str = "$schema";

/// A document together with the schema identifier that names its type.
///
/// On the wire the payload's own properties sit next to a `$schema`
/// property, which is always written first. Reading JSON without a
/// `$schema`, or with one that is not registered, yields an empty object
/// rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    schema: SchemaId,
    payload: Option<Document>,
}

impl Object {
    /// Wrap a payload, failing if its kind is not enabled in `registry`.
    pub fn wrap(
        registry: &SchemaRegistry,
        payload: impl Into<Document>,
    ) -> Result<Self, BillingError> {
        let payload = payload.into();
        let kind = payload.kind();
        if !registry.is_enabled(kind) {
            return Err(BillingError::UnknownSchema(kind.id().to_string()));
        }
        Ok(Self {
            schema: kind.id(),
            payload: Some(payload),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    pub fn instance(&self) -> Option<&Document> {
        self.payload.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut Document> {
        self.payload.as_mut()
    }

    pub fn into_instance(self) -> Option<Document> {
        self.payload
    }

    /// Parse JSON with every document kind enabled.
    pub fn from_json(json: &str) -> Result<Self, BillingError> {
        Self::from_json_with(&SchemaRegistry::default(), json)
    }

    /// Parse JSON, recognising only the kinds enabled in `registry`.
    pub fn from_json_with(registry: &SchemaRegistry, json: &str) -> Result<Self, BillingError> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_map(registry, map)?)
    }

    pub fn to_json(&self) -> Result<String, BillingError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, BillingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn from_map(
        registry: &SchemaRegistry,
        mut map: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        let id = match map.remove(SCHEMA_KEY) {
            Some(Value::String(id)) => id,
            _ => {
                warn!("object has no $schema, leaving it empty");
                return Ok(Self::default());
            }
        };
        let Some(kind) = registry.lookup(&id) else {
            warn!(schema = %id, "unknown schema, leaving object empty");
            return Ok(Self::default());
        };
        let payload = Document::from_value(kind, Value::Object(map))?;
        Ok(Self {
            schema: kind.id(),
            payload: Some(payload),
        })
    }

    /// Calculate the payload. Empty objects have nothing to calculate.
    pub fn calculate(&mut self, registry: &Registry) -> Result<(), BillingError> {
        match &mut self.payload {
            Some(doc) => doc.calculate(registry),
            None => Ok(()),
        }
    }

    /// Validate the payload as if its errors belonged to the object itself.
    /// An empty object is invalid.
    pub fn validate(&self, registry: &Registry) -> Result<(), BillingError> {
        match &self.payload {
            Some(doc) => doc.validate(registry),
            None => ValidationErrors(vec![ValidationError::new(
                SCHEMA_KEY,
                "schema is required",
            )])
            .into_result(),
        }
    }

    pub fn correct(&mut self, opts: &CorrectionOptions) -> Result<(), BillingError> {
        match &mut self.payload {
            Some(doc) => doc.correct(opts),
            None => Err(BillingError::NotCorrectable),
        }
    }

    /// Schema of the correction options, or `None` if the payload cannot
    /// be corrected.
    pub fn correction_options_schema(&self) -> Result<Option<Value>, BillingError> {
        Ok(self
            .payload
            .as_ref()
            .and_then(Document::correction_options_schema))
    }

    /// Deep copy by serializing and parsing the object again.
    pub fn clone_via_json(&self) -> Result<Object, BillingError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = Map::new();
        map.insert(SCHEMA_KEY.to_string(), Value::String(self.schema.to_string()));
        if let Some(doc) = &self.payload {
            match doc.to_value().map_err(ser::Error::custom)? {
                Value::Object(fields) => map.extend(fields),
                _ => return Err(ser::Error::custom("payload must serialize to an object")),
            }
        }
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Object::from_map(&SchemaRegistry::default(), map).map_err(de::Error::custom)
    }
}

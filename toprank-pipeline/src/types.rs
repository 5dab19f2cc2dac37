use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::candidate_pipeline::HasRequestId;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Name of the field the top-N selection ranks by.
pub const VALUE_FIELD: &str = "value";

/// Field names tried, in order, when a record is asked for its label.
const LABEL_FIELDS: [&str; 2] = ["label", "name"];

/// Breakdown rows name their grouping column after the relation,
/// e.g. `country__name`.
const RELATION_LABEL_SUFFIX: &str = "__name";

/// One entry of a dashboard series: a mapping from field name to value.
///
/// Fields are kept in insertion order so a record serializes back out the
/// way it was read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the `{label, value}` shape most series use.
    pub fn series(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new()
            .with("label", Value::String(label.into()))
            .with(VALUE_FIELD, value)
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when the field exists and is not `null`.
    pub fn has(&self, field: &str) -> bool {
        matches!(self.get(field), Some(v) if !v.is_null())
    }

    /// The numeric `value` field, if present.
    pub fn value(&self) -> Option<f64> {
        self.get(VALUE_FIELD).and_then(Value::as_f64)
    }

    /// Display label: `label`, then `name`, then the first `<relation>__name`
    /// string field.
    pub fn label(&self) -> Option<&str> {
        LABEL_FIELDS
            .iter()
            .find_map(|field| self.get(field).and_then(Value::as_str))
            .or_else(|| {
                self.fields
                    .iter()
                    .filter(|(k, _)| k.ends_with(RELATION_LABEL_SUFFIX))
                    .find_map(|(_, v)| v.as_str())
            })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Query handed to the top-series pipeline.
#[derive(Clone, Debug, Default)]
pub struct SeriesQuery {
    pub request_id: String,
    /// Records missing any of these fields (or holding `null`) are dropped.
    pub required_fields: Vec<String>,
    /// Records whose `value` is below this threshold are dropped.
    pub min_value: Option<f64>,
}

impl SeriesQuery {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }
}

impl HasRequestId for SeriesQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

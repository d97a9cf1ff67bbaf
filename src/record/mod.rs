//! Typed records consumed by the pivot engine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::SelectOption;

/// Raw value of a date property: either a bare ISO string or a range object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Iso(String),
    Range {
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

impl DateValue {
    /// The date the value is charted by (the start of a range)
    pub fn start(&self) -> &str {
        match self {
            DateValue::Iso(s) => s,
            DateValue::Range { start, .. } => start,
        }
    }
}

/// A typed property value, tagged by the same type names as the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPropertyValue", into = "RawPropertyValue")]
pub enum PropertyValue {
    Select(Option<SelectOption>),
    Status(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Date(Option<DateValue>),
    Number(Option<f64>),
    /// A value of a type the engine does not chart; its payload is dropped
    Unsupported(String),
}

impl PropertyValue {
    pub fn select(name: impl Into<String>) -> Self {
        PropertyValue::Select(Some(SelectOption::new(name)))
    }

    pub fn status(name: impl Into<String>) -> Self {
        PropertyValue::Status(Some(SelectOption::new(name)))
    }

    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::MultiSelect(names.into_iter().map(SelectOption::new).collect())
    }

    pub fn date(iso: impl Into<String>) -> Self {
        PropertyValue::Date(Some(DateValue::Iso(iso.into())))
    }

    pub fn number(n: f64) -> Self {
        PropertyValue::Number(Some(n))
    }

    /// Selected option names; more than one only for multi-select values
    pub fn option_names(&self) -> Vec<&str> {
        match self {
            PropertyValue::Select(Some(o)) | PropertyValue::Status(Some(o)) => {
                vec![o.name.as_str()]
            }
            PropertyValue::MultiSelect(opts) => opts.iter().map(|o| o.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(Some(n)) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&str> {
        match self {
            PropertyValue::Date(Some(d)) => Some(d.start()),
            _ => None,
        }
    }

    fn type_name(&self) -> &str {
        match self {
            PropertyValue::Select(_) => "select",
            PropertyValue::Status(_) => "status",
            PropertyValue::MultiSelect(_) => "multi_select",
            PropertyValue::Date(_) => "date",
            PropertyValue::Number(_) => "number",
            PropertyValue::Unsupported(name) => name,
        }
    }
}

/// Wire shape: `{"type": "<type>", "value": <raw>}`
#[derive(Serialize, Deserialize)]
struct RawPropertyValue {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

/// Option payloads may be given as `{"name": ..}` or as a bare string
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionPayload {
    Named(SelectOption),
    Bare(String),
}

impl From<OptionPayload> for SelectOption {
    fn from(p: OptionPayload) -> Self {
        match p {
            OptionPayload::Named(o) => o,
            OptionPayload::Bare(name) => SelectOption::new(name),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Format(format!("invalid {} value: {}", kind, e)))
}

impl TryFrom<RawPropertyValue> for PropertyValue {
    type Error = Error;

    fn try_from(raw: RawPropertyValue) -> Result<Self> {
        let RawPropertyValue { kind, value } = raw;
        let parsed = match kind.as_str() {
            "select" => PropertyValue::Select(
                decode::<Option<OptionPayload>>(&kind, value)?.map(SelectOption::from),
            ),
            "status" => PropertyValue::Status(
                decode::<Option<OptionPayload>>(&kind, value)?.map(SelectOption::from),
            ),
            "multi_select" => PropertyValue::MultiSelect(
                decode::<Option<Vec<OptionPayload>>>(&kind, value)?
                    .unwrap_or_default()
                    .into_iter()
                    .map(SelectOption::from)
                    .collect(),
            ),
            "date" => PropertyValue::Date(decode(&kind, value)?),
            "number" => PropertyValue::Number(decode(&kind, value)?),
            _ => PropertyValue::Unsupported(kind.clone()),
        };
        Ok(parsed)
    }
}

impl From<PropertyValue> for RawPropertyValue {
    fn from(v: PropertyValue) -> Self {
        let kind = v.type_name().to_string();
        let value = match v {
            PropertyValue::Select(o) | PropertyValue::Status(o) => {
                o.map_or(Value::Null, |o| serde_json::json!({ "name": o.name }))
            }
            PropertyValue::MultiSelect(opts) => Value::Array(
                opts.into_iter()
                    .map(|o| serde_json::json!({ "name": o.name }))
                    .collect(),
            ),
            PropertyValue::Date(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            PropertyValue::Number(n) => n
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
            PropertyValue::Unsupported(_) => Value::Null,
        };
        RawPropertyValue { kind, value }
    }
}

/// One input row: property name to typed value (or null)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: HashMap<String, Option<PropertyValue>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a value
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.values.insert(name.into(), Some(value));
        self
    }

    /// Builder-style insertion of an explicit null
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    /// The value of a property; absent and null are both `None`
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name).and_then(|v| v.as_ref())
    }

    pub fn option_names(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|v| v.option_names()).unwrap_or_default()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_number())
    }

    pub fn date(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_date())
    }
}

//! Property schema describing the typed columns of a record set

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Select,
    Status,
    MultiSelect,
    Date,
    Number,
    /// Any type the engine does not chart (title, rich_text, checkbox, ...)
    Other(String),
}

impl PropertyType {
    /// Type name as it appears in the schema
    pub fn name(&self) -> &str {
        match self {
            PropertyType::Select => "select",
            PropertyType::Status => "status",
            PropertyType::MultiSelect => "multi_select",
            PropertyType::Date => "date",
            PropertyType::Number => "number",
            PropertyType::Other(name) => name,
        }
    }

    /// Whether the type carries a declared option list
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            PropertyType::Select | PropertyType::Status | PropertyType::MultiSelect
        )
    }
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "select" => PropertyType::Select,
            "status" => PropertyType::Status,
            "multi_select" => PropertyType::MultiSelect,
            "date" => PropertyType::Date,
            "number" => PropertyType::Number,
            _ => PropertyType::Other(s),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(s: &str) -> Self {
        PropertyType::from(s.to_string())
    }
}

impl From<PropertyType> for String {
    fn from(t: PropertyType) -> Self {
        t.name().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named option of a select, status or multi-select property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        SelectOption { name: name.into() }
    }
}

/// Type descriptor of a single property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    /// Declared options in display order; empty for dates and numbers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl TypeDescriptor {
    fn with_options<I, S>(property_type: PropertyType, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDescriptor {
            property_type,
            options: options.into_iter().map(SelectOption::new).collect(),
        }
    }

    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(PropertyType::Select, options)
    }

    pub fn status<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(PropertyType::Status, options)
    }

    pub fn multi_select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(PropertyType::MultiSelect, options)
    }

    pub fn date() -> Self {
        TypeDescriptor {
            property_type: PropertyType::Date,
            options: Vec::new(),
        }
    }

    pub fn number() -> Self {
        TypeDescriptor {
            property_type: PropertyType::Number,
            options: Vec::new(),
        }
    }

    /// Descriptor for a type the engine does not chart
    pub fn other(name: impl Into<String>) -> Self {
        TypeDescriptor {
            property_type: PropertyType::Other(name.into()),
            options: Vec::new(),
        }
    }

    /// Option names in declared order
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.name.as_str())
    }
}

/// Mapping from property name to its type descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySchema {
    properties: BTreeMap<String, TypeDescriptor>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a property
    pub fn with_property(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) {
        self.properties.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeDescriptor)> {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_schema() {
        let json = r#"{
            "priority": {"type": "select", "options": [{"name": "High"}, {"name": "Low"}]},
            "hours": {"type": "number"},
            "title": {"type": "rich_text"}
        }"#;
        let schema: PropertySchema = serde_json::from_str(json).unwrap();

        assert_eq!(schema.len(), 3);
        let priority = schema.get("priority").unwrap();
        assert_eq!(priority.property_type, PropertyType::Select);
        assert_eq!(priority.option_names().collect::<Vec<_>>(), vec!["High", "Low"]);
        assert_eq!(schema.get("hours").unwrap().property_type, PropertyType::Number);
        assert_eq!(
            schema.get("title").unwrap().property_type,
            PropertyType::Other("rich_text".to_string())
        );
    }

    #[test]
    fn test_type_names_round_trip_through_string() {
        for name in ["select", "status", "multi_select", "date", "number", "checkbox"] {
            let t = PropertyType::from(name);
            assert_eq!(String::from(t), name);
        }
        assert!(PropertyType::MultiSelect.has_options());
        assert!(!PropertyType::Date.has_options());
    }
}

//! Decides how the value space of a property is turned into categories

use crate::error::{AxisRole, Error, Result};
use crate::schema::{PropertySchema, PropertyType};

/// How a property's categories are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// Closed set of declared options (select, status, multi_select)
    FixedOptions,
    /// Open set discovered from the data (dates)
    DiscoveredOrdinal,
    /// Continuous range that must be binned (numbers)
    Continuous,
}

impl CategoryKind {
    pub fn is_categorical(&self) -> bool {
        matches!(self, CategoryKind::FixedOptions)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CategoryKind::Continuous)
    }
}

/// Category kind of a declared property type, if the type is chartable at all
pub fn kind_of(property_type: &PropertyType) -> Option<CategoryKind> {
    match property_type {
        PropertyType::Select | PropertyType::Status | PropertyType::MultiSelect => {
            Some(CategoryKind::FixedOptions)
        }
        PropertyType::Date => Some(CategoryKind::DiscoveredOrdinal),
        PropertyType::Number => Some(CategoryKind::Continuous),
        PropertyType::Other(_) => None,
    }
}

/// Resolve the category kind of `name` for use on the given axis
///
/// # Errors
/// `SchemaLookup` if the property is absent, `UnsupportedAxisType` if its
/// type is outside the five chartable types.
pub fn resolve_kind(name: &str, schema: &PropertySchema, role: AxisRole) -> Result<CategoryKind> {
    let descriptor = schema
        .get(name)
        .ok_or_else(|| Error::SchemaLookup(name.to_string()))?;

    kind_of(&descriptor.property_type).ok_or_else(|| Error::UnsupportedAxisType {
        property: name.to_string(),
        found: descriptor.property_type.name().to_string(),
        role,
    })
}

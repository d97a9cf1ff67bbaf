//! Pivot/aggregation engine for chart dashboards
//!
//! Converts schema-described typed records into a dense series matrix
//! (`{config, data}`) ready for a chart component, given an X property,
//! a Y property or `"count"`, and a numeric aggregation.
//!
//! ```
//! use chartpivot::{pivot, Aggregation, PivotOptions, PropertySchema, PropertyValue, Record, TypeDescriptor};
//!
//! let schema = PropertySchema::new()
//!     .with_property("priority", TypeDescriptor::select(["High", "Low"]))
//!     .with_property("hours", TypeDescriptor::number());
//! let records = vec![
//!     Record::new()
//!         .with("priority", PropertyValue::select("High"))
//!         .with("hours", PropertyValue::number(2.0)),
//! ];
//! let options = PivotOptions::new("priority", "hours").with_aggregation(Aggregation::Sum);
//!
//! let matrix = pivot(&schema, &records, &options).unwrap();
//! assert_eq!(matrix.config, vec!["sum"]);
//! assert_eq!(matrix.value("high", "sum"), Some(2.0));
//! ```

pub mod binning;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod matrix;
pub mod pivot;
pub mod record;
pub mod resolve;
pub mod schema;

// Re-export commonly used types
pub use binning::{Bin, Binner};
pub use config::PivotOptions;
pub use domain::{categories_for, CategoryDomain};
pub use error::{AxisRole, Error, Result};
pub use io::PivotInput;
pub use matrix::{Row, SeriesMatrix};
pub use pivot::{pivot, Aggregation, PivotTable, YAxis};
pub use record::{DateValue, PropertyValue, Record};
pub use resolve::{resolve_kind, CategoryKind};
pub use schema::{PropertySchema, PropertyType, SelectOption, TypeDescriptor};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

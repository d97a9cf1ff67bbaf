//! Pivot engine: turns records into a chart-ready series matrix

mod accumulator;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PivotOptions;
use crate::domain::categories_for;
use crate::error::{AxisRole, Error, Result};
use crate::matrix::SeriesMatrix;
use crate::record::Record;
use crate::resolve::{resolve_kind, CategoryKind};
use crate::schema::PropertySchema;

use accumulator::ValueMode;

/// How numeric Y values are combined per X category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Total of the values
    Sum,
    /// Mean of the values
    Avg,
    /// Value from the first record in arrival order
    #[default]
    Latest,
    /// Value from the last record in arrival order
    Oldest,
    /// Bin the values and cross-tabulate against the bins
    Categorize,
}

impl Aggregation {
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Latest => "latest",
            Aggregation::Oldest => "oldest",
            Aggregation::Categorize => "categorize",
        }
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" | "mean" | "average" => Ok(Aggregation::Avg),
            "latest" => Ok(Aggregation::Latest),
            "oldest" => Ok(Aggregation::Oldest),
            "categorize" => Ok(Aggregation::Categorize),
            other => Err(Error::InvalidConfig(format!(
                "unknown number handling '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sentinel Y axis meaning "count records"
pub const COUNT: &str = "count";

/// Y-axis choice: a property, or a record count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum YAxis {
    Count,
    Property(String),
}

impl From<String> for YAxis {
    fn from(s: String) -> Self {
        if s == COUNT {
            YAxis::Count
        } else {
            YAxis::Property(s)
        }
    }
}

impl From<&str> for YAxis {
    fn from(s: &str) -> Self {
        YAxis::from(s.to_string())
    }
}

impl From<YAxis> for String {
    fn from(y: YAxis) -> Self {
        match y {
            YAxis::Count => COUNT.to_string(),
            YAxis::Property(name) => name,
        }
    }
}

/// What the Y axis resolved to after validation
#[derive(Debug, Clone, PartialEq)]
enum YPlan {
    Count,
    /// Cross-tabulate against Y categories of this kind
    Categorical { field: String, kind: CategoryKind },
    /// Combine Y values per X category
    Numeric { field: String, mode: ValueMode },
}

/// A validated pivot over one record set
#[derive(Debug)]
pub struct PivotTable<'a> {
    schema: &'a PropertySchema,
    records: &'a [Record],
    options: &'a PivotOptions,
    x_kind: CategoryKind,
    y_plan: YPlan,
}

impl<'a> PivotTable<'a> {
    /// Validate the axes against the schema
    ///
    /// # Errors
    /// `SchemaLookup` when an axis property is missing, `UnsupportedAxisType`
    /// when X is not chartable or Y is neither categorical nor numeric, and
    /// `InvalidConfig`/`MissingInput` for unusable options.
    pub fn new(
        schema: &'a PropertySchema,
        records: &'a [Record],
        options: &'a PivotOptions,
    ) -> Result<Self> {
        options.validate()?;

        let x_kind = resolve_kind(&options.x_axis, schema, AxisRole::X)?;

        let y_plan = match &options.y_axis {
            YAxis::Count => YPlan::Count,
            YAxis::Property(field) => {
                let kind = resolve_kind(field, schema, AxisRole::Y)?;
                let aggregation = options.y_axis_number_handling;
                match kind {
                    CategoryKind::FixedOptions => YPlan::Categorical {
                        field: field.clone(),
                        kind,
                    },
                    CategoryKind::Continuous => match ValueMode::of(aggregation) {
                        Some(mode) => YPlan::Numeric {
                            field: field.clone(),
                            mode,
                        },
                        None => YPlan::Categorical {
                            field: field.clone(),
                            kind,
                        },
                    },
                    CategoryKind::DiscoveredOrdinal => {
                        return Err(Error::UnsupportedAxisType {
                            property: field.clone(),
                            found: schema
                                .get(field)
                                .map(|d| d.property_type.name().to_string())
                                .unwrap_or_default(),
                            role: AxisRole::Y,
                        })
                    }
                }
            }
        };

        Ok(PivotTable {
            schema,
            records,
            options,
            x_kind,
            y_plan,
        })
    }

    /// Run the single pass over the records and build the matrix
    pub fn execute(&self) -> Result<SeriesMatrix> {
        let opts = self.options;
        log::debug!(
            "pivot x='{}' y='{}' handling={} over {} records",
            opts.x_axis,
            String::from(opts.y_axis.clone()),
            opts.y_axis_number_handling,
            self.records.len()
        );

        let x = categories_for(
            &opts.x_axis,
            self.x_kind,
            self.schema,
            self.records,
            opts.bins,
            &opts.date_format,
        )?;

        let matrix = match &self.y_plan {
            YPlan::Count => accumulator::count(self.records, x.as_ref()),
            YPlan::Categorical { field, kind } => {
                let y = categories_for(
                    field,
                    *kind,
                    self.schema,
                    self.records,
                    opts.bins,
                    &opts.date_format,
                )?;
                accumulator::cross_tabulate(self.records, x.as_ref(), y.as_ref())
            }
            YPlan::Numeric { field, mode } => {
                accumulator::aggregate(self.records, x.as_ref(), field, *mode)
            }
        };

        log::debug!(
            "pivot produced {} rows x {} series",
            matrix.data.len(),
            matrix.config.len()
        );
        Ok(matrix)
    }
}

/// Validate and run a pivot in one call
pub fn pivot(
    schema: &PropertySchema,
    records: &[Record],
    options: &PivotOptions,
) -> Result<SeriesMatrix> {
    PivotTable::new(schema, records, options)?.execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PropertyValue;
    use crate::schema::TypeDescriptor;

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .with_property("priority", TypeDescriptor::select(["High", "Low"]))
            .with_property("hours", TypeDescriptor::number())
            .with_property("due", TypeDescriptor::date())
            .with_property("title", TypeDescriptor::other("title"))
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("priority", PropertyValue::select("High"))
                .with("hours", PropertyValue::number(2.0)),
            Record::new()
                .with("priority", PropertyValue::select("High"))
                .with("hours", PropertyValue::number(4.0)),
            Record::new()
                .with("priority", PropertyValue::select("Low"))
                .with("hours", PropertyValue::number(10.0)),
        ]
    }

    #[test]
    fn test_aggregation_parsing() {
        assert_eq!("SUM".parse::<Aggregation>().unwrap(), Aggregation::Sum);
        assert_eq!("mean".parse::<Aggregation>().unwrap(), Aggregation::Avg);
        assert!("median".parse::<Aggregation>().is_err());
        assert_eq!(Aggregation::default(), Aggregation::Latest);
    }

    #[test]
    fn test_y_axis_sentinel() {
        assert_eq!(YAxis::from("count"), YAxis::Count);
        assert_eq!(YAxis::from("hours"), YAxis::Property("hours".into()));
        assert_eq!(String::from(YAxis::Count), "count");
    }

    #[test]
    fn test_plan_selection() {
        let s = schema();
        let r = records();

        let opts = PivotOptions::count("priority");
        assert_eq!(PivotTable::new(&s, &r, &opts).unwrap().y_plan, YPlan::Count);

        let opts = PivotOptions::new("priority", "hours").with_aggregation(Aggregation::Sum);
        assert!(matches!(
            PivotTable::new(&s, &r, &opts).unwrap().y_plan,
            YPlan::Numeric { mode: ValueMode::Sum, .. }
        ));

        let opts =
            PivotOptions::new("priority", "hours").with_aggregation(Aggregation::Categorize);
        assert!(matches!(
            PivotTable::new(&s, &r, &opts).unwrap().y_plan,
            YPlan::Categorical { kind: CategoryKind::Continuous, .. }
        ));
    }

    #[test]
    fn test_date_y_axis_rejected() {
        let s = schema();
        let r = records();
        let opts = PivotOptions::new("priority", "due");
        let err = PivotTable::new(&s, &r, &opts).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAxisType { role: AxisRole::Y, .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_axes_rejected() {
        let s = schema();
        let r = records();
        assert!(matches!(
            pivot(&s, &r, &PivotOptions::count("nope")),
            Err(Error::SchemaLookup(_))
        ));
        assert!(matches!(
            pivot(&s, &r, &PivotOptions::new("priority", "nope")),
            Err(Error::SchemaLookup(_))
        ));
        assert!(matches!(
            pivot(&s, &r, &PivotOptions::count("title")),
            Err(Error::UnsupportedAxisType { role: AxisRole::X, .. })
        ));
        assert!(matches!(
            pivot(&s, &r, &PivotOptions::new("priority", "title")),
            Err(Error::UnsupportedAxisType { role: AxisRole::Y, .. })
        ));
    }

    #[test]
    fn test_sum_scenario() {
        let opts = PivotOptions::new("priority", "hours").with_aggregation(Aggregation::Sum);
        let m = pivot(&schema(), &records(), &opts).unwrap();
        assert_eq!(m.config, vec!["sum"]);
        assert_eq!(m.value("high", "sum"), Some(6.0));
        assert_eq!(m.value("low", "sum"), Some(10.0));
    }
}

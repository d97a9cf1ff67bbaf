//! Pivot options and their loaders
//!
//! Options can be built in code or read from JSON, TOML or YAML. Keys are
//! accepted in camelCase (`xAxis`) as sent by dashboards, or in snake_case.

use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Deserializer, Serialize};

use crate::binning::DEFAULT_BIN_COUNT;
use crate::domain::DEFAULT_DATE_FORMAT;
use crate::error::{Error, Result};
use crate::pivot::{Aggregation, YAxis};

fn default_bins() -> usize {
    DEFAULT_BIN_COUNT
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Treat an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What to chart: the two axes and how numeric Y values are combined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotOptions {
    #[serde(alias = "x_axis")]
    pub x_axis: String,

    /// Y property, or `"count"` to count records per X category
    #[serde(alias = "y_axis")]
    pub y_axis: YAxis,

    #[serde(
        default,
        alias = "y_axis_number_handling",
        deserialize_with = "null_as_default"
    )]
    pub y_axis_number_handling: Aggregation,

    /// Number of equal-width bins for numeric axes
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// strftime format applied to date categories
    #[serde(default = "default_date_format", alias = "date_format")]
    pub date_format: String,
}

impl PivotOptions {
    pub fn new(x_axis: impl Into<String>, y_axis: impl Into<YAxis>) -> Self {
        PivotOptions {
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
            y_axis_number_handling: Aggregation::default(),
            bins: DEFAULT_BIN_COUNT,
            date_format: default_date_format(),
        }
    }

    /// Count records per X category
    pub fn count(x_axis: impl Into<String>) -> Self {
        Self::new(x_axis, YAxis::Count)
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.y_axis_number_handling = aggregation;
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Reject options no record set could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.x_axis.is_empty() {
            return Err(Error::MissingInput("xAxis is empty".to_string()));
        }
        if let YAxis::Property(name) = &self.y_axis {
            if name.is_empty() {
                return Err(Error::MissingInput("yAxis is empty".to_string()));
            }
        }
        if self.bins == 0 {
            return Err(Error::InvalidConfig("bins must be at least 1".to_string()));
        }
        if self.date_format.is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::InvalidConfig(format!(
                "invalid date format '{}'",
                self.date_format
            )));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load options from a `.json`, `.toml`, `.yaml` or `.yml` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let options = match ext.as_str() {
            "json" => Self::from_json_str(&contents)?,
            "toml" => Self::from_toml_str(&contents)?,
            "yaml" | "yml" => Self::from_yaml_str(&contents)?,
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported options file extension '{}'",
                    other
                )))
            }
        };
        log::debug!("loaded pivot options from {}", path.display());
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = PivotOptions::from_json_str(r#"{"xAxis": "priority", "yAxis": "hours"}"#)
            .unwrap();
        assert_eq!(opts.x_axis, "priority");
        assert_eq!(opts.y_axis, YAxis::Property("hours".to_string()));
        assert_eq!(opts.y_axis_number_handling, Aggregation::Latest);
        assert_eq!(opts.bins, 5);
        assert_eq!(opts.date_format, "%Y-%m-%d");
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_null_handling_falls_back_to_latest() {
        let opts = PivotOptions::from_json_str(
            r#"{"xAxis": "p", "yAxis": "count", "yAxisNumberHandling": null}"#,
        )
        .unwrap();
        assert_eq!(opts.y_axis, YAxis::Count);
        assert_eq!(opts.y_axis_number_handling, Aggregation::Latest);
    }

    #[test]
    fn test_snake_case_aliases() {
        let opts = PivotOptions::from_yaml_str(
            "x_axis: due\ny_axis: hours\ny_axis_number_handling: avg\ndate_format: \"%Y-%m\"\n",
        )
        .unwrap();
        assert_eq!(opts.y_axis_number_handling, Aggregation::Avg);
        assert_eq!(opts.date_format, "%Y-%m");
    }

    #[test]
    fn test_toml() {
        let opts = PivotOptions::from_toml_str(
            "xAxis = \"priority\"\nyAxis = \"hours\"\nyAxisNumberHandling = \"categorize\"\nbins = 3\n",
        )
        .unwrap();
        assert_eq!(opts.y_axis_number_handling, Aggregation::Categorize);
        assert_eq!(opts.bins, 3);
    }

    #[test]
    fn test_unknown_handling_rejected() {
        assert!(PivotOptions::from_json_str(
            r#"{"xAxis": "p", "yAxis": "h", "yAxisNumberHandling": "median"}"#
        )
        .is_err());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            PivotOptions::count("p").with_bins(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            PivotOptions::count("").validate(),
            Err(Error::MissingInput(_))
        ));
        assert!(matches!(
            PivotOptions::count("p").with_date_format("%Q").validate(),
            Err(Error::InvalidConfig(_))
        ));
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PivotOptions;
use crate::error::{Error, Result};
use crate::matrix::SeriesMatrix;
use crate::pivot::pivot;
use crate::record::Record;
use crate::schema::PropertySchema;

/// Schema and records as delivered by the data-fetching collaborator
///
/// Either part may be `null` on the wire; that is reported as a validation
/// error when the pivot runs rather than while reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotInput {
    #[serde(default)]
    pub schema: Option<PropertySchema>,
    #[serde(default, alias = "data")]
    pub records: Option<Vec<Record>>,
}

impl PivotInput {
    pub fn new(schema: PropertySchema, records: Vec<Record>) -> Self {
        PivotInput {
            schema: Some(schema),
            records: Some(records),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Run a pivot, failing when the schema or records are missing
    pub fn pivot(&self, options: &PivotOptions) -> Result<SeriesMatrix> {
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| Error::MissingInput("schema is missing".to_string()))?;
        let records = self
            .records
            .as_deref()
            .ok_or_else(|| Error::MissingInput("records are missing".to_string()))?;
        pivot(schema, records, options)
    }
}

/// Read a `{"schema": .., "records": [..]}` JSON file
pub fn read_pivot_input<P: AsRef<Path>>(path: P) -> Result<PivotInput> {
    let file = File::open(path.as_ref())?;
    let input = PivotInput::from_reader(BufReader::new(file))?;
    log::debug!(
        "read {} records from {}",
        input.records.as_ref().map_or(0, Vec::len),
        path.as_ref().display()
    );
    Ok(input)
}

/// Write a series matrix as JSON
pub fn write_series_matrix<P: AsRef<Path>>(path: P, matrix: &SeriesMatrix) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, matrix)?;
    Ok(())
}

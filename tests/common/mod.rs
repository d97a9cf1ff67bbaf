//! Shared fixtures for integration tests
//!
//! A small task tracker: priorities, workflow state, tags, due dates and
//! logged hours.

#![allow(dead_code)]

use std::io::Write;

use chartpivot::{PropertySchema, PropertyValue, Record, TypeDescriptor};
use tempfile::NamedTempFile;

pub fn task_schema() -> PropertySchema {
    PropertySchema::new()
        .with_property("priority", TypeDescriptor::select(["High", "Low"]))
        .with_property("state", TypeDescriptor::status(["Open", "Done"]))
        .with_property("tags", TypeDescriptor::multi_select(["bug", "ui", "api"]))
        .with_property("due", TypeDescriptor::date())
        .with_property("hours", TypeDescriptor::number())
        .with_property("title", TypeDescriptor::other("title"))
}

/// A task with a priority and logged hours
pub fn task(priority: &str, hours: f64) -> Record {
    Record::new()
        .with("priority", PropertyValue::select(priority))
        .with("hours", PropertyValue::number(hours))
}

/// Records from Scenario A: High/2, High/4, Low/10
pub fn scenario_records() -> Vec<Record> {
    vec![task("High", 2.0), task("High", 4.0), task("Low", 10.0)]
}

/// Write `contents` to a temp file with the given suffix (e.g. ".json")
pub fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("chartpivot_test_")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

//! Ordered, deduplicated category labels for an axis
//!
//! Each category kind has its own domain type; all of them answer the same
//! two questions: which labels exist, and which of them a record falls in.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::binning::Binner;
use crate::error::Result;
use crate::record::Record;
use crate::resolve::CategoryKind;
use crate::schema::PropertySchema;

/// Default format applied to date categories
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Case-normalize a category label
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase()
}

/// The category space of one axis
pub trait CategoryDomain: std::fmt::Debug {
    /// Labels in output order
    fn labels(&self) -> &[String];

    /// Positions in `labels()` the record belongs to; several under fan-out,
    /// none when the value is null, absent or outside the domain
    fn slots_of(&self, record: &Record) -> Vec<usize>;

    fn len(&self) -> usize {
        self.labels().len()
    }

    fn is_empty(&self) -> bool {
        self.labels().is_empty()
    }
}

/// Insertion-ordered label list with a reverse index
#[derive(Debug, Clone, Default)]
struct LabelSet {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSet {
    /// Insert a label, returning its position; duplicates keep the first slot
    fn push(&mut self, label: String) -> usize {
        if let Some(&pos) = self.index.get(&label) {
            return pos;
        }
        let pos = self.labels.len();
        self.index.insert(label.clone(), pos);
        self.labels.push(label);
        pos
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}

impl FromIterator<String> for LabelSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = LabelSet::default();
        for label in iter {
            set.push(label);
        }
        set
    }
}

/// Declared options of a select, status or multi-select property
#[derive(Debug, Clone)]
pub struct OptionsDomain {
    field: String,
    labels: LabelSet,
}

impl OptionsDomain {
    pub fn new(field: &str, schema: &PropertySchema) -> Self {
        let labels: LabelSet = schema
            .get(field)
            .map(|d| d.option_names().map(normalize_label).collect())
            .unwrap_or_default();
        OptionsDomain {
            field: field.to_string(),
            labels,
        }
    }
}

impl CategoryDomain for OptionsDomain {
    fn labels(&self) -> &[String] {
        &self.labels.labels
    }

    fn slots_of(&self, record: &Record) -> Vec<usize> {
        record
            .option_names(&self.field)
            .into_iter()
            .filter_map(|name| self.labels.position(&normalize_label(name)))
            .collect()
    }
}

/// Parse an ISO date or timestamp, keeping the calendar date as written
pub fn parse_iso_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Format a raw date value as a category label
pub fn format_date(raw: &str, format: &str) -> Option<String> {
    let parsed = parse_iso_date(raw)?;
    let mut out = String::new();
    write!(out, "{}", parsed.format(format)).ok()?;
    Some(normalize_label(&out))
}

/// Distinct dates observed in the data, sorted lexicographically
#[derive(Debug, Clone)]
pub struct DateDomain {
    field: String,
    format: String,
    labels: LabelSet,
}

impl DateDomain {
    pub fn new(field: &str, records: &[Record], format: &str) -> Self {
        let mut seen = BTreeSet::new();
        for record in records {
            let Some(raw) = record.date(field) else {
                continue;
            };
            match format_date(raw, format) {
                Some(label) => {
                    seen.insert(label);
                }
                None => log::warn!("skipping unparseable date '{}' in '{}'", raw, field),
            }
        }
        DateDomain {
            field: field.to_string(),
            format: format.to_string(),
            labels: seen.into_iter().collect(),
        }
    }
}

impl CategoryDomain for DateDomain {
    fn labels(&self) -> &[String] {
        &self.labels.labels
    }

    fn slots_of(&self, record: &Record) -> Vec<usize> {
        record
            .date(&self.field)
            .and_then(|raw| format_date(raw, &self.format))
            .and_then(|label| self.labels.position(&label))
            .into_iter()
            .collect()
    }
}

/// Equal-width bins of a numeric property
#[derive(Debug, Clone)]
pub struct NumericDomain {
    field: String,
    binner: Binner,
    labels: LabelSet,
    /// Bin index to label position; bins whose labels format identically share a slot
    bin_slots: Vec<usize>,
}

impl NumericDomain {
    pub fn new(field: &str, records: &[Record], bin_count: usize) -> Result<Self> {
        let binner = Binner::from_records(records, field, bin_count)?;
        let mut labels = LabelSet::default();
        let bin_slots: Vec<usize> = binner
            .bin_labels()
            .into_iter()
            .map(|label| labels.push(label))
            .collect();
        Ok(NumericDomain {
            field: field.to_string(),
            binner,
            labels,
            bin_slots,
        })
    }

    pub fn binner(&self) -> &Binner {
        &self.binner
    }
}

impl CategoryDomain for NumericDomain {
    fn labels(&self) -> &[String] {
        &self.labels.labels
    }

    fn slots_of(&self, record: &Record) -> Vec<usize> {
        record
            .number(&self.field)
            .and_then(|v| self.bin_slots.get(self.binner.assign(v)).copied())
            .into_iter()
            .collect()
    }
}

/// Build the category domain of `axis` for the given kind
pub fn categories_for(
    axis: &str,
    kind: CategoryKind,
    schema: &PropertySchema,
    records: &[Record],
    bin_count: usize,
    date_format: &str,
) -> Result<Box<dyn CategoryDomain>> {
    let domain: Box<dyn CategoryDomain> = match kind {
        CategoryKind::FixedOptions => Box::new(OptionsDomain::new(axis, schema)),
        CategoryKind::DiscoveredOrdinal => Box::new(DateDomain::new(axis, records, date_format)),
        CategoryKind::Continuous => Box::new(NumericDomain::new(axis, records, bin_count)?),
    };
    log::debug!(
        "axis '{}' ({:?}) has {} categories",
        axis,
        kind,
        domain.len()
    );
    Ok(domain)
}

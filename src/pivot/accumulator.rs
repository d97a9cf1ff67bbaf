//! Single-pass accumulation of records into per-category state
//!
//! Running state lives in side accumulators indexed by X slot and is only
//! projected into public rows once the pass is finished.

use crate::domain::CategoryDomain;
use crate::matrix::SeriesMatrix;
use crate::record::Record;

use super::{Aggregation, COUNT};

/// The aggregations that produce one value per X category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ValueMode {
    Sum,
    Avg,
    Latest,
    Oldest,
}

impl ValueMode {
    /// `None` for `Categorize`, which cross-tabulates against bins instead
    pub(super) fn of(aggregation: Aggregation) -> Option<Self> {
        match aggregation {
            Aggregation::Sum => Some(ValueMode::Sum),
            Aggregation::Avg => Some(ValueMode::Avg),
            Aggregation::Latest => Some(ValueMode::Latest),
            Aggregation::Oldest => Some(ValueMode::Oldest),
            Aggregation::Categorize => None,
        }
    }

    /// Name of the single output series
    pub(super) fn series_key(self) -> &'static str {
        match self {
            ValueMode::Sum => "sum",
            ValueMode::Avg => "avg",
            ValueMode::Latest | ValueMode::Oldest => "value",
        }
    }
}

/// Running state of one X category under a value-producing aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotState {
    Sum(f64),
    Mean { sum: f64, count: usize },
    /// Lowest record index seen so far wins; `None` stands for +infinity
    Latest { value: f64, index: Option<usize> },
    /// Highest record index seen so far wins, ties overwrite
    Oldest { value: f64, index: usize },
}

impl SlotState {
    fn new(mode: ValueMode) -> Self {
        match mode {
            ValueMode::Sum => SlotState::Sum(0.0),
            ValueMode::Avg => SlotState::Mean { sum: 0.0, count: 0 },
            ValueMode::Latest => SlotState::Latest {
                value: 0.0,
                index: None,
            },
            ValueMode::Oldest => SlotState::Oldest {
                value: 0.0,
                index: 0,
            },
        }
    }

    fn observe(&mut self, v: f64, record_index: usize) {
        match self {
            SlotState::Sum(total) => *total += v,
            SlotState::Mean { sum, count } => {
                *sum += v;
                *count += 1;
            }
            SlotState::Latest { value, index } => {
                if index.map_or(true, |seen| record_index < seen) {
                    *value = v;
                    *index = Some(record_index);
                }
            }
            SlotState::Oldest { value, index } => {
                if record_index >= *index {
                    *value = v;
                    *index = record_index;
                }
            }
        }
    }

    fn finish(self) -> f64 {
        match self {
            SlotState::Sum(total) => total,
            SlotState::Mean { sum, count } => {
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            }
            SlotState::Latest { value, .. } | SlotState::Oldest { value, .. } => value,
        }
    }
}

/// Count records per X category; multi-valued X counts once per matched option
pub(super) fn count(records: &[Record], x: &dyn CategoryDomain) -> SeriesMatrix {
    let mut counts = vec![0.0; x.len()];

    for (i, record) in records.iter().enumerate() {
        let slots = x.slots_of(record);
        if slots.is_empty() {
            log::trace!("record {} has no X category, skipped", i);
            continue;
        }
        for slot in slots {
            counts[slot] += 1.0;
        }
    }

    let grid = counts.into_iter().map(|c| vec![c]).collect();
    SeriesMatrix::from_grid(vec![COUNT.to_string()], x.labels(), grid)
}

/// Cross-tabulate X against Y categories with full fan-out on both sides
pub(super) fn cross_tabulate(
    records: &[Record],
    x: &dyn CategoryDomain,
    y: &dyn CategoryDomain,
) -> SeriesMatrix {
    let mut grid = vec![vec![0.0; y.len()]; x.len()];

    for (i, record) in records.iter().enumerate() {
        let xs = x.slots_of(record);
        let ys = y.slots_of(record);
        if xs.is_empty() || ys.is_empty() {
            log::trace!("record {} lacks an X or Y category, skipped", i);
            continue;
        }
        for &xi in &xs {
            for &yi in &ys {
                grid[xi][yi] += 1.0;
            }
        }
    }

    SeriesMatrix::from_grid(y.labels().to_vec(), x.labels(), grid)
}

/// Combine numeric `field` values per X category
pub(super) fn aggregate(
    records: &[Record],
    x: &dyn CategoryDomain,
    field: &str,
    mode: ValueMode,
) -> SeriesMatrix {
    let mut states = vec![SlotState::new(mode); x.len()];

    for (i, record) in records.iter().enumerate() {
        let Some(v) = record.number(field) else {
            log::trace!("record {} has no value for '{}', skipped", i, field);
            continue;
        };
        for slot in x.slots_of(record) {
            states[slot].observe(v, i);
        }
    }

    let grid = states.into_iter().map(|s| vec![s.finish()]).collect();
    SeriesMatrix::from_grid(vec![mode.series_key().to_string()], x.labels(), grid)
}

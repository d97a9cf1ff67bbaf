//! Equal-width binning of a continuous numeric domain
//!
//! Bins are recomputed from the record set on every call; nothing about
//! their boundaries is persisted.

use crate::error::{Error, Result};
use crate::record::Record;

/// Number of bins used when the caller does not choose one
pub const DEFAULT_BIN_COUNT: usize = 5;

/// A half-open interval `[start, end)`; the last bin also contains `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
}

impl Bin {
    /// Label in the form `"<start>-<end>"` with one decimal place
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1}", self.start, self.end)
    }

    pub fn contains(&self, value: f64, is_last: bool) -> bool {
        value >= self.start && (value < self.end || (is_last && value <= self.end))
    }
}

/// Equal-width bins spanning the observed `[min, max]` of a numeric field
#[derive(Debug, Clone, PartialEq)]
pub struct Binner {
    min: f64,
    max: f64,
    width: f64,
    bins: Vec<Bin>,
}

impl Binner {
    /// Build `bin_count` bins over the finite values in `values`
    pub fn new<I>(values: I, bin_count: usize) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if bin_count == 0 {
            return Err(Error::InvalidConfig("bin count must be at least 1".to_string()));
        }

        let mut range: Option<(f64, f64)> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }

        let binner = match range {
            None => Binner {
                min: 0.0,
                max: 0.0,
                width: 0.0,
                bins: Vec::new(),
            },
            Some((min, max)) if min == max => Binner {
                min,
                max,
                width: 0.0,
                bins: vec![Bin { start: min, end: max }],
            },
            Some((min, max)) => {
                // max - min overflows for values near opposite ends of f64
                let span = max - min;
                let width = if span.is_finite() {
                    span / bin_count as f64
                } else {
                    max / bin_count as f64 - min / bin_count as f64
                };
                let edge = |k: usize| {
                    if span.is_finite() {
                        min + k as f64 * width
                    } else {
                        (min / 2.0 + k as f64 * (width / 2.0)) * 2.0
                    }
                };
                let bins = (0..bin_count)
                    .map(|i| Bin {
                        start: edge(i),
                        end: if i + 1 == bin_count { max } else { edge(i + 1) },
                    })
                    .collect();
                Binner {
                    min,
                    max,
                    width,
                    bins,
                }
            }
        };

        log::trace!(
            "binned [{}, {}] into {} bin(s) of width {}",
            binner.min,
            binner.max,
            binner.bins.len(),
            binner.width
        );
        Ok(binner)
    }

    /// Bin the non-null values of `field` across `records`
    pub fn from_records(records: &[Record], field: &str, bin_count: usize) -> Result<Self> {
        Self::new(records.iter().filter_map(|r| r.number(field)), bin_count)
    }

    /// True when all observed values were equal, or there were none
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0
    }

    /// Labels in ascending bin order
    pub fn bin_labels(&self) -> Vec<String> {
        if self.is_degenerate() {
            return self
                .bins
                .iter()
                .map(|b| format!("{:.1}", b.start))
                .collect();
        }
        self.bins.iter().map(Bin::label).collect()
    }

    /// Index of the bin holding `value`, clamped so `max` lands in the last bin
    pub fn assign(&self, value: f64) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        let offset = value - self.min;
        let raw = if offset.is_finite() {
            offset / self.width
        } else {
            value / self.width - self.min / self.width
        }
        .floor();
        if raw.is_nan() || raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.bins.len() - 1)
        }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Observed range, `None` when no values were seen
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.bins.is_empty() {
            None
        } else {
            Some((self.min, self.max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_widths() {
        let binner = Binner::new(vec![0.0, 10.0, 3.0], 5).unwrap();
        assert_eq!(
            binner.bin_labels(),
            vec!["0.0-2.0", "2.0-4.0", "4.0-6.0", "6.0-8.0", "8.0-10.0"]
        );
        assert_eq!(binner.range(), Some((0.0, 10.0)));
    }

    #[test]
    fn test_assign_clamps_max_into_last_bin() {
        let binner = Binner::new(vec![0.0, 10.0], 5).unwrap();
        assert_eq!(binner.assign(0.0), 0);
        assert_eq!(binner.assign(1.99), 0);
        assert_eq!(binner.assign(2.0), 1);
        assert_eq!(binner.assign(9.99), 4);
        assert_eq!(binner.assign(10.0), 4);
        // outside the observed range still maps to a bin
        assert_eq!(binner.assign(-3.0), 0);
        assert_eq!(binner.assign(42.0), 4);
    }

    #[test]
    fn test_degenerate_single_value() {
        let binner = Binner::new(vec![7.0, 7.0, 7.0], 5).unwrap();
        assert_eq!(binner.bin_labels(), vec!["7.0"]);
        assert_eq!(binner.assign(7.0), 0);
        assert!(binner.is_degenerate());
    }

    #[test]
    fn test_no_values() {
        let binner = Binner::new(Vec::new(), 5).unwrap();
        assert!(binner.is_empty());
        assert!(binner.bin_labels().is_empty());
        assert_eq!(binner.assign(3.0), 0);
        assert_eq!(binner.range(), None);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let binner = Binner::new(vec![f64::NAN, 1.0, f64::INFINITY, 3.0], 2).unwrap();
        assert_eq!(binner.bin_labels(), vec!["1.0-2.0", "2.0-3.0"]);
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let binner = Binner::new(vec![-1e308, 1e308], 5).unwrap();
        assert!(binner
            .bins()
            .iter()
            .all(|b| b.start.is_finite() && b.end.is_finite()));
        assert!(binner.bin_labels().iter().all(|l| !l.contains("inf")));
        assert_eq!(binner.assign(-1e308), 0);
        assert_eq!(binner.assign(0.0), 2);
        assert_eq!(binner.assign(9e307), 4);
        assert_eq!(binner.assign(1e308), 4);
        for pair in binner.bins().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(matches!(
            Binner::new(vec![1.0], 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bins_tile_the_range() {
        let binner = Binner::new(vec![-4.5, 13.25, 0.3], 7).unwrap();
        let bins = binner.bins();
        assert_eq!(bins.first().unwrap().start, -4.5);
        assert_eq!(bins.last().unwrap().end, 13.25);
        for pair in bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}

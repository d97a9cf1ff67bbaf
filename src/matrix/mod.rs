//! Dense series matrix handed to chart renderers

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

/// Row key holding the X category label
pub const CLASS_KEY: &str = "class";

/// Largest integer an f64 holds exactly; integral values up to it serialize as integers
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// One X category with a value for every series key
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    class: String,
    series: Vec<(String, f64)>,
}

impl Row {
    /// Zip `keys` with `values`; both come from the same matrix so lengths agree
    pub(crate) fn from_parts(class: String, keys: &[String], values: Vec<f64>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Row {
            class,
            series: keys.iter().cloned().zip(values).collect(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.series
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Series entries in `config` order
    pub fn series(&self) -> &[(String, f64)] {
        &self.series
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(k, _)| k.as_str())
    }
}

fn serialize_number<S>(map: &mut S, key: &str, value: f64) -> std::result::Result<(), S::Error>
where
    S: SerializeMap,
{
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
        map.serialize_entry(key, &(value as i64))
    } else {
        map.serialize_entry(key, &value)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry(CLASS_KEY, &self.class)?;
        for (key, value) in &self.series {
            serialize_number(&mut map, key, *value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object with a 'class' string and numeric series values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Row, A::Error> {
        let mut class = None;
        let mut series = Vec::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == CLASS_KEY {
                class = Some(access.next_value::<String>()?);
            } else {
                series.push((key, access.next_value::<f64>()?));
            }
        }
        let class = class.ok_or_else(|| de::Error::missing_field(CLASS_KEY))?;
        Ok(Row { class, series })
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Row, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

/// Make series keys usable as row keys next to `class`
///
/// A category labeled `class` (or one already taken by an earlier rename)
/// gets underscores appended until it is unique. Order is preserved.
pub fn series_keys(labels: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = labels.iter().cloned().collect();
    let mut keys = Vec::with_capacity(labels.len());
    for label in labels {
        if label != CLASS_KEY {
            keys.push(label);
            continue;
        }
        let mut key = format!("{}_", label);
        while taken.contains(&key) {
            key.push('_');
        }
        log::debug!("series key '{}' renamed to '{}'", label, key);
        taken.insert(key.clone());
        keys.push(key);
    }
    keys
}

/// Output of a pivot: series keys plus one dense row per X category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMatrix {
    /// Series keys in draw/legend order
    pub config: Vec<String>,
    pub data: Vec<Row>,
}

impl SeriesMatrix {
    /// Build a matrix from X labels and a row-major value grid
    pub(crate) fn from_grid(config: Vec<String>, classes: &[String], grid: Vec<Vec<f64>>) -> Self {
        let config = series_keys(config);
        let data = classes
            .iter()
            .cloned()
            .zip(grid)
            .map(|(class, values)| Row::from_parts(class, &config, values))
            .collect();
        SeriesMatrix { config, data }
    }

    pub fn row(&self, class: &str) -> Option<&Row> {
        self.data.iter().find(|r| r.class == class)
    }

    /// Value of `key` in the row for `class`
    pub fn value(&self, class: &str, key: &str) -> Option<f64> {
        self.row(class).and_then(|r| r.get(key))
    }

    /// Every row carries exactly the `config` keys, in order
    pub fn is_dense(&self) -> bool {
        self.data
            .iter()
            .all(|r| r.keys().eq(self.config.iter().map(String::as_str)))
    }

    /// Sum of one series across all rows
    pub fn total(&self, key: &str) -> f64 {
        self.data.iter().filter_map(|r| r.get(key)).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SeriesMatrix {
        SeriesMatrix::from_grid(
            vec!["open".to_string(), "done".to_string()],
            &["high".to_string(), "low".to_string()],
            vec![vec![1.0, 0.0], vec![0.5, 2.0]],
        )
    }

    #[test]
    fn test_rows_are_dense_and_ordered() {
        let m = sample();
        assert!(m.is_dense());
        assert_eq!(m.value("high", "open"), Some(1.0));
        assert_eq!(m.value("low", "done"), Some(2.0));
        assert_eq!(m.value("low", "missing"), None);
        assert_eq!(m.total("open"), 1.5);
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"config":["open","done"],"data":[{"class":"high","open":1,"done":0},{"class":"low","open":0.5,"done":2}]}"#
        );
    }

    #[test]
    fn test_class_label_is_renamed() {
        let keys = series_keys(vec![
            "class".to_string(),
            "class_".to_string(),
            "other".to_string(),
        ]);
        assert_eq!(keys, vec!["class__", "class_", "other"]);

        let m = SeriesMatrix::from_grid(
            vec!["class".to_string()],
            &["high".to_string()],
            vec![vec![1.0]],
        );
        assert_eq!(m.config, vec!["class_"]);
        assert_eq!(
            m.to_json().unwrap(),
            r#"{"config":["class_"],"data":[{"class":"high","class_":1}]}"#
        );
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let m = sample();
        let back: SeriesMatrix = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        assert_eq!(back, m);
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Co2Class – ambient vs elevated rings
// ---------------------------------------------------------------------------

/// Whether a ring runs at ambient or elevated CO₂ concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Co2Class {
    #[serde(rename = "aCO2")]
    Ambient,
    #[serde(rename = "eCO2")]
    Elevated,
}

impl Co2Class {
    /// Site convention: rings 1, 3 and 6 are ambient, rings 2, 4 and 5 elevated.
    pub fn infer(ring: &str) -> Self {
        match ring {
            "Ring_2" | "Ring_4" | "Ring_5" => Co2Class::Elevated,
            _ => Co2Class::Ambient,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Co2Class::Ambient => "aCO2",
            Co2Class::Elevated => "eCO2",
        }
    }
}

impl fmt::Display for Co2Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SourceOrigin – where a raw batch of readings came from
// ---------------------------------------------------------------------------

/// Tag on raw readings before the merge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    Historical,
    Recent,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::Historical => f.write_str("historical"),
            SourceOrigin::Recent => f.write_str("recent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading – one timestamped row
// ---------------------------------------------------------------------------

/// A single timestamped measurement row.
///
/// Every declared measurement column gets an entry; a value that failed
/// numeric parsing is an explicit `None`, not a missing key.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// measurement-type name → value (None = absent at this timestamp).
    pub values: BTreeMap<String, Option<f64>>,
}

impl Reading {
    pub fn value(&self, measurement: &str) -> Option<f64> {
        self.values.get(measurement).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// RingSeries – the merged time series of one ring
// ---------------------------------------------------------------------------

/// One ring's continuous series after the merge step.
/// Readings are strictly ascending by timestamp, unique per timestamp.
#[derive(Debug, Clone)]
pub struct RingSeries {
    pub ring: String,
    pub class: Co2Class,
    pub readings: Vec<Reading>,
}

impl RingSeries {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// First and last timestamp, if any readings exist.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.readings.first(), self.readings.last()) {
            (Some(a), Some(b)) => Some((a.timestamp, b.timestamp)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RingDataset – the complete merged dataset for a session
// ---------------------------------------------------------------------------

/// All merged ring series plus pre-computed indices.
///
/// Owned by the session and passed by reference into every filter call;
/// nothing else holds or mutates it.
#[derive(Debug, Clone)]
pub struct RingDataset {
    pub series: Vec<RingSeries>,
    /// Union of measurement-type names across all rings, sorted.
    pub measurement_types: BTreeSet<String>,
}

impl RingDataset {
    /// Build the dataset indices from merged per-ring series.
    pub fn from_series(mut series: Vec<RingSeries>) -> Self {
        series.sort_by(|a, b| a.ring.cmp(&b.ring));

        let mut measurement_types = BTreeSet::new();
        for s in &series {
            for r in &s.readings {
                for name in r.values.keys() {
                    measurement_types.insert(name.clone());
                }
            }
        }

        RingDataset {
            series,
            measurement_types,
        }
    }

    pub fn ring_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.ring.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.is_empty())
    }

    /// Total number of readings across all rings.
    pub fn total_readings(&self) -> usize {
        self.series.iter().map(|s| s.len()).sum()
    }

    /// Earliest and latest timestamp across all rings.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for s in &self.series {
            if let Some((lo, hi)) = s.time_bounds() {
                bounds = Some(match bounds {
                    None => (lo, hi),
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                });
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(ts: &str, value: f64) -> Reading {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        let mut values = BTreeMap::new();
        values.insert("CO2_Avg".to_string(), Some(value));
        Reading { timestamp, values }
    }

    #[test]
    fn class_inference_follows_site_convention() {
        assert_eq!(Co2Class::infer("Ring_1"), Co2Class::Ambient);
        assert_eq!(Co2Class::infer("Ring_2"), Co2Class::Elevated);
        assert_eq!(Co2Class::infer("Ring_5"), Co2Class::Elevated);
        assert_eq!(Co2Class::infer("Ring_6"), Co2Class::Ambient);
    }

    #[test]
    fn dataset_collects_types_and_bounds() {
        let series = vec![
            RingSeries {
                ring: "Ring_2".into(),
                class: Co2Class::Elevated,
                readings: vec![reading("2024-01-02 00:00:00", 550.0)],
            },
            RingSeries {
                ring: "Ring_1".into(),
                class: Co2Class::Ambient,
                readings: vec![
                    reading("2024-01-01 00:00:00", 410.0),
                    reading("2024-01-03 00:00:00", 415.0),
                ],
            },
        ];
        let ds = RingDataset::from_series(series);

        assert_eq!(ds.ring_names(), vec!["Ring_1", "Ring_2"]);
        assert_eq!(ds.total_readings(), 3);
        assert!(ds.measurement_types.contains("CO2_Avg"));

        let (lo, hi) = ds.time_bounds().unwrap();
        assert_eq!(lo.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(hi.date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn absent_value_is_explicit_none() {
        let mut values = BTreeMap::new();
        values.insert("CO2_Avg".to_string(), None);
        let r = Reading {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            values,
        };
        assert!(r.values.contains_key("CO2_Avg"));
        assert_eq!(r.value("CO2_Avg"), None);
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::model::{Co2Class, Reading, RingSeries};

// ---------------------------------------------------------------------------
// Merge: historical parts + recent series → one continuous RingSeries
// ---------------------------------------------------------------------------

/// Merge one ring's historical parts and recent series.
///
/// Precedence is row-granular, never per-field:
/// * historical parts are applied in listed order, a later part replacing an
///   earlier one on shared timestamps;
/// * the recent series is applied last and replaces any historical row with
///   the same timestamp entirely.
///
/// The output is unique per timestamp and sorted ascending.
pub fn merge(
    ring: &str,
    class: Co2Class,
    historical_parts: &[Vec<Reading>],
    recent: Vec<Reading>,
) -> RingSeries {
    let mut by_timestamp: BTreeMap<NaiveDateTime, Reading> = BTreeMap::new();

    let mut historical_rows = 0usize;
    for part in historical_parts {
        for reading in part {
            historical_rows += 1;
            by_timestamp.insert(reading.timestamp, reading.clone());
        }
    }

    let mut overridden = 0usize;
    let recent_rows = recent.len();
    for reading in recent {
        if by_timestamp.insert(reading.timestamp, reading).is_some() {
            overridden += 1;
        }
    }

    log::debug!(
        "{ring}: merged {historical_rows} historical + {recent_rows} recent rows \
         ({overridden} historical rows replaced by recent)"
    );

    RingSeries {
        ring: ring.to_string(),
        class,
        readings: by_timestamp.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn reading(ts: &str, pairs: &[(&str, f64)]) -> Reading {
        let timestamp =
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        let values: BTreeMap<String, Option<f64>> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(*v)))
            .collect();
        Reading { timestamp, values }
    }

    #[test]
    fn recent_row_replaces_historical_row_entirely() {
        let historical = vec![vec![reading("2024-01-01 00:00:00", &[("A", 1.0)])]];
        let recent = vec![reading("2024-01-01 00:00:00", &[("A", 2.0), ("B", 3.0)])];

        let merged = merge("Ring_1", Co2Class::Ambient, &historical, recent);

        assert_eq!(merged.len(), 1);
        let row = &merged.readings[0];
        assert_eq!(row.value("A"), Some(2.0));
        assert_eq!(row.value("B"), Some(3.0));
        // historical's A is fully discarded, not combined
        assert_eq!(row.values.len(), 2);
    }

    #[test]
    fn later_historical_part_wins_on_overlap() {
        let historical = vec![
            vec![
                reading("2024-01-01 00:00:00", &[("A", 1.0)]),
                reading("2024-01-02 00:00:00", &[("A", 2.0)]),
            ],
            vec![
                reading("2024-01-02 00:00:00", &[("A", 20.0)]),
                reading("2024-01-03 00:00:00", &[("A", 3.0)]),
            ],
        ];

        let merged = merge("Ring_1", Co2Class::Ambient, &historical, Vec::new());

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.readings[1].value("A"), Some(20.0));
    }

    #[test]
    fn merge_is_idempotent() {
        let rows = vec![
            reading("2024-01-01 00:00:00", &[("A", 1.0)]),
            reading("2024-01-02 00:00:00", &[("A", 2.0)]),
        ];
        let merged = merge(
            "Ring_1",
            Co2Class::Ambient,
            &[rows.clone()],
            rows.clone(),
        );
        assert_eq!(merged.readings, rows);
    }

    #[test]
    fn output_is_strictly_ascending_without_duplicates() {
        let historical = vec![vec![
            reading("2024-01-03 00:00:00", &[("A", 3.0)]),
            reading("2024-01-01 00:00:00", &[("A", 1.0)]),
            reading("2024-01-01 00:00:00", &[("A", 1.5)]),
        ]];
        let recent = vec![reading("2024-01-02 00:00:00", &[("A", 2.0)])];

        let merged = merge("Ring_1", Co2Class::Ambient, &historical, recent);

        for pair in merged.readings.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        assert_eq!(merged.len(), 3);
    }
}

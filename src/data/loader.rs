use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use super::model::{Reading, SourceOrigin};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one downloaded logger CSV into a sequence of readings.
///
/// File shape (Campbell-style export):
/// * line 1 – station preamble, skipped
/// * line 2 – header row; one column contains "timestamp" (case-insensitive),
///   every other column is a measurement type
/// * remaining lines – data rows
///
/// Rows with an unparsable timestamp are dropped and logged, never fatal.
/// A measurement cell that fails numeric parsing becomes `None` for that
/// column on that row only.
pub fn load_csv(path: &Path, ring: &str, origin: SourceOrigin) -> Result<Vec<Reading>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(skip_preamble(file)?);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let ts_idx = headers
        .iter()
        .position(|h| h.to_ascii_lowercase().contains("timestamp"))
        .with_context(|| format!("{}: no timestamp column", path.display()))?;

    let measurement_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut readings = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{}: row {row_no}: {e}", path.display());
                dropped += 1;
                continue;
            }
        };

        let raw_ts = record.get(ts_idx).unwrap_or("").trim();
        let timestamp = match parse_timestamp(raw_ts) {
            Some(ts) => ts,
            None => {
                log::warn!(
                    "{}: row {row_no}: unparsable timestamp '{raw_ts}', dropping row",
                    path.display()
                );
                dropped += 1;
                continue;
            }
        };

        let mut values = BTreeMap::new();
        for (col_idx, name) in &measurement_cols {
            let cell = record.get(*col_idx).unwrap_or("").trim();
            values.insert(name.clone(), cell.parse::<f64>().ok().filter(|v| v.is_finite()));
        }

        readings.push(Reading { timestamp, values });
    }

    log::info!(
        "{}: loaded {} {origin} readings for {ring} ({dropped} rows dropped)",
        path.display(),
        readings.len()
    );

    Ok(readings)
}

/// Consume the station preamble line and hand the rest to the CSV reader.
fn skip_preamble(file: std::fs::File) -> Result<impl std::io::Read> {
    use std::io::{BufRead, BufReader};

    let mut buf = BufReader::new(file);
    let mut preamble = String::new();
    buf.read_line(&mut preamble).context("reading preamble line")?;
    Ok(buf)
}

/// Accepted timestamp shapes, most specific first.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    // Bare dates map to midnight.
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_sample(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_rows_after_preamble() {
        let f = write_sample(
            "TOA5,Ring_1,CR1000\n\
             TIMESTAMP,CO2_Avg,CO2_dry\n\
             2024-01-01 00:00:00,412.5,410.1\n\
             2024-01-01 00:05:00,413.0,410.8\n",
        );
        let readings = load_csv(f.path(), "Ring_1", SourceOrigin::Historical).unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value("CO2_Avg"), Some(412.5));
        assert_eq!(readings[1].value("CO2_dry"), Some(410.8));
    }

    #[test]
    fn bad_timestamp_drops_row_only() {
        let f = write_sample(
            "preamble\n\
             TIMESTAMP,CO2_Avg\n\
             not-a-date,412.5\n\
             2024-01-01 00:05:00,413.0\n",
        );
        let readings = load_csv(f.path(), "Ring_1", SourceOrigin::Recent).unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value("CO2_Avg"), Some(413.0));
    }

    #[test]
    fn bad_numeric_cell_becomes_none() {
        let f = write_sample(
            "preamble\n\
             TIMESTAMP,CO2_Avg,CO2_dry\n\
             2024-01-01 00:00:00,NAN,410.1\n",
        );
        let readings = load_csv(f.path(), "Ring_1", SourceOrigin::Historical).unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value("CO2_Avg"), None);
        assert_eq!(readings[0].value("CO2_dry"), Some(410.1));
        // the column is still declared, just absent
        assert!(readings[0].values.contains_key("CO2_Avg"));
    }

    #[test]
    fn fractional_second_timestamps_are_accepted() {
        let f = write_sample(
            "preamble\n\
             TIMESTAMP,CO2_Avg\n\
             2024-01-01 00:00:00.25,412.5\n\
             2024-01-01 00:05:00.75,413.0\n",
        );
        let readings = load_csv(f.path(), "Ring_1", SourceOrigin::Historical).unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(
            readings[0].timestamp,
            NaiveDateTime::parse_from_str("2024-01-01 00:00:00.25", "%Y-%m-%d %H:%M:%S%.f")
                .unwrap()
        );
    }

    #[test]
    fn bare_dates_map_to_midnight() {
        let f = write_sample(
            "preamble\n\
             TIMESTAMP,CO2_Avg\n\
             2024-01-01,412.5\n",
        );
        let readings = load_csv(f.path(), "Ring_1", SourceOrigin::Historical).unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(
            readings[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn timestamp_column_found_case_insensitively() {
        let f = write_sample(
            "preamble\n\
             Timestamp_UTC,CO2_Avg\n\
             2024-03-05 12:00:00,420.0\n",
        );
        let readings = load_csv(f.path(), "Ring_3", SourceOrigin::Historical).unwrap();
        assert_eq!(readings.len(), 1);
    }

    #[test]
    fn missing_timestamp_column_is_an_error() {
        let f = write_sample("preamble\nDate,CO2_Avg\n2024-01-01,400.0\n");
        assert!(load_csv(f.path(), "Ring_1", SourceOrigin::Historical).is_err());
    }
}

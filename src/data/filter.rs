use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::model::{Co2Class, RingDataset};

/// Elevated rings occasionally sample ambient air during fumigation gaps;
/// values under this floor are excluded from the stats aggregation (they
/// still appear in the plot).
pub const ELEVATED_STATS_FLOOR: f64 = 350.0;

// ---------------------------------------------------------------------------
// Selection – one user query, rebuilt on every interaction
// ---------------------------------------------------------------------------

/// Inclusive time-of-day window, compared against the time part of each
/// timestamp. The statistics query uses this to restrict aggregation to e.g.
/// daylight hours; the plot query spans the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// 00:00:00 through 23:59:59 — no time-of-day restriction.
    pub fn full_day() -> Self {
        TimeWindow {
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_opt(23, 59, 59).expect("valid time literal"),
        }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

/// The user's current query: date range, time-of-day window, rings,
/// measurement types, and an optional CO₂ class restriction (`None` = both
/// classes).
#[derive(Debug, Clone)]
pub struct Selection {
    /// Inclusive range, compared against the date part of each timestamp.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub time: TimeWindow,
    pub rings: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub class: Option<Co2Class>,
}

impl Selection {
    /// No rings or no types chosen means there is nothing to show; this is a
    /// defined display state, not an error.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() || self.types.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Identifies one plotted line / stats row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeriesKey {
    pub ring: String,
    pub measurement: String,
}

impl SeriesKey {
    pub fn label(&self) -> String {
        format!("{} · {}", self.ring, self.measurement)
    }
}

/// Timestamped points for one (ring, measurement) pair; `None` marks an
/// absent value and renders as a gap in the line.
pub type SeriesPoints = Vec<(NaiveDateTime, Option<f64>)>;

/// Summary statistics over the non-absent values of one (ring, measurement)
/// pair within a selection. With zero qualifying values, `count` is 0 and the
/// remaining fields are `None` ("no data"), never 0.0 and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SummaryStats {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl SummaryStats {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut stats = SummaryStats::default();
        let mut sum = 0.0;
        for v in values {
            stats.count += 1;
            sum += v;
            stats.min = Some(stats.min.map_or(v, |m: f64| m.min(v)));
            stats.max = Some(stats.max.map_or(v, |m: f64| m.max(v)));
        }
        if stats.count > 0 {
            stats.mean = Some(sum / stats.count as f64);
        }
        stats
    }
}

/// The filtered projection of the dataset for one selection.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    pub series: BTreeMap<SeriesKey, SeriesPoints>,
    pub stats: BTreeMap<SeriesKey, SummaryStats>,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.series.values().all(|pts| pts.is_empty())
    }

    /// Number of included timestamped points across all series.
    pub fn point_count(&self) -> usize {
        self.series.values().map(|pts| pts.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// select – project the merged dataset down to one selection
// ---------------------------------------------------------------------------

/// Apply a selection to the merged dataset.
///
/// Row inclusion: the reading's date falls inside the inclusive range and its
/// ring (and class, if restricted) is selected. Column inclusion: only the
/// selected measurement types survive. Stats run over non-absent values,
/// minus the elevated-ring floor exclusion.
pub fn select(dataset: &RingDataset, selection: &Selection) -> FilteredView {
    let mut view = FilteredView::default();
    if selection.is_empty() {
        return view;
    }

    for ring_series in &dataset.series {
        if !selection.rings.contains(&ring_series.ring) {
            continue;
        }
        if let Some(class) = selection.class {
            if ring_series.class != class {
                continue;
            }
        }

        for measurement in &selection.types {
            let key = SeriesKey {
                ring: ring_series.ring.clone(),
                measurement: measurement.clone(),
            };

            let points: SeriesPoints = ring_series
                .readings
                .iter()
                .filter(|r| {
                    let d = r.timestamp.date();
                    selection.start <= d
                        && d <= selection.end
                        && selection.time.contains(r.timestamp.time())
                })
                .map(|r| (r.timestamp, r.value(measurement)))
                .collect();

            let stats = SummaryStats::from_values(points.iter().filter_map(|(_, v)| *v).filter(
                |v| ring_series.class != Co2Class::Elevated || *v >= ELEVATED_STATS_FLOOR,
            ));

            view.series.insert(key.clone(), points);
            view.stats.insert(key, stats);
        }
    }

    view
}

// ---------------------------------------------------------------------------
// Rolling mean – the smoothed plot variant
// ---------------------------------------------------------------------------

/// Trailing moving average over one series.
///
/// A point gets a value once `window` consecutive present values precede it
/// (inclusive); absent inputs inside the window make the output absent, so
/// gaps stay gaps instead of being smoothed over.
pub fn rolling_mean(points: &[(NaiveDateTime, Option<f64>)], window: usize) -> SeriesPoints {
    if window <= 1 {
        return points.to_vec();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, &(ts, _))| {
            if i + 1 < window {
                return (ts, None);
            }
            let slice = &points[i + 1 - window..=i];
            let mut sum = 0.0;
            for &(_, v) in slice {
                match v {
                    Some(x) => sum += x,
                    None => return (ts, None),
                }
            }
            (ts, Some(sum / window as f64))
        })
        .collect()
}

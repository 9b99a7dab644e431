use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::config::SourcesConfig;
use crate::data::fetch::HttpFetcher;
use crate::data::filter::{select, FilteredView, Selection, SeriesKey, TimeWindow};
use crate::data::ingest::ingest_all;
use crate::data::model::{Co2Class, RingDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source manifest (None until the user opens one).
    pub config: Option<SourcesConfig>,

    /// Where downloaded artifacts land and get reused.
    pub cache_dir: PathBuf,

    /// Merged dataset for this session (None until ingest completes).
    pub dataset: Option<RingDataset>,

    // -- plot selection widgets --
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rings: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub class_filter: Option<Co2Class>,

    // -- statistics query widgets (own date range + time-of-day window) --
    pub stats_start: NaiveDate,
    pub stats_end: NaiveDate,
    pub stats_time: TimeWindow,

    // -- smoothing controls --
    pub smoothing: bool,
    pub smoothing_window: usize,

    /// Filtered view + stats for the current selection (cached per frame).
    pub view: FilteredView,

    /// Colours per (ring, measurement) series, stable across selections.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a fetch/ingest operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            config: None,
            cache_dir: PathBuf::from("ringwatch_cache"),
            dataset: None,
            start: today,
            end: today,
            rings: BTreeSet::new(),
            types: BTreeSet::new(),
            class_filter: None,
            stats_start: today,
            stats_end: today,
            stats_time: TimeWindow::full_day(),
            smoothing: false,
            smoothing_window: 12,
            view: FilteredView::default(),
            color_map: ColorMap::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a freshly merged dataset: select everything, span the full
    /// date range, rebuild the colour map.
    pub fn set_dataset(&mut self, dataset: RingDataset) {
        self.rings = dataset.ring_names().iter().map(|r| r.to_string()).collect();
        self.types = dataset.measurement_types.clone();

        if let Some((lo, hi)) = dataset.time_bounds() {
            self.start = lo.date();
            self.end = hi.date();
            self.stats_start = lo.date();
            self.stats_end = hi.date();
        }
        self.stats_time = TimeWindow::full_day();

        let labels: BTreeSet<String> = dataset
            .series
            .iter()
            .flat_map(|s| {
                dataset.measurement_types.iter().map(|m| {
                    SeriesKey {
                        ring: s.ring.clone(),
                        measurement: m.clone(),
                    }
                    .label()
                })
            })
            .collect();
        self.color_map = ColorMap::new(&labels);

        self.dataset = Some(dataset);
        self.loading = false;
        self.reselect();
    }

    /// The plot query, rebuilt from the widget state each interaction.
    pub fn selection(&self) -> Selection {
        Selection {
            start: self.start,
            end: self.end,
            time: TimeWindow::full_day(),
            rings: self.rings.clone(),
            types: self.types.clone(),
            class: self.class_filter,
        }
    }

    /// The statistics query: same rings/types/class as the plot, but its own
    /// date range and time-of-day window.
    pub fn stats_selection(&self) -> Selection {
        Selection {
            start: self.stats_start,
            end: self.stats_end,
            time: self.stats_time,
            ..self.selection()
        }
    }

    /// Recompute the filtered view after any selection change. The plotted
    /// series come from the plot query, the stats table from the stats query.
    pub fn reselect(&mut self) {
        self.view = match &self.dataset {
            Some(ds) => {
                let mut view = select(ds, &self.selection());
                view.stats = select(ds, &self.stats_selection()).stats;
                view
            }
            None => FilteredView::default(),
        };
    }

    pub fn toggle_ring(&mut self, ring: &str) {
        if !self.rings.remove(ring) {
            self.rings.insert(ring.to_string());
        }
        self.reselect();
    }

    pub fn toggle_type(&mut self, measurement: &str) {
        if !self.types.remove(measurement) {
            self.types.insert(measurement.to_string());
        }
        self.reselect();
    }

    pub fn select_all_rings(&mut self) {
        if let Some(ds) = &self.dataset {
            self.rings = ds.ring_names().iter().map(|r| r.to_string()).collect();
        }
        self.reselect();
    }

    pub fn select_no_rings(&mut self) {
        self.rings.clear();
        self.reselect();
    }

    pub fn select_all_types(&mut self) {
        if let Some(ds) = &self.dataset {
            self.types = ds.measurement_types.clone();
        }
        self.reselect();
    }

    pub fn select_no_types(&mut self) {
        self.types.clear();
        self.reselect();
    }

    /// Load a source manifest and run the ingest pipeline.
    pub fn load_sources(&mut self, path: &std::path::Path) {
        match SourcesConfig::from_path(path) {
            Ok(config) => {
                log::info!("loaded source manifest with {} rings", config.rings.len());
                self.config = Some(config);
                self.refresh(false);
            }
            Err(e) => {
                log::error!("failed to load sources: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Run fetch → load → merge. With `force`, cached files are evicted
    /// first so everything is re-downloaded.
    pub fn refresh(&mut self, force: bool) {
        let Some(config) = self.config.clone() else {
            self.status_message = Some("No source manifest loaded".to_string());
            return;
        };

        self.loading = true;
        self.status_message = None;

        let fetcher = match HttpFetcher::new() {
            Ok(f) => f,
            Err(e) => {
                log::error!("failed to build HTTP client: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.loading = false;
                return;
            }
        };

        let outcome = ingest_all(&fetcher, &config, &self.cache_dir, force);

        if !outcome.errors.is_empty() {
            log::error!("ingest finished with {} errors", outcome.errors.len());
            self.status_message = Some(outcome.errors.join("; "));
        }

        if outcome.dataset.is_empty() {
            // keep whatever dataset we already had
            self.loading = false;
            if self.status_message.is_none() {
                self.status_message = Some("No data loaded".to_string());
            }
            return;
        }

        self.set_dataset(outcome.dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Reading, RingSeries};
    use chrono::NaiveDateTime;
    use std::collections::BTreeMap;

    fn reading(ts: &str, value: f64) -> Reading {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        let mut values = BTreeMap::new();
        values.insert("CO2_Avg".to_string(), Some(value));
        Reading { timestamp, values }
    }

    fn dataset() -> RingDataset {
        RingDataset::from_series(vec![RingSeries {
            ring: "Ring_1".into(),
            class: Co2Class::Ambient,
            readings: vec![
                reading("2024-01-01 00:00:00", 410.0),
                reading("2024-01-05 00:00:00", 415.0),
            ],
        }])
    }

    #[test]
    fn set_dataset_selects_everything_and_spans_the_range() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert!(state.rings.contains("Ring_1"));
        assert!(state.types.contains("CO2_Avg"));
        assert_eq!(state.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(state.end, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(state.view.point_count(), 2);
    }

    #[test]
    fn toggling_a_ring_off_empties_the_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_ring("Ring_1");
        assert!(state.selection().is_empty());
        assert!(state.view.is_empty());

        state.toggle_ring("Ring_1");
        assert_eq!(state.view.point_count(), 2);
    }

    #[test]
    fn stats_query_is_independent_of_the_plot_range() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.stats_end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        state.reselect();

        // plot still shows both readings, stats only aggregate the first
        assert_eq!(state.view.point_count(), 2);
        let key = crate::data::filter::SeriesKey {
            ring: "Ring_1".into(),
            measurement: "CO2_Avg".into(),
        };
        assert_eq!(state.view.stats[&key].count, 1);
        assert_eq!(state.view.stats[&key].mean, Some(410.0));
    }

    #[test]
    fn stats_time_window_restricts_aggregation() {
        use chrono::NaiveTime;

        let mut state = AppState::default();
        state.set_dataset(dataset());

        // both sample readings sit at midnight; a mid-day window excludes them
        state.stats_time = TimeWindow {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        };
        state.reselect();

        let key = crate::data::filter::SeriesKey {
            ring: "Ring_1".into(),
            measurement: "CO2_Avg".into(),
        };
        assert_eq!(state.view.point_count(), 2);
        assert_eq!(state.view.stats[&key].count, 0);
        assert_eq!(state.view.stats[&key].mean, None);
    }

    #[test]
    fn narrowing_the_date_range_refilters() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        state.reselect();
        assert_eq!(state.view.point_count(), 1);
    }
}

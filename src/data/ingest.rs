use std::path::{Path, PathBuf};

use crate::config::SourcesConfig;

use super::fetch::Fetcher;
use super::loader::load_csv;
use super::merge::merge;
use super::model::{Reading, RingDataset, SourceOrigin};

// ---------------------------------------------------------------------------
// Ingest orchestrator: fetch → load → merge, per ring
// ---------------------------------------------------------------------------

/// Result of one full ingest run. Errors are carried alongside the dataset:
/// a failed download or unreadable file degrades that ring to partial data,
/// it never aborts the run.
#[derive(Debug)]
pub struct IngestOutcome {
    pub dataset: RingDataset,
    pub errors: Vec<String>,
}

impl IngestOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Local cache file name for one source artifact, matching per ring and part.
pub fn cache_path(cache_dir: &Path, ring: &str, origin: SourceOrigin, part: usize) -> PathBuf {
    match origin {
        SourceOrigin::Historical => cache_dir.join(format!("{ring}_historical_{part}.csv")),
        SourceOrigin::Recent => cache_dir.join(format!("{ring}_recent.csv")),
    }
}

/// Fetch, load and merge every ring in the manifest.
///
/// With `force` set, cached files for the manifest's rings are deleted first
/// so the fetcher re-downloads everything (the UI's "Refresh Data").
pub fn ingest_all(
    fetcher: &dyn Fetcher,
    config: &SourcesConfig,
    cache_dir: &Path,
    force: bool,
) -> IngestOutcome {
    let mut series = Vec::new();
    let mut errors = Vec::new();

    if force {
        evict_cache(config, cache_dir);
    }

    for (ring, sources) in &config.rings {
        let mut historical_parts: Vec<Vec<Reading>> = Vec::new();

        for (part, url) in sources.historical.iter().enumerate() {
            let dest = cache_path(cache_dir, ring, SourceOrigin::Historical, part);
            match fetch_and_load(fetcher, url, &dest, ring, SourceOrigin::Historical) {
                Ok(readings) => historical_parts.push(readings),
                Err(msg) => errors.push(msg),
            }
        }

        let recent_dest = cache_path(cache_dir, ring, SourceOrigin::Recent, 0);
        let recent = match fetch_and_load(
            fetcher,
            &sources.recent,
            &recent_dest,
            ring,
            SourceOrigin::Recent,
        ) {
            Ok(readings) => readings,
            Err(msg) => {
                errors.push(msg);
                Vec::new()
            }
        };

        let merged = merge(ring, config.class_for(ring), &historical_parts, recent);
        if merged.is_empty() {
            log::warn!("{ring}: no readings after merge, skipping");
            continue;
        }
        series.push(merged);
    }

    IngestOutcome {
        dataset: RingDataset::from_series(series),
        errors,
    }
}

fn fetch_and_load(
    fetcher: &dyn Fetcher,
    url: &str,
    dest: &Path,
    ring: &str,
    origin: SourceOrigin,
) -> Result<Vec<Reading>, String> {
    let path = fetcher
        .fetch(url, dest)
        .map_err(|e| format!("{ring} ({origin}): {e}"))?;
    load_csv(&path, ring, origin).map_err(|e| format!("{ring} ({origin}): {e:#}"))
}

/// Delete the manifest's cached artifacts so the next fetch re-downloads.
fn evict_cache(config: &SourcesConfig, cache_dir: &Path) {
    for (ring, sources) in &config.rings {
        for part in 0..sources.historical.len() {
            let path = cache_path(cache_dir, ring, SourceOrigin::Historical, part);
            let _ = std::fs::remove_file(path);
        }
        let _ = std::fs::remove_file(cache_path(cache_dir, ring, SourceOrigin::Recent, 0));
    }
}

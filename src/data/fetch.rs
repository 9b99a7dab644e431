use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fetch failures are surfaced in the UI status line and never terminate the
/// session; the dashboard continues with whatever data is already cached.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned no content")]
    EmptyBody { url: String },

    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Fetcher trait – the seam between the pipeline and the network
// ---------------------------------------------------------------------------

/// Downloads one remote artifact to a local path.
///
/// Implementations must honor the reuse rule: an existing non-empty file at
/// `destination` is returned as-is, with no re-download and no invalidation.
pub trait Fetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf, FetchError>;
}

// ---------------------------------------------------------------------------
// HttpFetcher – blocking reqwest implementation
// ---------------------------------------------------------------------------

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                source: e,
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf, FetchError> {
        if is_reusable(destination) {
            log::debug!("{}: already cached, skipping download", destination.display());
            return Ok(destination.to_path_buf());
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        write_atomic(destination, &body)?;
        log::info!("downloaded {url} → {}", destination.display());
        Ok(destination.to_path_buf())
    }
}

/// The one caching rule: a present, non-empty file is reused.
fn is_reusable(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Write to `.tmp` then rename, so a failed download never leaves a partial
/// file that the reuse check would accept on the next run.
fn write_atomic(destination: &Path, body: &[u8]) -> Result<(), FetchError> {
    let io_err = |source| FetchError::Io {
        path: destination.to_path_buf(),
        source,
    };

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = destination.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(io_err)?;
    std::fs::rename(&tmp, destination).map_err(io_err)?;
    Ok(())
}

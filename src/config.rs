use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Co2Class;

// ---------------------------------------------------------------------------
// Source manifest: ring id → remote links
// ---------------------------------------------------------------------------

/// Remote sources for one ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingSources {
    /// Historical exports, in precedence order (a later part overrides an
    /// earlier one on shared timestamps).
    pub historical: Vec<String>,
    /// The single recent export that extends and overrides the historical data.
    pub recent: String,
    /// Omitted in most manifests; falls back to the site naming convention.
    #[serde(default)]
    pub class: Option<Co2Class>,
}

/// The full source manifest, keyed by ring id.
///
/// ```json
/// {
///   "rings": {
///     "Ring_1": {
///       "historical": ["https://…/r1_2023.csv", "https://…/r1_2024h1.csv"],
///       "recent": "https://…/r1_current.csv"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub rings: BTreeMap<String, RingSources>,
}

impl SourcesConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).context("parsing sources manifest")
    }

    /// Declared class for a ring, or the inferred site convention.
    pub fn class_for(&self, ring: &str) -> Co2Class {
        self.rings
            .get(ring)
            .and_then(|s| s.class)
            .unwrap_or_else(|| Co2Class::infer(ring))
    }
}

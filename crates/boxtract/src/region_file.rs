//! Region-definition persistence.
//!
//! The on-disk format is a flat JSON object mapping region names to
//! `[x0, y0, x1, y1]` arrays in page coordinates:
//!
//! ```json
//! {
//!   "Invoice number": [50.0, 720.0, 250.0, 760.0],
//!   "Total": [400.0, 80.0, 560.0, 120.0]
//! }
//! ```
//!
//! Loading goes through [`RegionStore::load_from`], so a malformed file
//! never yields a partially populated store. Names are loaded in sorted
//! order, which fixes the output column order across runs.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use boxtract_core::RegionStore;

use crate::error::RegionFileError;

/// File name the CLI looks for next to the documents.
pub const DEFAULT_REGION_FILE: &str = "bounding_boxes.json";

/// Load a region file into a fresh store.
pub fn load_regions(path: &Path) -> Result<RegionStore, RegionFileError> {
    let data = std::fs::read_to_string(path)?;
    let entries: BTreeMap<String, [f64; 4]> = serde_json::from_str(&data)?;
    let mut store = RegionStore::new();
    store.load_from(entries)?;
    debug!(path = %path.display(), regions = store.len(), "region file loaded");
    Ok(store)
}

/// Write the store back out as pretty-printed JSON.
pub fn save_regions(path: &Path, store: &RegionStore) -> Result<(), RegionFileError> {
    let entries: BTreeMap<String, [f64; 4]> = store.serialize().into_iter().collect();
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), regions = store.len(), "region file saved");
    Ok(())
}

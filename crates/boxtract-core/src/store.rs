//! Ordered store of named document-space regions.
//!
//! The store is the single owner of region state during an editing session.
//! Once editing is done it is consumed by [`RegionStore::freeze`] into an
//! immutable [`FrozenRegions`] snapshot that is safe to share across the
//! extraction worker pool — workers can never observe a partial edit because
//! no mutable handle survives the freeze.

use std::sync::Arc;

use crate::error::RegionError;
use crate::geometry::Rect;

/// An ordered mapping from region name to a document-space rectangle.
///
/// Iteration order is insertion order; overwriting an existing name keeps its
/// original position so a re-saved region does not move its output column.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    entries: Vec<(String, Rect)>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a region. Last write wins; duplicate submission
    /// silently replaces the stored rectangle.
    pub fn put(&mut self, name: &str, rect: Rect) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = rect,
            None => self.entries.push((name.to_string(), rect)),
        }
    }

    /// Remove a region by name, returning its rectangle if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Rect> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Rect> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// All entries in insertion order.
    pub fn all(&self) -> &[(String, Rect)] {
        &self.entries
    }

    /// Region names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the entire store contents atomically.
    ///
    /// Every entry is validated first; a malformed entry (empty name or a
    /// non-finite coordinate) aborts the whole load and the store keeps its
    /// prior contents. Duplicate names follow the same last-write-wins rule
    /// as [`put`](Self::put).
    pub fn load_from<I>(&mut self, entries: I) -> Result<(), RegionError>
    where
        I: IntoIterator<Item = (String, [f64; 4])>,
    {
        let mut staged = RegionStore::new();
        for (name, coords) in entries {
            if name.trim().is_empty() {
                return Err(RegionError::malformed(&name, "name must not be empty"));
            }
            let rect = Rect::from(coords);
            if !rect.is_finite() {
                return Err(RegionError::malformed(&name, "coordinates must be finite"));
            }
            staged.put(&name, rect);
        }
        self.entries = staged.entries;
        Ok(())
    }

    /// Flat `name -> (x0, y0, x1, y1)` form for persistence, in insertion
    /// order.
    pub fn serialize(&self) -> Vec<(String, [f64; 4])> {
        self.entries
            .iter()
            .map(|(n, r)| (n.clone(), <[f64; 4]>::from(*r)))
            .collect()
    }

    /// Consume the store into an immutable shared snapshot.
    pub fn freeze(self) -> FrozenRegions {
        FrozenRegions {
            entries: Arc::new(self.entries),
        }
    }
}

/// An immutable snapshot of a [`RegionStore`], safe for concurrent reads.
///
/// Cloning is cheap (`Arc`); the extraction pipeline clones one handle per
/// worker and no mutation API exists.
#[derive(Debug, Clone)]
pub struct FrozenRegions {
    entries: Arc<Vec<(String, Rect)>>,
}

impl FrozenRegions {
    /// Entries in the insertion order fixed at freeze time.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rect)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

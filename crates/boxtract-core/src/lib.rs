//! boxtract-core: Backend-independent building blocks for region extraction.
//!
//! This crate provides the coordinate-transform engine ([`ViewTransform`]),
//! the ordered region store ([`RegionStore`] / [`FrozenRegions`]), the
//! pointer-gesture editor session ([`EditorSession`]), and the result table
//! builder ([`ResultTable`]). It knows nothing about PDFs — document access
//! lives in the `boxtract` crate.

pub mod editor;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod store;
pub mod table;

pub use editor::{CommitOutcome, EditorSession, PointerButton};
pub use error::RegionError;
pub use geometry::{PageBBox, Rect};
pub use mapper::{ViewTransform, YAxis, ZOOM_MAX, ZOOM_MIN};
pub use store::{FrozenRegions, RegionStore};
pub use table::{DocRecord, RecordOutcome, ResultTable, RowFailure};

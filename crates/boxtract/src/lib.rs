//! boxtract: batch region-based text extraction from PDF documents.
//!
//! Builds on [`boxtract_core`] (coordinate mapping, region store, editor,
//! result table) and adds the document-access layer and the parallel batch
//! pipeline:
//!
//! - [`LopdfSource`] opens PDFs via lopdf and extracts positioned text with
//!   a compact content-stream interpreter;
//! - [`run_batch`] fans a frozen region set out across a worker pool, one
//!   document per task, tolerating per-document failure;
//! - [`region_file`] persists region definitions as a flat JSON map;
//! - [`annotate`] writes debug copies with the regions drawn on page 1.

pub mod annotate;
pub mod error;
mod font;
mod interpreter;
pub mod lopdf_source;
pub mod pipeline;
pub mod region_file;
pub mod source;

pub use error::{PipelineError, RegionFileError, SourceError};
pub use lopdf_source::{LopdfDocument, LopdfSource};
pub use pipeline::{run_batch, ExtractOptions, DOC_COLUMN};
pub use region_file::{load_regions, save_regions, DEFAULT_REGION_FILE};
pub use source::{DocumentSource, SourceDocument};

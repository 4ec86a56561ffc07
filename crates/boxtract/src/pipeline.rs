//! Parallel batch extraction.
//!
//! Fans a frozen region set out over a fixed-size rayon pool, one document
//! per task. Workers never share document state: each one opens its own
//! document, reads that document's native page bounding box, and anchors
//! every region to it before querying text. A failure inside a worker is
//! converted into an error record for that document; the batch always runs
//! to completion.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use boxtract_core::{DocRecord, FrozenRegions, RecordOutcome, ResultTable};

use crate::annotate;
use crate::error::PipelineError;
use crate::source::{DocumentSource, SourceDocument};

/// Column header for the document-identifier column.
pub const DOC_COLUMN: &str = "filename";

/// Batch run options.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Worker count; `None` uses rayon's default (available parallelism).
    pub workers: Option<usize>,
    /// Write a `*_annotated.pdf` copy of each document with the regions
    /// stroked on page 1. Annotation failures are logged, not fatal.
    pub annotate: bool,
}

/// Run extraction over `paths` and aggregate into a [`ResultTable`].
///
/// `progress` is invoked on the calling thread once per completed document
/// with `(completed, total)`; completion order is whatever the pool
/// produces, but the returned table is always in input order. Returns an
/// error only when the worker pool itself cannot be built.
pub fn run_batch<S>(
    source: &S,
    paths: &[PathBuf],
    regions: &FrozenRegions,
    options: &ExtractOptions,
    mut progress: impl FnMut(usize, usize),
) -> Result<ResultTable, PipelineError>
where
    S: DocumentSource + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.workers.unwrap_or(0))
        .build()
        .map_err(|e| PipelineError::Pool(e.to_string()))?;

    let total = paths.len();
    info!(
        documents = total,
        regions = regions.len(),
        workers = pool.current_num_threads(),
        "starting batch extraction"
    );

    let (tx, rx) = mpsc::channel();
    let mut records = Vec::with_capacity(total);

    pool.in_place_scope(|scope| {
        for (index, path) in paths.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let record = extract_one(source, index, path, regions, options.annotate);
                // The receiver outlives the scope; a send can only fail if
                // the caller panicked, in which case the record is moot.
                let _ = tx.send(record);
            });
        }
        drop(tx);

        for record in rx.iter() {
            records.push(record);
            progress(records.len(), total);
        }
    });

    let table = ResultTable::build(regions, DOC_COLUMN, records);
    info!(
        rows = table.rows().len(),
        failures = table.failures().len(),
        "batch extraction finished"
    );
    Ok(table)
}

/// Process a single document. Never panics the pool: every failure becomes
/// an error record carrying the document path.
fn extract_one<S>(
    source: &S,
    index: usize,
    path: &Path,
    regions: &FrozenRegions,
    annotate: bool,
) -> DocRecord
where
    S: DocumentSource,
{
    let doc_id = path.display().to_string();

    let doc = match source.open(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(doc = %doc_id, error = %e, "document failed to open");
            return DocRecord {
                index,
                doc_id,
                outcome: RecordOutcome::Failed(e.to_string()),
            };
        }
    };

    // Regions are stored relative to the page origin; anchor them to this
    // document's own MediaBox, which may not start at (0, 0).
    let bbox = doc.page_bbox();
    let fields = regions
        .iter()
        .map(|(name, rect)| {
            let anchored = rect.offset(bbox.x0, bbox.y0);
            (name.to_string(), doc.text_in_region(&anchored))
        })
        .collect();
    debug!(doc = %doc_id, "document extracted");

    if annotate {
        if let Err(e) = annotate::annotate_document(path, regions, &annotated_path(path)) {
            warn!(doc = %doc_id, error = %e, "annotation failed");
        }
    }

    DocRecord {
        index,
        doc_id,
        outcome: RecordOutcome::Fields(fields),
    }
}

/// `dir/name.pdf` becomes `dir/name_annotated.pdf`.
fn annotated_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!("{stem}_annotated.pdf"))
}

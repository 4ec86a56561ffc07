use std::path::{Path, PathBuf};

use boxtract::{load_regions, run_batch, ExtractOptions, LopdfSource, DEFAULT_REGION_FILE};

use crate::shared::{csv_lines, ProgressReporter};

const OUTPUT_CSV: &str = "extracted_text.csv";
const ERROR_LOG: &str = "extraction_errors.log";

/// Run the `extract` subcommand.
///
/// Fatal errors (missing folder, no PDFs, unreadable region file, output
/// I/O) exit non-zero. Per-document extraction failures do not: they are
/// logged to `extraction_errors.log` and counted in the summary.
pub fn run(
    folder: &Path,
    regions_file: Option<&Path>,
    output: Option<&Path>,
    workers: Option<usize>,
    annotate: bool,
) -> Result<(), i32> {
    if !folder.is_dir() {
        eprintln!("Error: folder not found: {}", folder.display());
        return Err(1);
    }

    let pdfs = collect_pdfs(folder)?;
    if pdfs.is_empty() {
        eprintln!("Error: no PDF files in {}", folder.display());
        return Err(1);
    }

    let regions_path = regions_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| folder.join(DEFAULT_REGION_FILE));
    let store = load_regions(&regions_path).map_err(|e| {
        eprintln!(
            "Error: failed to load region file {}: {e}",
            regions_path.display()
        );
        eprintln!("Hint: define regions with `boxtract regions add`");
        1
    })?;
    if store.is_empty() {
        eprintln!(
            "Error: region file {} defines no regions",
            regions_path.display()
        );
        eprintln!("Hint: define regions with `boxtract regions add`");
        return Err(1);
    }
    let regions = store.freeze();

    let reporter = ProgressReporter::new(pdfs.len());
    let options = ExtractOptions { workers, annotate };
    let table = run_batch(&LopdfSource, &pdfs, &regions, &options, |done, _| {
        reporter.report(done);
    })
    .map_err(|e| {
        reporter.finish();
        eprintln!("Error: {e}");
        1
    })?;
    reporter.finish();

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| folder.join(OUTPUT_CSV));
    std::fs::write(&output_path, csv_lines(table.header(), table.rows())).map_err(|e| {
        eprintln!(
            "Error: failed to write {}: {e}",
            output_path.display()
        );
        1
    })?;

    if !table.failures().is_empty() {
        let log_path = folder.join(ERROR_LOG);
        let mut log = String::new();
        for failure in table.failures() {
            log.push_str(&format!("{}: {}\n", failure.doc_id, failure.message));
        }
        std::fs::write(&log_path, log).map_err(|e| {
            eprintln!("Error: failed to write {}: {e}", log_path.display());
            1
        })?;
        eprintln!(
            "Warning: {} document(s) failed; see {}",
            table.failures().len(),
            log_path.display()
        );
    }

    println!(
        "Extracted {} of {} document(s) to {}",
        table.rows().len(),
        pdfs.len(),
        output_path.display()
    );
    Ok(())
}

/// All `*.pdf` files in the folder, sorted by name. Annotated debug copies
/// from a previous `--annotate` run are skipped so reruns stay idempotent.
fn collect_pdfs(folder: &Path) -> Result<Vec<PathBuf>, i32> {
    let entries = std::fs::read_dir(folder).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", folder.display());
        1
    })?;

    let mut pdfs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            eprintln!("Error: failed to read {}: {e}", folder.display());
            1
        })?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let is_annotated_copy = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("_annotated"));
        if is_pdf && !is_annotated_copy && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pdfs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a_annotated.pdf"), b"x").unwrap();

        let pdfs = collect_pdfs(dir.path()).unwrap();
        let names: Vec<String> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn missing_folder_is_fatal() {
        assert_eq!(
            run(Path::new("/nonexistent/docs"), None, None, None, false),
            Err(1)
        );
    }

    #[test]
    fn empty_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(dir.path(), None, None, None, false), Err(1));
    }
}

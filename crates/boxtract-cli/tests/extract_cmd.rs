//! Integration tests for the `extract` subcommand.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("boxtract").unwrap()
}

/// Create a one-page PDF showing `text` at (100, 700).
fn write_pdf(path: &Path, text: &str) {
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(600),
            Object::Integer(800),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });
    if let Ok(page_obj) = doc.get_object_mut(page_id) {
        if let Ok(dict) = page_obj.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path).unwrap();
}

fn write_region_file(dir: &Path) {
    std::fs::write(
        dir.join("bounding_boxes.json"),
        r#"{"Field": [50.0, 650.0, 550.0, 750.0]}"#,
    )
    .unwrap();
}

#[test]
fn happy_path_writes_csv_with_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("b.pdf"), "second");
    write_pdf(&dir.path().join("a.pdf"), "first");
    write_region_file(dir.path());

    cmd()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 2 of 2"));

    let csv = std::fs::read_to_string(dir.path().join("extracted_text.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "filename,Field");
    // Sorted by file name, not completion order.
    assert!(lines[1].ends_with(",first"));
    assert!(lines[2].ends_with(",second"));
    assert!(lines[1].contains("a.pdf"));
}

#[test]
fn corrupt_document_logged_but_run_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("good.pdf"), "ok");
    std::fs::write(dir.path().join("bad.pdf"), b"garbage").unwrap();
    write_region_file(dir.path());

    cmd()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1 of 2"))
        .stderr(predicate::str::contains("1 document(s) failed"));

    let log = std::fs::read_to_string(dir.path().join("extraction_errors.log")).unwrap();
    assert!(log.contains("bad.pdf"));

    let csv = std::fs::read_to_string(dir.path().join("extracted_text.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2); // header + good.pdf only
}

#[test]
fn missing_folder_exits_nonzero() {
    cmd()
        .arg("extract")
        .arg("/nonexistent/docs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("folder not found"));
}

#[test]
fn folder_without_pdfs_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    write_region_file(dir.path());

    cmd()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PDF files"));
}

#[test]
fn missing_region_file_exits_nonzero_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("a.pdf"), "text");

    cmd()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load region file"))
        .stderr(predicate::str::contains("boxtract regions add"));
}

#[test]
fn custom_output_and_region_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("a.pdf"), "hello");
    let regions = dir.path().join("custom.json");
    std::fs::write(&regions, r#"{"Field": [50.0, 650.0, 550.0, 750.0]}"#).unwrap();
    let output = dir.path().join("out.csv");

    cmd()
        .arg("extract")
        .arg(dir.path())
        .arg("--regions")
        .arg(&regions)
        .arg("--output")
        .arg(&output)
        .arg("--workers")
        .arg("1")
        .assert()
        .success();

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.contains("hello"));
}

#[test]
fn annotate_writes_debug_copy() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("a.pdf"), "hello");
    write_region_file(dir.path());

    cmd()
        .arg("extract")
        .arg(dir.path())
        .arg("--annotate")
        .assert()
        .success();

    assert!(dir.path().join("a_annotated.pdf").exists());
    // A rerun must not treat the annotated copy as input.
    cmd()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("of 1 document"));
}

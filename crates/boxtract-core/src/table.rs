//! Aggregation of per-document extraction records into the output table.
//!
//! Workers deliver records in completion order (unordered); the table builder
//! re-sorts by original input index so downstream consumers always see rows
//! in input order. Failed documents go to a separate failure list and are
//! never interleaved into the main table.

use std::collections::HashMap;

use crate::store::FrozenRegions;

/// Per-document result of extraction.
#[derive(Debug, Clone)]
pub struct DocRecord {
    /// Position of the document in the original input sequence.
    pub index: usize,
    /// Document identifier (path or file name).
    pub doc_id: String,
    pub outcome: RecordOutcome,
}

/// Either the extracted field map or a document-level failure.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// Region name → extracted text. Regions with no text may be absent;
    /// the table renders them as empty cells.
    Fields(HashMap<String, String>),
    /// The document could not be processed at all.
    Failed(String),
}

/// A failed document, kept apart from the main table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub index: usize,
    pub doc_id: String,
    pub message: String,
}

/// The final output table plus the parallel failure list.
#[derive(Debug, Clone)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    failures: Vec<RowFailure>,
}

impl ResultTable {
    /// Build the table from unordered records.
    ///
    /// The header is `[doc_column] + region names` in the insertion order
    /// fixed when the store was frozen. Every successful row has every
    /// column; text missing for a region becomes an empty cell, never an
    /// omitted one.
    pub fn build(regions: &FrozenRegions, doc_column: &str, mut records: Vec<DocRecord>) -> Self {
        let mut header = Vec::with_capacity(1 + regions.len());
        header.push(doc_column.to_string());
        header.extend(regions.names().map(String::from));

        records.sort_by_key(|r| r.index);

        let mut rows = Vec::new();
        let mut failures = Vec::new();
        for record in records {
            match record.outcome {
                RecordOutcome::Fields(fields) => {
                    let mut row = Vec::with_capacity(header.len());
                    row.push(record.doc_id);
                    for name in regions.names() {
                        row.push(fields.get(name).cloned().unwrap_or_default());
                    }
                    rows.push(row);
                }
                RecordOutcome::Failed(message) => failures.push(RowFailure {
                    index: record.index,
                    doc_id: record.doc_id,
                    message,
                }),
            }
        }

        Self {
            header,
            rows,
            failures,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Successful rows, in original input order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Failed documents, in original input order.
    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::store::RegionStore;

    fn frozen(names: &[&str]) -> FrozenRegions {
        let mut store = RegionStore::new();
        for (i, name) in names.iter().enumerate() {
            let off = i as f64 * 10.0;
            store.put(name, Rect::normalized(off, off, off + 5.0, off + 5.0));
        }
        store.freeze()
    }

    fn fields(pairs: &[(&str, &str)]) -> RecordOutcome {
        RecordOutcome::Fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn header_is_doc_column_plus_region_names_in_order() {
        let table = ResultTable::build(&frozen(&["Title", "Date"]), "filename", vec![]);
        assert_eq!(table.header(), &["filename", "Title", "Date"]);
    }

    #[test]
    fn rows_resorted_to_input_order() {
        let records = vec![
            DocRecord {
                index: 2,
                doc_id: "c.pdf".into(),
                outcome: fields(&[("Title", "C")]),
            },
            DocRecord {
                index: 0,
                doc_id: "a.pdf".into(),
                outcome: fields(&[("Title", "A")]),
            },
            DocRecord {
                index: 1,
                doc_id: "b.pdf".into(),
                outcome: fields(&[("Title", "B")]),
            },
        ];
        let table = ResultTable::build(&frozen(&["Title"]), "filename", records);
        let ids: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn missing_fields_become_empty_cells() {
        let records = vec![DocRecord {
            index: 0,
            doc_id: "a.pdf".into(),
            outcome: fields(&[("Date", "2024-01-01")]),
        }];
        let table = ResultTable::build(&frozen(&["Title", "Date"]), "filename", records);
        assert_eq!(table.rows()[0], vec!["a.pdf", "", "2024-01-01"]);
    }

    #[test]
    fn failures_separate_from_rows() {
        let records = vec![
            DocRecord {
                index: 0,
                doc_id: "ok.pdf".into(),
                outcome: fields(&[("Title", "fine")]),
            },
            DocRecord {
                index: 1,
                doc_id: "broken.pdf".into(),
                outcome: RecordOutcome::Failed("parse error".into()),
            },
        ];
        let table = ResultTable::build(&frozen(&["Title"]), "filename", records);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.failures().len(), 1);
        assert_eq!(table.failures()[0].doc_id, "broken.pdf");
        assert_eq!(table.failures()[0].message, "parse error");
    }

    #[test]
    fn zero_regions_yields_identifier_only_rows() {
        let records = vec![DocRecord {
            index: 0,
            doc_id: "a.pdf".into(),
            outcome: fields(&[]),
        }];
        let table = ResultTable::build(&frozen(&[]), "filename", records);
        assert_eq!(table.header(), &["filename"]);
        assert_eq!(table.rows()[0], vec!["a.pdf"]);
    }

    #[test]
    fn extra_unknown_fields_are_ignored() {
        let records = vec![DocRecord {
            index: 0,
            doc_id: "a.pdf".into(),
            outcome: fields(&[("Ghost", "boo"), ("Title", "t")]),
        }];
        let table = ResultTable::build(&frozen(&["Title"]), "filename", records);
        assert_eq!(table.rows()[0], vec!["a.pdf", "t"]);
    }
}

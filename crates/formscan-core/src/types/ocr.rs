//! OCR output types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A detected table as a rectangular grid of cell strings.
///
/// Every row has the same number of columns; this is checked on
/// construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTableRegion")]
pub struct TableRegion {
    id: String,
    rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct RawTableRegion {
    id: String,
    rows: Vec<Vec<String>>,
}

impl TryFrom<RawTableRegion> for TableRegion {
    type Error = Error;

    fn try_from(raw: RawTableRegion) -> Result<Self> {
        Self::new(raw.id, raw.rows)
    }
}

impl TableRegion {
    /// Creates a table, rejecting ragged rows.
    pub fn new(id: impl Into<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let id = id.into();
        if let Some(first) = rows.first() {
            let columns = first.len();
            if let Some(index) = rows.iter().position(|row| row.len() != columns) {
                return Err(Error::invalid_input().with_message(format!(
                    "table '{}' row {} has {} columns, expected {}",
                    id,
                    index,
                    rows[index].len(),
                    columns
                )));
            }
        }
        Ok(Self { id, rows })
    }

    /// Creates an empty `row_count` x `column_count` table.
    pub fn empty(id: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            id: id.into(),
            rows: vec![vec![String::new(); column_count]; row_count],
        }
    }

    /// Sets the content of a cell; out-of-range coordinates are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, content: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = content.into();
                true
            }
            None => false,
        }
    }

    /// Bounding identifier of the table.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rows of the table.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (zero for an empty table).
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Returns true if no cell contains text.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.trim().is_empty())
    }
}

/// Confidence reported by the OCR capability for one recognized region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfidence {
    /// Region identifier, e.g. `p1:w17`.
    pub region: String,
    /// Recognized text of the region.
    pub text: String,
    /// Confidence in `[0, 1]`, as reported by the capability.
    pub confidence: f64,
}

impl RegionConfidence {
    /// Creates a new region confidence entry.
    pub fn new(region: impl Into<String>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            region: region.into(),
            text: text.into(),
            confidence,
        }
    }
}

/// A key/value pair detected by layout analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    /// Detected key (usually the printed label).
    pub key: String,
    /// Detected value (usually the filled-in content).
    pub value: String,
    /// Confidence in `[0, 1]`, when reported.
    pub confidence: Option<f64>,
}

/// Result of analyzing one document with one OCR configuration.
///
/// Produced once per document and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Full recognized text in reading order.
    pub raw_text: String,
    /// Detected tables.
    #[serde(default)]
    pub tables: Vec<TableRegion>,
    /// Detected checkbox/selection-mark states keyed by label.
    #[serde(default)]
    pub checkboxes: BTreeMap<String, bool>,
    /// Detected key/value pairs.
    #[serde(default)]
    pub key_value_pairs: Vec<KeyValuePair>,
    /// Per-region confidence scores, passed through from the capability.
    #[serde(default)]
    pub region_confidences: Vec<RegionConfidence>,
    /// Name of the OCR configuration that produced this result.
    #[serde(default)]
    pub configuration: Option<String>,
}

impl OcrResult {
    /// Creates a result holding only raw text.
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// Adds a table.
    pub fn with_table(mut self, table: TableRegion) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a checkbox state.
    pub fn with_checkbox(mut self, label: impl Into<String>, checked: bool) -> Self {
        self.checkboxes.insert(label.into(), checked);
        self
    }

    /// Adds a region confidence.
    pub fn with_region(mut self, region: RegionConfidence) -> Self {
        self.region_confidences.push(region);
        self
    }

    /// Returns true if the recognized text is blank.
    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    /// Returns true if at least one table or checkbox was detected.
    pub fn has_regions(&self) -> bool {
        !self.tables.is_empty() || !self.checkboxes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let result = TableRegion::new("t0", vec![row(&["a", "b"]), row(&["c"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_table_dimensions() {
        let table = TableRegion::new("t0", vec![row(&["a", "b"]), row(&["c", "d"])]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert!(!table.is_blank());
    }

    #[test]
    fn test_table_deserialization_is_checked() {
        let json = r#"{"id":"t1","rows":[["a","b"],["c"]]}"#;
        assert!(serde_json::from_str::<TableRegion>(json).is_err());

        let json = r#"{"id":"t1","rows":[["a","b"],["c","d"]]}"#;
        let table: TableRegion = serde_json::from_str(json).unwrap();
        assert_eq!(table.id(), "t1");
    }

    #[test]
    fn test_empty_table_set_cell() {
        let mut table = TableRegion::empty("t2", 2, 3);
        assert!(table.set_cell(1, 2, "x"));
        assert!(!table.set_cell(2, 0, "y"));
        assert_eq!(table.rows()[1][2], "x");
    }

    #[test]
    fn test_regions_detection() {
        let result = OcrResult::from_text("hello");
        assert!(result.has_text());
        assert!(!result.has_regions());
        assert!(result.with_checkbox("male", true).has_regions());
    }
}

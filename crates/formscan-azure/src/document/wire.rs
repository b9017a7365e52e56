//! Document Intelligence analyze wire types.

use serde::Deserialize;

/// State of a long-running analyze operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Body of `GET {Operation-Location}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OperationError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeResult {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub key_value_pairs: Vec<KeyValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    pub page_number: u32,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub selection_marks: Vec<SelectionMark>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Word {
    pub content: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Line {
    pub content: String,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum SelectionState {
    Selected,
    Unselected,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SelectionMark {
    pub state: SelectionState,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Table {
    pub row_count: usize,
    pub column_count: usize,
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableCell {
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KeyValue {
    pub key: Element,
    #[serde(default)]
    pub value: Option<Element>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Element {
    #[serde(default)]
    pub content: String,
}

//! Conversion of an analyze result into an [`OcrResult`].

use std::collections::BTreeMap;

use formscan_core::types::{KeyValuePair, OcrResult, RegionConfidence, TableRegion};

use super::wire::{AnalyzeResult, Line, Page, SelectionState, Table};

/// Maps the layout analysis onto the pipeline's OCR result.
pub(crate) fn to_ocr_result(result: AnalyzeResult) -> OcrResult {
    let raw_text = if result.content.trim().is_empty() {
        result
            .pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.content.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        result.content
    };

    let tables = result
        .tables
        .iter()
        .enumerate()
        .map(|(index, table)| to_table(index, table))
        .collect();

    let mut checkboxes = BTreeMap::new();
    for page in &result.pages {
        collect_selection_marks(page, &mut checkboxes);
    }

    let key_value_pairs = result
        .key_value_pairs
        .into_iter()
        .filter(|pair| !pair.key.content.trim().is_empty())
        .map(|pair| KeyValuePair {
            key: pair.key.content,
            value: pair.value.map(|v| v.content).unwrap_or_default(),
            confidence: pair.confidence,
        })
        .collect();

    let region_confidences = result
        .pages
        .iter()
        .flat_map(|page| {
            page.words.iter().enumerate().map(|(index, word)| {
                RegionConfidence::new(
                    format!("p{}:w{}", page.page_number, index),
                    word.content.clone(),
                    word.confidence,
                )
            })
        })
        .collect();

    OcrResult {
        raw_text,
        tables,
        checkboxes,
        key_value_pairs,
        region_confidences,
        configuration: None,
    }
}

fn to_table(index: usize, table: &Table) -> TableRegion {
    let mut region = TableRegion::empty(format!("t{}", index), table.row_count, table.column_count);
    for cell in &table.cells {
        region.set_cell(cell.row_index, cell.column_index, cell.content.trim());
    }
    region
}

/// Labels each selection mark with the nearest line on its page.
///
/// Marks without a usable label are named `p{page}:m{index}`; repeated
/// labels get a ` (n)` suffix.
fn collect_selection_marks(page: &Page, checkboxes: &mut BTreeMap<String, bool>) {
    for (index, mark) in page.selection_marks.iter().enumerate() {
        let label = centroid(&mark.polygon)
            .and_then(|point| nearest_line(&page.lines, point))
            .map(|line| line.content.trim().to_owned())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| format!("p{}:m{}", page.page_number, index));

        let mut key = label.clone();
        let mut suffix = 2;
        while checkboxes.contains_key(&key) {
            key = format!("{} ({})", label, suffix);
            suffix += 1;
        }
        checkboxes.insert(key, mark.state == SelectionState::Selected);
    }
}

fn nearest_line(lines: &[Line], (x, y): (f64, f64)) -> Option<&Line> {
    lines
        .iter()
        .filter_map(|line| {
            let (lx, ly) = centroid(&line.polygon)?;
            Some((line, (lx - x).powi(2) + (ly - y).powi(2)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(line, _)| line)
}

/// Centroid of a flat `[x1, y1, x2, y2, ...]` polygon.
fn centroid(polygon: &[f64]) -> Option<(f64, f64)> {
    let points = polygon.len() / 2;
    if points == 0 {
        return None;
    }
    let (sx, sy) = polygon
        .chunks_exact(2)
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    Some((sx / points as f64, sy / points as f64))
}

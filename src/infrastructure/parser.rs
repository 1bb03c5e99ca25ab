use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use std::path::Path;
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::spreadsheet::{CellValue, Row};

/// Largest float that still converts to an `i64` without losing the integral value.
const MAX_SAFE_INT: f64 = 9_007_199_254_740_991.0;

/// Reads the first worksheet of an Excel workbook into rows of cells.
///
/// The format is picked from the file extension, or sniffed from the contents
/// when the extension is unknown. Rows with no non-empty cell
/// are skipped and trailing empty cells are trimmed, so the result mirrors what
/// a user sees in the sheet.
pub fn parse_first_worksheet(path: &Path) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::ParseError(format!(
            "Failed to open Excel file {}: {}",
            path.display(),
            e
        ))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| {
            AppError::ParseError(format!(
                "Failed to read Excel range {}: {}",
                path.display(),
                e
            ))
        })?;

    let rows = rows_from_range(&range);
    debug!(path = %path.display(), rows = rows.len(), "Parsed first worksheet");

    Ok(rows)
}

pub fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    // Cells are anchored at column A even when the used range starts further right.
    let leading_cols = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let mut rows = Vec::new();
    for row in range.rows() {
        let mut cells: Row = Vec::with_capacity(leading_cols + row.len());
        cells.resize(leading_cols, CellValue::Null);
        cells.extend(row.iter().map(cell_value));

        while cells.last().map(CellValue::is_empty).unwrap_or(false) {
            cells.pop();
        }

        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    rows
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error {
            error: e.to_string(),
        },
        Data::DateTime(dt) => date_time_value(dt),
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn number_value(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INT {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}

/// Dates become ISO-8601 UTC timestamps, durations become `h:mm:ss` text.
///
/// calamine applies the workbook's 1900 or 1904 date system.
fn date_time_value(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(duration) => CellValue::Text(format_duration(duration.num_milliseconds())),
            None => number_value(dt.as_f64()),
        };
    }

    match dt.as_datetime() {
        Some(datetime) => {
            CellValue::Date(datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        }
        None => number_value(dt.as_f64()),
    }
}

fn format_duration(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let total_seconds = (millis.abs() + 500) / 1000;
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

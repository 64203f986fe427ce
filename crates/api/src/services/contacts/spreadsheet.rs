//! Reading contact rows out of an uploaded xlsx workbook.
//!
//! Column mapping is fixed: A → name, B → email, C → `mobile_number`. The
//! first row is treated as a header and skipped. Cells are stringified
//! before validation so that numeric-typed cells still import (with the
//! caveat that a spreadsheet storing mobile numbers as numbers loses the
//! leading zero and will fail format validation, which is the correct
//! outcome for that data).

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use thiserror::Error;

/// The only accepted content type for the import upload.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Errors that can occur while reading the workbook.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    /// The bytes are not a readable xlsx workbook.
    #[error("failed to read workbook: {0}")]
    Workbook(String),

    /// The workbook contains no worksheets.
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

/// One data row extracted from the sheet, with raw (unvalidated) fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRow {
    /// 1-based row number in the source file (header is row 1).
    pub row_number: usize,
    /// Column A.
    pub name: String,
    /// Column B.
    pub email: String,
    /// Column C.
    pub mobile_number: String,
}

/// Extract the data rows from the first worksheet, in file order.
///
/// The header row is skipped; rows whose first three cells are all empty
/// (trailing padding rows) are dropped rather than reported as malformed.
///
/// # Errors
///
/// Returns `SpreadsheetError` if the bytes are not a readable workbook or
/// the workbook has no worksheets.
pub fn extract_rows(bytes: &[u8]) -> Result<Vec<SpreadsheetRow>, SpreadsheetError> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| SpreadsheetError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoWorksheet)?
        .map_err(|e| SpreadsheetError::Workbook(e.to_string()))?;

    let mut rows = Vec::new();
    for (index, row) in range.rows().enumerate().skip(1) {
        let name = cell_to_string(row.first());
        let email = cell_to_string(row.get(1));
        let mobile_number = cell_to_string(row.get(2));

        if name.is_empty() && email.is_empty() && mobile_number.is_empty() {
            continue;
        }

        rows.push(SpreadsheetRow {
            row_number: index + 1,
            name,
            email,
            mobile_number,
        });
    }

    Ok(rows)
}

/// Render a cell as the string a user would expect to have typed.
///
/// Integral floats are printed without a decimal point (Excel stores most
/// numbers as floats).
fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_owned(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => {
            #[allow(clippy::cast_possible_truncation)]
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Some(Data::Bool(b)) => b.to_string(),
        Some(other) => other.to_string().trim().to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string_text() {
        assert_eq!(
            cell_to_string(Some(&Data::String("  contact1  ".to_owned()))),
            "contact1"
        );
    }

    #[test]
    fn test_cell_to_string_empty() {
        assert_eq!(cell_to_string(None), "");
        assert_eq!(cell_to_string(Some(&Data::Empty)), "");
    }

    #[test]
    fn test_cell_to_string_integral_float() {
        // Excel stores numbers as floats; 121234511 must not come out as
        // "121234511.0".
        assert_eq!(cell_to_string(Some(&Data::Float(121_234_511.0))), "121234511");
    }

    #[test]
    fn test_cell_to_string_fractional_float() {
        assert_eq!(cell_to_string(Some(&Data::Float(1.5))), "1.5");
    }

    #[test]
    fn test_extract_rejects_garbage_bytes() {
        assert!(matches!(
            extract_rows(b"definitely not a zip archive"),
            Err(SpreadsheetError::Workbook(_))
        ));
    }
}

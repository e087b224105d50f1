//! Excel workbook table discovery.
//!
//! Issuer workbooks carry metadata rows above the header with no fixed
//! offset, so discovery scans the first worksheet's rows the same way the
//! CSV parser scans lines. Fully empty rows are dropped wherever they
//! appear; trailing disclaimer rows are left for the caller's numeric
//! footer filter, which is what actually identifies them.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::errors::HoldingsError;

use super::{row_matches, Cell, HeaderRule, ParsedTable};

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn row_texts(row: &[Cell]) -> Vec<String> {
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.display_string())
        .collect()
}

/// Discover and extract the data table inside an xlsx workbook's first
/// worksheet.
pub fn parse_workbook(bytes: &[u8], rule: &HeaderRule) -> Result<ParsedTable, HoldingsError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| HoldingsError::InvalidDocument(format!("unreadable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(HoldingsError::EmptyTable)?
        .map_err(|e| HoldingsError::InvalidDocument(format!("unreadable worksheet: {}", e)))?;

    let grid: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    if grid.iter().all(|row| row.iter().all(Cell::is_empty)) {
        return Err(HoldingsError::EmptyTable);
    }

    let header_idx = match rule {
        HeaderRule::FirstRow => 0,
        HeaderRule::SkipRows(n) => {
            if *n >= grid.len() {
                return Err(HoldingsError::HeaderNotFound {
                    message: format!(
                        "worksheet has {} rows, cannot skip {} metadata rows",
                        grid.len(),
                        n
                    ),
                });
            }
            *n
        }
        HeaderRule::Scan(groups) => grid
            .iter()
            .position(|row| row_matches(groups, &row_texts(row)))
            .ok_or_else(|| HoldingsError::HeaderNotFound {
                message: format!("no worksheet row matched the header labels {:?}", groups),
            })?,
    };

    let headers: Vec<String> = grid[header_idx]
        .iter()
        .map(|cell| cell.display_string())
        .collect();

    let rows: Vec<Vec<Cell>> = grid[header_idx + 1..]
        .iter()
        .filter(|row| !row.iter().all(Cell::is_empty))
        .cloned()
        .collect();

    Ok(ParsedTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // Workbook bytes are not hand-buildable in a test, so discovery over
    // typed cells is exercised on the grid logic via cell_from_data and
    // row_matches; the end-to-end path shares locate/extract code with the
    // CSV parser tests.

    #[test]
    fn test_cell_from_data_mapping() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(
            cell_from_data(&Data::String("  Apple Inc  ".to_string())),
            Cell::Text("Apple Inc".to_string())
        );
        assert_eq!(cell_from_data(&Data::Float(6.71)), Cell::Number(6.71));
        assert_eq!(cell_from_data(&Data::Int(42)), Cell::Number(42.0));
        assert_eq!(
            cell_from_data(&Data::String("   ".to_string())),
            Cell::Empty
        );
    }

    #[test]
    fn test_numeric_excel_cell_coerces_to_decimal() {
        // Excel stores 6.71 as a float; coercion rounds the representation
        let cell = cell_from_data(&Data::Float(6.71));
        assert_eq!(cell.as_decimal(), Some(dec!(6.71)));
    }

    #[test]
    fn test_row_texts_skips_empty_cells() {
        let row = vec![
            Cell::Empty,
            Cell::Text("Name".to_string()),
            Cell::Empty,
            Cell::Text("Weight".to_string()),
        ];
        assert_eq!(row_texts(&row), vec!["Name", "Weight"]);
    }

    #[test]
    fn test_invalid_bytes_are_a_typed_error() {
        let err = parse_workbook(b"not a zip archive", &HeaderRule::FirstRow).unwrap_err();
        assert!(matches!(err, HoldingsError::InvalidDocument(_)));
    }
}

//! The rectangular table every format parser produces.

use std::str::FromStr;

use rust_decimal::Decimal;

/// One table cell. CSV and HTML sources only ever produce `Text`/`Empty`;
/// Excel additionally carries native numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell's text content, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The cell rendered as a display string ("" for empty cells). Whole
    /// numbers render without a fractional part.
    pub fn display_string(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Numeric coercion: the cell's value as a decimal, if it parses.
    ///
    /// Text cells are trimmed, stripped of a trailing `%` and of thousands
    /// separators before parsing, so `"9.05%"`, `" 9.05 "`, and `"1,234.5"`
    /// all coerce. Returns `None` for disclaimer text, `"N/A"`, and the
    /// like. This is the footer-filtering test.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) => Decimal::from_f64_retain(*n).map(|d| d.round_dp(6).normalize()),
            Cell::Text(s) => {
                let cleaned = s.trim().trim_end_matches('%').trim().replace(',', "");
                if cleaned.is_empty() {
                    return None;
                }
                Decimal::from_str(&cleaned).ok()
            }
            Cell::Empty => None,
        }
    }
}

/// A discovered table: the header row plus every data row below it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedTable {
    /// Header labels, trimmed, in document order
    pub headers: Vec<String>,
    /// Data rows; each row's cells align positionally with `headers`
    pub rows: Vec<Vec<Cell>>,
}

impl ParsedTable {
    /// Index of the first header containing `label` (case-insensitive).
    pub fn column_containing(&self, label: &str) -> Option<usize> {
        let label = label.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&label))
    }

    /// Index of the first header equal to `label` (case-insensitive, trimmed).
    pub fn column_equals(&self, label: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(label))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// The numeric-coercion footer filter: drop every row whose cell in
    /// `column` does not parse as a number. Disclaimer footers, cash
    /// summary lines, and ragged trailing rows all fail this test.
    pub fn retain_numeric_rows(&mut self, column: usize) {
        self.rows.retain(|row| {
            row.get(column)
                .map(|cell| cell.as_decimal().is_some())
                .unwrap_or(false)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_as_decimal_strips_percent_sign() {
        assert_eq!(Cell::Text("9.05%".to_string()).as_decimal(), Some(dec!(9.05)));
        assert_eq!(Cell::Text(" 9.05 % ".to_string()).as_decimal(), Some(dec!(9.05)));
    }

    #[test]
    fn test_as_decimal_plain_number_passes_through() {
        assert_eq!(Cell::Text("9.05".to_string()).as_decimal(), Some(dec!(9.05)));
        assert_eq!(Cell::Number(9.05).as_decimal(), Some(dec!(9.05)));
    }

    #[test]
    fn test_as_decimal_is_idempotent_on_normalized_text() {
        let once = Cell::Text("9.05%".to_string()).as_decimal().unwrap();
        let twice = Cell::Text(once.to_string()).as_decimal().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_as_decimal_strips_thousands_separators() {
        assert_eq!(
            Cell::Text("1,234.56".to_string()).as_decimal(),
            Some(dec!(1234.56))
        );
    }

    #[test]
    fn test_as_decimal_rejects_non_numeric() {
        assert_eq!(Cell::Text("N/A".to_string()).as_decimal(), None);
        assert_eq!(
            Cell::Text("Holdings are subject to change.".to_string()).as_decimal(),
            None
        );
        assert_eq!(Cell::Empty.as_decimal(), None);
        assert_eq!(Cell::Text("  ".to_string()).as_decimal(), None);
    }

    #[test]
    fn test_display_string_renders_whole_numbers_plainly() {
        assert_eq!(Cell::Number(37110.0).display_string(), "37110");
        assert_eq!(Cell::Number(6.71).display_string(), "6.71");
        assert_eq!(Cell::Text("AAPL".to_string()).display_string(), "AAPL");
        assert_eq!(Cell::Empty.display_string(), "");
    }

    fn sample_table() -> ParsedTable {
        ParsedTable {
            headers: vec!["Name".into(), "Ticker".into(), "Weight (%)".into()],
            rows: vec![
                vec![
                    Cell::Text("Apple Inc".into()),
                    Cell::Text("AAPL".into()),
                    Cell::Text("6.71".into()),
                ],
                vec![
                    Cell::Text("Holdings are subject to change.".into()),
                    Cell::Empty,
                    Cell::Empty,
                ],
                vec![
                    Cell::Text("Microsoft Corp".into()),
                    Cell::Text("MSFT".into()),
                    Cell::Text("6.25%".into()),
                ],
            ],
        }
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert_eq!(table.column_containing("weight"), Some(2));
        assert_eq!(table.column_equals("ticker"), Some(1));
        assert_eq!(table.column_equals("weight"), None);
        assert_eq!(table.column_containing("cusip"), None);
    }

    #[test]
    fn test_retain_numeric_rows_drops_footer() {
        let mut table = sample_table();
        table.retain_numeric_rows(2);
        assert_eq!(table.rows.len(), 2);
        // every retained row's designated cell parses as a number
        assert!(table
            .rows
            .iter()
            .all(|row| row[2].as_decimal().is_some()));
    }
}

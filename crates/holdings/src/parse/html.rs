//! HTML table discovery.
//!
//! Issuer pages built on nested layout tables defeat naive selection: an
//! outer layout `<table>` contains the real data table somewhere in its
//! subtree, and its own cells' text contains the entire inner table.
//! Discovery therefore inspects only DIRECT rows (`tr` children of a
//! table element or of its immediate `thead`/`tbody`/`tfoot`) and matches
//! header cells by whole-cell equality, never substring, so an outer cell
//! that merely contains the inner table's text cannot match.

use scraper::{ElementRef, Html, Selector};

use crate::errors::HoldingsError;

use super::{Cell, ParsedTable};

/// Direct rows of a table: `tr` children of the element itself or of its
/// immediate row-group children. Never descends into a nested table.
fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "tr" => rows.push(element),
            "thead" | "tbody" | "tfoot" => {
                for grandchild in element.children() {
                    if let Some(row) = ElementRef::wrap(grandchild) {
                        if row.value().name() == "tr" {
                            rows.push(row);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    rows
}

/// Text of the row's direct `td`/`th` children, whitespace-collapsed.
fn direct_cell_texts(row: ElementRef<'_>) -> Vec<String> {
    let mut cells = Vec::new();
    for child in row.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        if matches!(element.value().name(), "td" | "th") {
            let text: String = element.text().collect();
            cells.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
    cells
}

/// Whole-cell header match: every label group must have some cell equal
/// (case-insensitively) to one of its alternatives.
fn header_matches(groups: &[&[&str]], cells: &[String]) -> bool {
    groups.iter().all(|group| {
        cells.iter().any(|cell| {
            group
                .iter()
                .any(|label| cell.eq_ignore_ascii_case(label))
        })
    })
}

/// Locate the table whose direct header row matches all label groups and
/// extract it.
pub fn parse_html_table(
    html: &str,
    groups: &[&[&str]],
) -> Result<ParsedTable, HoldingsError> {
    let document = Html::parse_document(html);
    let table_selector =
        Selector::parse("table").map_err(|e| HoldingsError::InvalidDocument(e.to_string()))?;

    for table in document.select(&table_selector) {
        let rows = direct_rows(table);
        let Some((header_row, data_rows)) = rows.split_first() else {
            continue;
        };

        let headers = direct_cell_texts(*header_row);
        if headers.is_empty() || !header_matches(groups, &headers) {
            continue;
        }

        let rows: Vec<Vec<Cell>> = data_rows
            .iter()
            .map(|row| direct_cell_texts(*row))
            .filter(|cells| !cells.is_empty())
            .map(|cells| {
                cells
                    .into_iter()
                    .map(|text| {
                        if text.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(text)
                        }
                    })
                    .collect()
            })
            .collect();

        return Ok(ParsedTable { headers, rows });
    }

    Err(HoldingsError::HeaderNotFound {
        message: format!("no table's direct header row matched {:?}", groups),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &[&[&str]] = &[&["Identifier"], &["Weighting"]];

    const NESTED_LAYOUT: &str = r#"
<html><body>
<table>
  <tr><td>
    <table>
      <tr><th>Identifier</th><th>Security Name</th><th>Weighting</th></tr>
      <tr><td>AAPL</td><td>Apple Inc.</td><td>4.51%</td></tr>
      <tr><td>MSFT</td><td>Microsoft Corporation</td><td>4.18%</td></tr>
    </table>
  </td></tr>
</table>
</body></html>"#;

    #[test]
    fn test_finds_inner_table_in_nested_layout() {
        let table = parse_html_table(NESTED_LAYOUT, GROUPS).unwrap();
        assert_eq!(
            table.headers,
            vec!["Identifier", "Security Name", "Weighting"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("AAPL".to_string()));
        assert_eq!(table.rows[1][2], Cell::Text("4.18%".to_string()));
    }

    #[test]
    fn test_outer_layout_table_never_matches() {
        // the outer table's only cell contains the whole inner table's
        // text, so equality matching must reject it
        let table = parse_html_table(NESTED_LAYOUT, GROUPS).unwrap();
        assert_eq!(table.headers.len(), 3);
    }

    #[test]
    fn test_tbody_wrapped_rows_are_direct() {
        let html = r#"
<table>
  <thead><tr><th>Identifier</th><th>Weighting</th></tr></thead>
  <tbody>
    <tr><td>CSCO</td><td>3.02%</td></tr>
  </tbody>
</table>"#;
        let table = parse_html_table(html, GROUPS).unwrap();
        assert_eq!(table.headers, vec!["Identifier", "Weighting"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_match_is_case_insensitive_equality() {
        let html = "<table><tr><th>IDENTIFIER</th><th>weighting</th></tr><tr><td>X</td><td>1%</td></tr></table>";
        let table = parse_html_table(html, GROUPS).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_substring_cells_do_not_match() {
        let html = "<table><tr><th>Identifier Code</th><th>Weighting</th></tr></table>";
        let err = parse_html_table(html, GROUPS).unwrap_err();
        assert!(matches!(err, HoldingsError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_missing_table_is_typed_error() {
        let err = parse_html_table("<html><body><p>no tables</p></body></html>", GROUPS)
            .unwrap_err();
        assert!(matches!(err, HoldingsError::HeaderNotFound { .. }));
    }
}

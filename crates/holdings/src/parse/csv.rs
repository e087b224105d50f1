//! CSV table discovery.
//!
//! Issuer CSV downloads wrap the data table in metadata preambles (fund
//! name, as-of date) and disclaimer footers. Discovery works line-wise, as
//! the documents themselves are line-structured: find the header line per
//! the [`HeaderRule`], then collect rows until the first blank line. What
//! survives past the blank-line cut (quoted multi-line disclaimers, cash
//! summary rows) is removed by the caller's numeric footer filter.

use csv::ReaderBuilder;

use crate::errors::HoldingsError;

use super::{row_matches, Cell, HeaderRule, ParsedTable};

/// Parse one CSV line into trimmed fields.
fn split_line(line: &str) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    reader
        .records()
        .next()
        .and_then(|record| record.ok())
        .map(|record| record.iter().map(|f| f.trim().to_string()).collect())
        .unwrap_or_default()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty() || line.trim().chars().all(|c| c == ',')
}

/// Discover and extract the data table inside CSV text.
pub fn parse_csv(text: &str, rule: &HeaderRule) -> Result<ParsedTable, HoldingsError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.iter().all(|line| is_blank(line)) {
        return Err(HoldingsError::EmptyTable);
    }

    let header_idx = match rule {
        HeaderRule::FirstRow => 0,
        HeaderRule::SkipRows(n) => {
            if *n >= lines.len() {
                return Err(HoldingsError::HeaderNotFound {
                    message: format!(
                        "document has {} lines, cannot skip {} metadata rows",
                        lines.len(),
                        n
                    ),
                });
            }
            *n
        }
        HeaderRule::Scan(groups) => lines
            .iter()
            .position(|line| !is_blank(line) && row_matches(groups, &split_line(line)))
            .ok_or_else(|| HoldingsError::HeaderNotFound {
                message: format!("no CSV line matched the header labels {:?}", groups),
            })?,
    };

    let headers = split_line(lines[header_idx]);
    if headers.is_empty() {
        return Err(HoldingsError::HeaderNotFound {
            message: format!("line {} is not a parseable header row", header_idx),
        });
    }

    let mut rows = Vec::new();
    for line in &lines[header_idx + 1..] {
        // a blank line terminates the table; footers follow it
        if is_blank(line) {
            break;
        }
        let fields = split_line(line);
        if fields.is_empty() {
            break;
        }
        rows.push(
            fields
                .into_iter()
                .map(|f| {
                    if f.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f)
                    }
                })
                .collect(),
        );
    }

    Ok(ParsedTable { headers, rows })
}

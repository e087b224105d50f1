//! Format parsers: raw payloads in, rectangular [`ParsedTable`]s out.
//!
//! Every real-world holdings document embeds the actual data table inside
//! metadata preambles, disclaimer footers, or nested layout structures with
//! no fixed offset. The parsers here are purely structural: they discover
//! the header row and return typed cells, with no knowledge of what a
//! "weight" or a "ticker" is. Discovery failures surface as typed errors
//! ([`HeaderNotFound`](crate::errors::HoldingsError::HeaderNotFound),
//! [`EmptyTable`](crate::errors::HoldingsError::EmptyTable)), never as a
//! silent empty table, so callers can always tell "zero holdings" apart
//! from "could not find the data".

mod csv;
mod excel;
mod html;
mod table;

pub use self::csv::parse_csv;
pub use excel::parse_workbook;
pub use html::parse_html_table;
pub use table::{Cell, ParsedTable};

/// How to find the real header row inside a document.
#[derive(Clone, Copy, Debug)]
pub enum HeaderRule {
    /// The document starts directly with the header row.
    FirstRow,

    /// A fixed number of metadata rows precede the header.
    SkipRows(usize),

    /// Scan from the top for the first row satisfying every label group:
    /// a group matches when any of its alternatives appears, case
    /// insensitively, as a substring of some cell in the row.
    ///
    /// `Scan(&[&["ticker", "name"], &["weight"]])` reads as: a cell
    /// containing "ticker" or "name", and a cell containing "weight".
    Scan(&'static [&'static [&'static str]]),
}

/// Whether a row's cells satisfy every label group (see [`HeaderRule::Scan`]).
pub(crate) fn row_matches(groups: &[&[&str]], cells: &[String]) -> bool {
    groups.iter().all(|group| {
        cells.iter().any(|cell| {
            let cell = cell.to_lowercase();
            group.iter().any(|label| cell.contains(&label.to_lowercase()))
        })
    })
}

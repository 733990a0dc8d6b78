//! Column alignment
//!
//! Groups recognized fragments under the invoice column headers they share
//! horizontal extent with. Only the horizontal projection of each box is
//! considered; there is no row model, so a fragment overlapping two headers
//! belongs to both columns.

use crate::model::{Column, TextFragment};
use std::collections::BTreeMap;

/// Header words that open a column (case-sensitive exact match)
pub const HEADER_NAMES: [&str; 3] = ["Price", "Quantity", "Total"];

/// Column name → column
pub type ColumnMap = BTreeMap<String, Column>;

/// Whether `text` is one of the column header words
pub fn is_header(text: &str) -> bool {
    HEADER_NAMES.contains(&text)
}

/// Closed-interval overlap; touching edges count
fn spans_overlap(member: (i32, i32), header: (i32, i32)) -> bool {
    member.0 <= header.1 && member.1 >= header.0
}

/// Align fragments into named columns
///
/// Every fragment whose text is a header word opens a column. Every other
/// fragment (other headers included) whose top-edge span overlaps the
/// header's span is appended in input order. A header is never tested
/// against itself; identity is the fragment's position in `fragments`, so
/// two identical fragments are still distinct members.
///
/// Returns an empty map when no header is present. If a header word occurs
/// more than once, the last occurrence defines the column.
pub fn align_columns(fragments: &[TextFragment]) -> ColumnMap {
    let mut columns = ColumnMap::new();

    let headers = fragments
        .iter()
        .enumerate()
        .filter(|(_, fragment)| is_header(&fragment.text));

    for (header_idx, header) in headers {
        let header_span = header.bounding_box.horizontal_span();

        let mut members = vec![header.clone()];
        members.extend(
            fragments
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != header_idx)
                .filter(|(_, fragment)| spans_overlap(fragment.bounding_box.horizontal_span(), header_span))
                .map(|(_, fragment)| fragment.clone()),
        );

        columns.insert(
            header.text.clone(),
            Column {
                name: header.text.clone(),
                members,
            },
        );
    }

    columns
}

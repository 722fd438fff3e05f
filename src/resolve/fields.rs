//! Row field lookup for text blocks.

use crate::template::{Row, TextElement};

/// Value of `field` in `row`, or the field name itself when absent.
///
/// A broken binding shows its own name on the page instead of going blank.
pub fn resolve_field(row: &Row, field: &str) -> String {
    row.text(field).unwrap_or_else(|| field.to_string())
}

/// Resolved content of a row-bound text block, with prefix/suffix applied.
pub fn resolve_text(element: &TextElement, row: &Row) -> String {
    let value = resolve_field(row, &element.csv_column);
    if element.has_text_modifier {
        format!("{}{}{}", element.text_prefix, value, element.text_suffix)
    } else {
        value
    }
}

//! Card field layout.
//!
//! Patch cards hold up to eight fields of ten columns each; node cards use an
//! eight-column id followed by coordinate columns. Readers split on
//! whitespace first and fall back to fixed columns when neighbouring fields
//! touch. Writers right-justify into fixed columns and widen a field that
//! would otherwise touch its neighbour.

use std::fmt::Write;
use std::str::FromStr;

/// Number of fields on a full patch card.
pub const FIELDS_PER_CARD: usize = 8;

/// Width of one patch card field.
pub const FIELD_WIDTH: usize = 10;

/// Width of the node id column on output.
pub const NODE_ID_WIDTH: usize = 8;

/// Width of each node coordinate column on output.
pub const NODE_COORD_WIDTH: usize = 15;

/// Column widths of a node card on input (`nid`, `x`, `y`, `z`, `tc`, `rc`).
pub const NODE_INPUT_COLUMNS: [usize; 6] = [8, 16, 16, 16, 8, 8];

/// Fractional digits kept for knots and coordinates on output.
pub const DECIMALS: i32 = 6;

/// Round `value` to `decimals` fractional digits.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Shortest text that reads back as `value`, always with a decimal point
/// or exponent (`1.0`, `0.333333`, `-0.0`, `1e-7`).
pub fn format_real(value: f64) -> String {
    format!("{value:?}")
}

/// Append `field` right-justified to `width` columns, with at least one
/// leading blank.
pub fn push_field(out: &mut String, field: impl std::fmt::Display, width: usize) {
    let text = field.to_string();
    let width = width.max(text.len() + 1);
    // Writing into a String cannot fail.
    let _ = write!(out, "{text:>width$}");
}

fn parse_all<'a, T: FromStr>(fields: impl Iterator<Item = &'a str>) -> Option<Vec<T>> {
    fields.map(|f| f.parse().ok()).collect()
}

/// Slice `text` into consecutive columns of the given widths; the last width
/// repeats. Blank columns are dropped. Returns `None` for non-ASCII text or
/// when the text ends partway through a column.
pub(crate) fn fixed_columns<'a>(text: &'a str, widths: &[usize]) -> Option<Vec<&'a str>> {
    if !text.is_ascii() || widths.is_empty() {
        return None;
    }
    let text = text.trim_end();
    let mut fields = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while start < text.len() {
        let width = widths[i.min(widths.len() - 1)];
        let end = start + width;
        if end > text.len() {
            return None;
        }
        let field = text[start..end].trim();
        if !field.is_empty() {
            fields.push(field);
        }
        start = end;
        i += 1;
    }
    Some(fields)
}

/// Parse every field of a card as `T`.
///
/// Splits on whitespace; if any token fails to parse, re-reads the card as
/// fixed columns of `widths`. `None` if neither reading parses.
pub fn parse_fields<T: FromStr>(text: &str, widths: &[usize]) -> Option<Vec<T>> {
    parse_all(text.split_whitespace()).or_else(|| {
        let columns = fixed_columns(text, widths)?;
        parse_all(columns.into_iter())
    })
}

/// Parse a patch card (ten-column fields).
pub fn parse_patch_card<T: FromStr>(text: &str) -> Option<Vec<T>> {
    parse_fields(text, &[FIELD_WIDTH])
}

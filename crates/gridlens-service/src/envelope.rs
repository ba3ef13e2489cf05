//! Pagination across sheets via an opaque `sheet:<N>` cursor.

use crate::error::{ServiceError, ServiceResult};

const CURSOR_PREFIX: &str = "sheet:";

/// Decode a cursor into the index of the first unanalyzed sheet.
pub fn parse_cursor(cursor: Option<&str>) -> ServiceResult<usize> {
    let Some(cursor) = cursor else { return Ok(0) };
    cursor
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| ServiceError::InvalidArgument(format!("malformed cursor '{cursor}'")))
}

/// Encode the index of the first unanalyzed sheet.
pub fn format_cursor(next_index: usize) -> String {
    format!("{CURSOR_PREFIX}{next_index}")
}

/// One page of sheet indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPage {
    pub start: usize,
    pub end: usize,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Slice `[start, start + page_size)` out of `total` sheets.
pub fn sheet_page(total: usize, start: usize, page_size: usize) -> SheetPage {
    let end = start.saturating_add(page_size).min(total);
    let has_more = end < total;
    SheetPage {
        start: start.min(total),
        end,
        has_more,
        next_cursor: has_more.then(|| format_cursor(end)),
    }
}

//! A1-style cell references

use crate::error::{XlsxError, XlsxResult};
use sheetbase_core::{MAX_COLS, MAX_ROWS};

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub(crate) fn column_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Format a 0-based row/column pair as an A1 reference
pub(crate) fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_to_letters(col), row + 1)
}

/// Parse an A1 reference into a 0-based `(row, col)` pair
pub(crate) fn parse_cell_ref(s: &str) -> XlsxResult<(usize, usize)> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (letters, digits) = s.split_at(split);

    if letters.is_empty() {
        return Err(XlsxError::Parse(format!(
            "no column letters in cell reference '{}'",
            s
        )));
    }

    let mut col = 0usize;
    for c in letters.chars() {
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
        if col > MAX_COLS {
            return Err(XlsxError::Parse(format!(
                "column out of range in cell reference '{}'",
                s
            )));
        }
    }

    let row: usize = digits
        .parse()
        .map_err(|_| XlsxError::Parse(format!("invalid row number in cell reference '{}'", s)))?;
    if row == 0 {
        return Err(XlsxError::Parse(format!(
            "row number must be >= 1 in cell reference '{}'",
            s
        )));
    }
    if row > MAX_ROWS {
        return Err(XlsxError::Parse(format!(
            "row out of range in cell reference '{}'",
            s
        )));
    }

    Ok((row - 1, col - 1))
}

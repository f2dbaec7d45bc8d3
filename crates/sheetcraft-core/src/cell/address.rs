//! Cell coordinates and rectangular ranges

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A zero-based cell coordinate, displayed in A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in A1 notation)
    pub row: u32,
    /// Column index (A = 0, XFD = 16383)
    pub col: u16,
}

impl CellAddress {
    /// Create an address without range checks
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Create an address, rejecting coordinates past the sheet limits
    pub fn checked(row: u32, col: u16) -> Result<Self> {
        check_bounds(row, col)?;
        Ok(Self { row, col })
    }

    /// Parse `A1`-style notation; `$` markers are accepted and ignored
    ///
    /// ```
    /// use sheetcraft_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$C$7").unwrap();
    /// assert_eq!((addr.row, addr.col), (6, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let body = text.strip_prefix('$').unwrap_or(text);
        let split = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidAddress(format!("no row number in '{text}'")))?;
        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{text}'"
            )));
        }

        let (letters, rest) = body.split_at(split);
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{text}'")))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{text}'"
            )));
        }

        let col = column_index(letters)?;
        Self::checked(row - 1, col)
    }

    /// Format as `A1`
    pub fn to_a1(&self) -> String {
        let mut out = column_name(self.col);
        out.push_str(&(self.row + 1).to_string());
        out
    }

    /// Format as `$A$1`
    pub fn to_absolute_a1(&self) -> String {
        format!("${}${}", column_name(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Column letters for a zero-based index (0 = A, 26 = AA)
pub fn column_name(col: u16) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = col as u32 + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Zero-based index for column letters (case-insensitive)
pub fn column_index(letters: &str) -> Result<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return Err(Error::InvalidAddress(format!(
            "invalid column letters '{letters}'"
        )));
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!("invalid column letter '{c}'")));
        }
        n = n * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let col = n - 1;
    if col >= MAX_COLS as u32 {
        return Err(Error::ColumnOutOfBounds(
            col.min(u16::MAX as u32) as u16,
            MAX_COLS - 1,
        ));
    }
    Ok(col as u16)
}

/// Reject coordinates past the worksheet limits
pub(crate) fn check_bounds(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}

/// An inclusive rectangle of cells; always well-formed (first <= last)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// First (top) row
    pub first_row: u32,
    /// First (left) column
    pub first_col: u16,
    /// Last (bottom) row
    pub last_row: u32,
    /// Last (right) column
    pub last_col: u16,
}

impl CellRange {
    /// Create a range, validating orientation and limits
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Result<Self> {
        check_bounds(first_row, first_col)?;
        check_bounds(last_row, last_col)?;
        if first_row > last_row || first_col > last_col {
            return Err(Error::InvalidRange(format!(
                "({first_row}, {first_col}) is not above and left of ({last_row}, {last_col})"
            )));
        }
        Ok(Self {
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }

    /// A range covering one cell
    pub fn single(addr: CellAddress) -> Self {
        Self {
            first_row: addr.row,
            first_col: addr.col,
            last_row: addr.row,
            last_col: addr.col,
        }
    }

    /// Parse `A1:B10` (or a single `A1`)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                let start = CellAddress::parse(a)?;
                let end = CellAddress::parse(b)?;
                Self::new(start.row, start.col, end.row, end.col)
            }
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Top-left corner
    pub fn first(&self) -> CellAddress {
        CellAddress::new(self.first_row, self.first_col)
    }

    /// Bottom-right corner
    pub fn last(&self) -> CellAddress {
        CellAddress::new(self.last_row, self.last_col)
    }

    /// Whether the range covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    /// Whether `(row, col)` lies inside the range
    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Whether the two rectangles share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }

    /// Smallest range covering both
    pub fn union(&self, other: &CellRange) -> CellRange {
        CellRange {
            first_row: self.first_row.min(other.first_row),
            first_col: self.first_col.min(other.first_col),
            last_row: self.last_row.max(other.last_row),
            last_col: self.last_col.max(other.last_col),
        }
    }

    /// Every coordinate in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (u32, u16)> {
        let (first_col, last_col) = (self.first_col, self.last_col);
        (self.first_row..=self.last_row)
            .flat_map(move |row| (first_col..=last_col).map(move |col| (row, col)))
    }

    /// `A1:B2`, or `A1` for a single cell
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.first().to_a1()
        } else {
            format!("{}:{}", self.first(), self.last())
        }
    }

    /// `$A$1:$B$2`, or `$A$1` for a single cell
    pub fn to_absolute_a1(&self) -> String {
        if self.is_single_cell() {
            self.first().to_absolute_a1()
        } else {
            format!(
                "{}:{}",
                self.first().to_absolute_a1(),
                self.last().to_absolute_a1()
            )
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

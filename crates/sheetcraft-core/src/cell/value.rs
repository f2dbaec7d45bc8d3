//! Cell value types

use std::fmt;

use crate::style::FormatId;

/// A value stored in a worksheet cell
///
/// Text values are normally interned into the workbook's
/// [`StringTable`](crate::StringTable) and stored as a [`CellValue::SharedString`]
/// reference; [`CellValue::InlineString`] keeps the text in the cell itself.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Numeric value (dates are serial numbers)
    Number(f64),

    /// Reference into the shared string table
    SharedString(u32),

    /// Text stored in the cell rather than the shared string table
    InlineString(String),

    /// Formula text, stored without the leading `=`
    Formula {
        /// Formula text (e.g., "SUM(A1:A10)")
        text: String,
        /// Result supplied by the caller for readers that don't recalculate
        cached: Option<f64>,
    },

    /// Boolean value
    Boolean(bool),

    /// Placeholder that only carries a format (or covers part of a merge)
    Blank,

    /// Error value (e.g., #DIV/0!)
    Error(CellError),
}

impl CellValue {
    /// Check if the cell is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// Get as number if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the shared string reference, if any
    pub fn as_shared_string(&self) -> Option<u32> {
        match self {
            CellValue::SharedString(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::SharedString(_) => "shared string",
            CellValue::InlineString(_) => "inline string",
            CellValue::Formula { .. } => "formula",
            CellValue::Boolean(_) => "boolean",
            CellValue::Blank => "blank",
            CellValue::Error(_) => "error",
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// A cell value together with its format
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// The value
    pub value: CellValue,
    /// Index into the workbook format table (0 = default)
    pub format: FormatId,
}

impl CellData {
    /// Create cell data with a format
    pub fn new(value: CellValue, format: FormatId) -> Self {
        Self { value, format }
    }

    /// A blank placeholder with the given format
    pub fn blank(format: FormatId) -> Self {
        Self {
            value: CellValue::Blank,
            format,
        }
    }
}

/// Excel error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #NULL! - Incorrect range operator
    Null,
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #N/A - Value not available
    Na,
}

impl CellError {
    /// The text written to the file for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Parse an error literal (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that formula text is well formed enough to store
///
/// Strips one leading `=`, then requires non-empty text, balanced parentheses
/// and braces outside string literals, and terminated `"..."` / `'...'`
/// literals. Returns the text to store.
pub fn normalize_formula(text: &str) -> Result<&str, String> {
    let body = text.trim();
    let body = body.strip_prefix('=').unwrap_or(body);
    if body.trim().is_empty() {
        return Err("formula is empty".into());
    }

    let mut parens = 0i32;
    let mut braces = 0i32;
    let mut quote: Option<char> = None;
    for c in body.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => parens += 1,
                ')' => parens -= 1,
                '{' => braces += 1,
                '}' => braces -= 1,
                _ => {}
            },
        }
        if parens < 0 || braces < 0 {
            return Err(format!("unbalanced closing bracket in '{body}'"));
        }
    }

    if quote.is_some() {
        return Err(format!("unterminated literal in '{body}'"));
    }
    if parens != 0 || braces != 0 {
        return Err(format!("unbalanced brackets in '{body}'"));
    }
    Ok(body)
}

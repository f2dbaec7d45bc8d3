//! Defined names
//!
//! A defined name maps a name to a formula, usually a range reference. Names
//! are workbook-wide unless written as `Sheet!Name`, in which case they are
//! local to that sheet.
//!
//! # Example
//!
//! ```text
//! workbook.define_name("TaxRate", "=Sheet1!$B$1")?;
//! workbook.define_name("'Q1 Data'!Region", "='Q1 Data'!$A$2:$A$40")?;
//! ```

use crate::cell::{column_index, normalize_formula};
use crate::error::{Error, Result};

/// Longest name a consumer accepts
pub const MAX_DEFINED_NAME_LEN: usize = 255;

/// A defined name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    /// The name (e.g., "SalesData", "TaxRate"); case-insensitive
    pub name: String,
    /// Sheet the name is local to, or `None` for workbook scope
    pub sheet: Option<String>,
    /// What the name refers to, without the leading `=`
    pub formula: String,
}

impl DefinedName {
    /// Parse `name` (optionally `Sheet!name`) and `formula` into a definition
    pub fn parse(name: &str, formula: &str) -> Result<Self> {
        let (sheet, local) = split_scope(name);
        validate_name(local)?;
        let formula = normalize_formula(formula).map_err(Error::FormulaParse)?;
        Ok(Self {
            name: local.to_string(),
            sheet: sheet.map(str::to_string),
            formula: formula.to_string(),
        })
    }

    /// Whether two definitions collide (same name, same scope)
    pub fn same_key(&self, other: &DefinedName) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && match (&self.sheet, &other.sheet) {
                (None, None) => true,
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => false,
            }
    }
}

/// Split `Sheet!name` / `'My Sheet'!name` into scope and local name
fn split_scope(name: &str) -> (Option<&str>, &str) {
    match name.rfind('!') {
        Some(pos) => {
            let sheet = &name[..pos];
            let sheet = sheet
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(sheet);
            (Some(sheet), &name[pos + 1..])
        }
        None => (None, name),
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidName(format!("'{name}' {reason}")));

    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("is empty"),
        Some(c) if !(c.is_alphabetic() || c == '_' || c == '\\') => {
            return invalid("must start with a letter, underscore or backslash")
        }
        _ => {}
    }
    if name.chars().count() > MAX_DEFINED_NAME_LEN {
        return invalid("is too long");
    }
    if chars.any(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '\\'))) {
        return invalid("contains characters other than letters, digits, '_', '.' and '\\'");
    }
    if looks_like_reference(name) {
        return invalid("looks like a cell reference");
    }
    Ok(())
}

/// `A1`-style (`XFD1048576`) or `R1C1`-style names are ambiguous in formulas
fn looks_like_reference(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    if upper == "R" || upper == "C" {
        return true;
    }

    let letters: String = upper.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &upper[letters.len()..];
    if !letters.is_empty()
        && letters.len() <= 3
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && column_index(&letters).is_ok()
    {
        return true;
    }

    let rc = |s: &str| {
        let s = s.strip_prefix('R').unwrap_or("x");
        let (row, rest) = s.split_at(s.find('C').unwrap_or(s.len()));
        row.chars().all(|c| c.is_ascii_digit())
            && rest
                .strip_prefix('C')
                .map_or(false, |col| col.chars().all(|c| c.is_ascii_digit()))
    };
    rc(&upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_workbook_scope() {
        let name = DefinedName::parse("TaxRate", "=Sheet1!$B$1").unwrap();
        assert_eq!(name.name, "TaxRate");
        assert_eq!(name.sheet, None);
        assert_eq!(name.formula, "Sheet1!$B$1");
    }

    #[test]
    fn test_sheet_scope() {
        let name = DefinedName::parse("'Q1 Data'!Region", "'Q1 Data'!$A$2:$A$40").unwrap();
        assert_eq!(name.name, "Region");
        assert_eq!(name.sheet.as_deref(), Some("Q1 Data"));

        let plain = DefinedName::parse("Sheet2!Total", "=SUM(Sheet2!A:A)").unwrap();
        assert_eq!(plain.sheet.as_deref(), Some("Sheet2"));
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "1abc", "has space", "A1", "xfd100", "R1C1", "r", "a-b"] {
            let err = DefinedName::parse(bad, "=1").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName, "{bad}");
        }
        assert!(DefinedName::parse("_Sales.2024", "=1").is_ok());
        assert!(DefinedName::parse("ABCD1", "=1").is_ok());
    }

    #[test]
    fn test_bad_formula() {
        let err = DefinedName::parse("Total", "=SUM(A1").unwrap_err();
        assert!(matches!(err, Error::FormulaParse(_)));
    }

    #[test]
    fn test_same_key_is_case_insensitive() {
        let a = DefinedName::parse("Rate", "=0.05").unwrap();
        let b = DefinedName::parse("RATE", "=0.08").unwrap();
        let local = DefinedName::parse("Sheet1!Rate", "=0.08").unwrap();
        assert!(a.same_key(&b));
        assert!(!a.same_key(&local));
    }
}

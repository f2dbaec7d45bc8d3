//! Values accepted by worksheet write calls

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

use super::CellError;

/// A value as supplied by the caller, before string interning
///
/// Most callers never name this type; the `From` impls let
/// `write_cell` take numbers, text, booleans, dates and error codes directly.
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput<'a> {
    /// Numeric value
    Number(f64),
    /// Text, interned into the shared string table
    String(Cow<'a, str>),
    /// Text stored in the cell itself
    InlineString(Cow<'a, str>),
    /// Boolean value
    Boolean(bool),
    /// Formula text (leading `=` optional) with an optional cached result
    Formula {
        text: Cow<'a, str>,
        cached: Option<f64>,
    },
    /// Date and time, stored as a serial number
    DateTime(NaiveDateTime),
    /// Error value
    Error(CellError),
    /// No value; only the format is stored
    Blank,
}

impl<'a> CellInput<'a> {
    /// A formula without a cached result
    pub fn formula<S: Into<Cow<'a, str>>>(text: S) -> Self {
        CellInput::Formula {
            text: text.into(),
            cached: None,
        }
    }

    /// Text that bypasses the shared string table
    pub fn inline<S: Into<Cow<'a, str>>>(text: S) -> Self {
        CellInput::InlineString(text.into())
    }
}

impl From<f64> for CellInput<'_> {
    fn from(n: f64) -> Self {
        CellInput::Number(n)
    }
}

impl From<f32> for CellInput<'_> {
    fn from(n: f32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<i32> for CellInput<'_> {
    fn from(n: i32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<u32> for CellInput<'_> {
    fn from(n: u32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<i64> for CellInput<'_> {
    fn from(n: i64) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<bool> for CellInput<'_> {
    fn from(b: bool) -> Self {
        CellInput::Boolean(b)
    }
}

impl<'a> From<&'a str> for CellInput<'a> {
    fn from(s: &'a str) -> Self {
        CellInput::String(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for CellInput<'a> {
    fn from(s: &'a String) -> Self {
        CellInput::String(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for CellInput<'_> {
    fn from(s: String) -> Self {
        CellInput::String(Cow::Owned(s))
    }
}

impl From<CellError> for CellInput<'_> {
    fn from(e: CellError) -> Self {
        CellInput::Error(e)
    }
}

impl From<NaiveDateTime> for CellInput<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        CellInput::DateTime(dt)
    }
}

impl From<NaiveDate> for CellInput<'_> {
    fn from(d: NaiveDate) -> Self {
        CellInput::DateTime(d.and_time(chrono::NaiveTime::MIN))
    }
}

//! # sheetcraft-core
//!
//! Core data structures for the sheetcraft spreadsheet writer.
//!
//! This crate provides everything that lives inside a workbook:
//! - [`CellValue`] and [`CellInput`] - Stored and caller-supplied cell values
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Style`] and [`FormatTable`] - Cell formatting, deduplicated per workbook
//! - [`StringTable`] - The workbook's shared strings
//! - [`Workbook`], [`Worksheet`], [`WorksheetMut`] - The document structures
//! - [`XmlEmitter`] - Streaming SpreadsheetML output
//!
//! Packaging the parts into an `.xlsx` archive is done by `sheetcraft-xlsx`.
//!
//! ## Example
//!
//! ```rust
//! use sheetcraft_core::{Style, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let bold = workbook.create_format(&Style::new().bold(true)).unwrap();
//!
//! let mut sheet = workbook.add_worksheet("Summary").unwrap();
//! sheet.write_string(0, 0, "Total", None).unwrap();
//! sheet.write_number(0, 1, 42.5, Some(bold)).unwrap();
//! sheet.merge_range(2, 0, 3, 1, "Notes", None).unwrap();
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod grid;
pub mod named_range;
pub mod properties;
pub mod row;
pub mod strings;
pub mod style;
pub mod workbook;
pub mod worksheet;
pub mod xml;

// Re-exports for convenience
pub use cell::{
    column_index, column_name, datetime_to_serial, CellAddress, CellData, CellError, CellInput,
    CellRange, CellValue,
};
pub use column::ColumnOptions;
pub use error::{Error, ErrorKind, Result};
pub use grid::WriteMode;
pub use named_range::DefinedName;
pub use properties::DocProperties;
pub use row::RowOptions;
pub use strings::StringTable;
pub use workbook::{Compression, Workbook, WorkbookSettings};
pub use worksheet::{Hyperlink, LinkTarget, Panes, Worksheet, WorksheetMut};
pub use xml::{InvalidCharPolicy, XmlEmitter};

// Re-export all style types for convenience
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle, FormatId,
    FormatTable, HorizontalAlignment, NumberFormat, Protection, Style, VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Default namespace of every SpreadsheetML part
pub const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Namespace of `r:id` relationship references inside parts
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

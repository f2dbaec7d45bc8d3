//! # sheetcraft
//!
//! A Rust library for writing Excel spreadsheets (`.xlsx`).
//!
//! ## Features
//!
//! - Numbers, shared and inline strings, booleans, errors, formulas with
//!   cached results, dates and hyperlinks
//! - Deduplicated cell formats (fonts, fills, borders, alignment, number formats)
//! - Merged ranges, row and column settings, frozen and split panes
//! - Constant-memory streaming worksheets for very large sheets
//! - Atomic file saves: a failed save leaves no partial file behind
//!
//! ## Example
//!
//! ```rust
//! use sheetcraft::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let bold = workbook.create_format(&Style::new().bold(true)).unwrap();
//!
//! let mut sheet = workbook.add_worksheet("Summary").unwrap();
//! sheet.write_string(0, 0, "Total", None).unwrap();
//! sheet.write_number(0, 1, 42.5, Some(bold)).unwrap();
//! sheet.write_formula(1, 1, "=B1*2", Some(85.0), None).unwrap();
//!
//! // Save to file
//! // workbook.save("output.xlsx").unwrap();
//! let bytes = workbook.save_to_writer(std::io::Cursor::new(Vec::new())).unwrap();
//! assert!(!bytes.into_inner().is_empty());
//! ```

pub mod prelude;

// Re-export core types
pub use sheetcraft_core::{
    Alignment,
    BorderEdge,
    BorderLineStyle,
    BorderStyle,
    CellAddress,
    CellData,
    CellError,
    CellInput,
    CellRange,
    // Cell types
    CellValue,
    Color,
    ColumnOptions,
    Compression,
    DefinedName,
    DocProperties,
    // Error types
    Error,
    ErrorKind,
    FillStyle,
    FontStyle,
    FormatId,
    HorizontalAlignment,
    Hyperlink,
    InvalidCharPolicy,
    LinkTarget,
    NumberFormat,
    Panes,
    Protection,
    Result,
    RowOptions,
    // Style types
    Style,
    VerticalAlignment,
    // Main types
    Workbook,
    WorkbookSettings,
    Worksheet,
    WorksheetMut,
    WriteMode,

    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use sheetcraft_xlsx::{XlsxError, XlsxResult, XlsxWriter};

use std::io::{Seek, Write};
use std::path::Path;

/// Extension trait for Workbook to add file output
pub trait WorkbookExt {
    /// Save the workbook to an `.xlsx` file
    ///
    /// The workbook stays usable; saving again without changes produces the
    /// same parts. Formats can no longer be created afterwards.
    fn save<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()>;

    /// Write the package to any seekable writer and return it
    fn save_to_writer<W: Write + Seek>(&mut self, writer: W) -> XlsxResult<W>;

    /// Save and release the workbook, including streaming temp files
    fn close<P: AsRef<Path>>(self, path: P) -> XlsxResult<()>;
}

impl WorkbookExt for Workbook {
    fn save<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => XlsxWriter::write_file(self, path),
            _ => Err(XlsxError::InvalidFormat(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    fn save_to_writer<W: Write + Seek>(&mut self, writer: W) -> XlsxResult<W> {
        XlsxWriter::write(self, writer)
    }

    fn close<P: AsRef<Path>>(mut self, path: P) -> XlsxResult<()> {
        self.save(path)
    }
}

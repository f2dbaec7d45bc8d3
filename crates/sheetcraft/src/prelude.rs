//! Prelude module - common imports for sheetcraft users
//!
//! ```rust
//! use sheetcraft::prelude::*;
//! ```

pub use crate::{
    // Style types
    Alignment,
    BorderLineStyle,
    BorderStyle,
    // Cell types
    CellAddress,
    CellError,
    CellInput,
    CellRange,
    CellValue,
    Color,
    ColumnOptions,
    DocProperties,
    // Error types
    Error,
    ErrorKind,
    FillStyle,
    FontStyle,
    FormatId,
    HorizontalAlignment,
    NumberFormat,
    Result,
    RowOptions,
    Style,
    VerticalAlignment,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    WorkbookSettings,
    Worksheet,
    WorksheetMut,
    WriteMode,
    // I/O types
    XlsxError,
    XlsxWriter,
};

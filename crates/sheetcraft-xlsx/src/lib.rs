//! # sheetcraft-xlsx
//!
//! XLSX (Office Open XML) packager for sheetcraft.
//!
//! [`XlsxWriter`] walks a [`Workbook`](sheetcraft_core::Workbook) and writes
//! every part of the package, together with the content-type manifest and
//! the relationship files, into a ZIP archive.

pub mod error;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use writer::{ContentTypes, PartSink, Relationships, XlsxWriter, ZipPartSink};

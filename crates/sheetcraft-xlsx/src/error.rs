//! XLSX error types

use sheetcraft_core::ErrorKind;
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while packaging a workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Target the package cannot be written to, e.g. a non-`.xlsx` path
    #[error("Invalid XLSX target: {0}")]
    InvalidFormat(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetcraft_core::Error),
}

impl XlsxError {
    /// Classify this error; sink failures are resource errors
    pub fn kind(&self) -> ErrorKind {
        match self {
            XlsxError::Core(e) => e.kind(),
            XlsxError::Io(_) | XlsxError::Zip(_) | XlsxError::Xml(_) => ErrorKind::ResourceError,
            XlsxError::InvalidFormat(_) => ErrorKind::InvalidInput,
        }
    }
}

//! Error types for sheetcraft-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or emitting a workbook
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range (malformed text, or first > last)
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Invalid defined name
    #[error("Invalid defined name: {0}")]
    InvalidName(String),

    /// Format handle that does not belong to the workbook's format table
    #[error("Invalid format index: {0}")]
    InvalidFormatIndex(u32),

    /// Built-in number format id outside the range reserved for built-ins
    #[error("Invalid built-in number format id: {0}")]
    InvalidNumberFormat(u32),

    /// Streaming worksheet write behind the row currently being written
    #[error("Row {row} is behind streaming row {current}")]
    OrderingViolation { row: u32, current: u32 },

    /// Merged range overlaps an existing merged range
    #[error("Merged range {range} overlaps existing merged range {existing}")]
    MergeOverlap { range: String, existing: String },

    /// Format interning attempted after the format table was sealed
    #[error("Format table is sealed; no new formats can be created")]
    SealedFormatTable,

    /// Text contains characters that XML 1.0 cannot represent
    #[error("Character U+{code:04X} cannot be written to XML")]
    Encoding { code: u32 },

    /// Formula is not well formed
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Hyperlink target that cannot be stored
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Temporary storage or output sink failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writer failure
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Sheet or defined name is empty, too long, duplicated or has forbidden characters
    InvalidName,
    /// Row or column exceeds the addressable maximum
    OutOfRange,
    /// Streaming write to an already flushed row
    OrderingViolation,
    /// Merged ranges overlap
    OverlapViolation,
    /// Format interning after seal
    SealedTableMutation,
    /// Temporary storage or archive sink failed
    ResourceError,
    /// Text cannot be represented and the policy is reject
    EncodingError,
    /// Malformed argument (address, range, formula, unknown sheet or format)
    InvalidInput,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSheetName(_) | Error::DuplicateSheetName(_) | Error::InvalidName(_) => {
                ErrorKind::InvalidName
            }
            Error::RowOutOfBounds(..) | Error::ColumnOutOfBounds(..) => ErrorKind::OutOfRange,
            Error::OrderingViolation { .. } => ErrorKind::OrderingViolation,
            Error::MergeOverlap { .. } => ErrorKind::OverlapViolation,
            Error::SealedFormatTable => ErrorKind::SealedTableMutation,
            Error::Io(_) | Error::Xml(_) => ErrorKind::ResourceError,
            Error::Encoding { .. } => ErrorKind::EncodingError,
            Error::InvalidAddress(_)
            | Error::InvalidRange(_)
            | Error::SheetOutOfBounds(..)
            | Error::SheetNotFound(_)
            | Error::InvalidFormatIndex(_)
            | Error::InvalidNumberFormat(_)
            | Error::FormulaParse(_)
            | Error::InvalidUrl(_) => ErrorKind::InvalidInput,
        }
    }
}

//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellData`] - A value plus its format
//! - [`CellInput`] - A caller-supplied value before interning
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")

mod address;
mod datetime;
mod input;
mod value;

pub use address::{column_index, column_name, CellAddress, CellRange};
pub(crate) use address::check_bounds;
pub use datetime::datetime_to_serial;
pub use input::CellInput;
pub use value::{normalize_formula, CellData, CellError, CellValue};

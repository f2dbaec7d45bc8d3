//! Worksheet cell storage
//!
//! A [`Grid`] holds the rows of one worksheet in one of two modes, chosen when
//! the worksheet is created:
//!
//! - [`WriteMode::Buffered`] keeps every row in memory, ordered by row and
//!   column index, and accepts writes in any order.
//! - [`WriteMode::Streaming`] keeps only the row being written. Moving to a
//!   higher row serializes the previous one to a private temporary file, and
//!   any write behind the current row fails with
//!   [`Error::OrderingViolation`](crate::Error::OrderingViolation).
//!
//! Both modes serialize rows the same way (see `Row::write_xml`), so a
//! worksheet's `<sheetData>` is identical whichever mode produced it.

mod buffered;
mod streaming;

use std::io::Write;
use std::path::PathBuf;

pub(crate) use buffered::BufferedGrid;
pub(crate) use streaming::StreamingGrid;

use crate::cell::{CellData, CellRange};
use crate::error::Result;
use crate::row::RowOptions;
use crate::style::FormatId;
use crate::xml::{InvalidCharPolicy, XmlEmitter};

/// How a worksheet accepts cell writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Any order; all cells held in memory until finalize
    #[default]
    Buffered,
    /// Strictly increasing rows; finished rows go to a temporary file
    Streaming,
}

/// Cell storage for one worksheet
#[derive(Debug)]
pub(crate) enum Grid {
    Buffered(BufferedGrid),
    Streaming(StreamingGrid),
}

impl Grid {
    pub(crate) fn new(mode: WriteMode, temp_dir: Option<PathBuf>, policy: InvalidCharPolicy) -> Self {
        match mode {
            WriteMode::Buffered => Grid::Buffered(BufferedGrid::default()),
            WriteMode::Streaming => Grid::Streaming(StreamingGrid::new(temp_dir, policy)),
        }
    }

    pub(crate) fn mode(&self) -> WriteMode {
        match self {
            Grid::Buffered(_) => WriteMode::Buffered,
            Grid::Streaming(_) => WriteMode::Streaming,
        }
    }

    /// Fail if `row` can no longer be written; never mutates
    pub(crate) fn check_row(&self, row: u32) -> Result<()> {
        match self {
            Grid::Buffered(_) => Ok(()),
            Grid::Streaming(grid) => grid.check_row(row),
        }
    }

    /// Store a cell, replacing any previous value at the same coordinate
    pub(crate) fn write(&mut self, row: u32, col: u16, cell: CellData) -> Result<()> {
        match self {
            Grid::Buffered(grid) => {
                grid.write(row, col, cell);
                Ok(())
            }
            Grid::Streaming(grid) => grid.write(row, col, cell),
        }
    }

    pub(crate) fn set_row_options(&mut self, row: u32, options: RowOptions) -> Result<()> {
        match self {
            Grid::Buffered(grid) => {
                grid.set_row_options(row, options);
                Ok(())
            }
            Grid::Streaming(grid) => grid.set_row_options(row, options),
        }
    }

    /// Write `top_left` and blank placeholders over the rest of `range`
    pub(crate) fn fill_merge(&mut self, range: &CellRange, top_left: CellData, format: FormatId) -> Result<()> {
        match self {
            Grid::Buffered(grid) => {
                grid.fill_merge(range, top_left, format);
                Ok(())
            }
            Grid::Streaming(grid) => grid.fill_merge(range, top_left, format),
        }
    }

    /// A stored cell; streaming grids only see the row being written
    pub(crate) fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        match self {
            Grid::Buffered(grid) => grid.get(row, col),
            Grid::Streaming(grid) => grid.get(row, col),
        }
    }

    /// Write the `<sheetData>` element
    pub(crate) fn write_sheet_data<W: Write>(&mut self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.open_element("sheetData")?;
        match self {
            Grid::Buffered(grid) => grid.write_rows(xml)?,
            Grid::Streaming(grid) => grid.write_rows(xml)?,
        }
        xml.close_element("sheetData")
    }
}

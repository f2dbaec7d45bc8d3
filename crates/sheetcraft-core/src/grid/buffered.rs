//! In-memory grid: rows and cells in ordered maps

use std::collections::BTreeMap;
use std::io::Write;

use crate::cell::{CellData, CellRange};
use crate::error::Result;
use crate::row::{Row, RowOptions};
use crate::style::FormatId;
use crate::xml::XmlEmitter;

/// Every row of a worksheet, ascending by row index
#[derive(Debug, Default)]
pub(crate) struct BufferedGrid {
    rows: BTreeMap<u32, Row>,
}

impl BufferedGrid {
    pub(crate) fn write(&mut self, row: u32, col: u16, cell: CellData) {
        self.rows.entry(row).or_default().cells.insert(col, cell);
    }

    pub(crate) fn set_row_options(&mut self, row: u32, options: RowOptions) {
        self.rows.entry(row).or_default().options = options;
    }

    pub(crate) fn fill_merge(&mut self, range: &CellRange, top_left: CellData, format: FormatId) {
        let origin = (range.first_row, range.first_col);
        let mut top_left = Some(top_left);
        for (row, col) in range.cells() {
            let cell = if (row, col) == origin {
                top_left.take().unwrap_or_else(|| CellData::blank(format))
            } else {
                CellData::blank(format)
            };
            self.write(row, col, cell);
        }
    }

    pub(crate) fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row)?.cells.get(&col)
    }

    pub(crate) fn write_rows<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        for (&index, row) in &self.rows {
            row.write_xml(xml, index)?;
        }
        Ok(())
    }
}

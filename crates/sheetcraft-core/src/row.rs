//! Row types and row serialization

use std::collections::BTreeMap;
use std::io::Write;

use crate::cell::{CellAddress, CellData, CellValue};
use crate::error::Result;
use crate::strings::write_text_element;
use crate::style::FormatId;
use crate::xml::XmlEmitter;

/// Highest outline level a row or column can carry
pub const MAX_OUTLINE_LEVEL: u8 = 7;

/// Row-level properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowOptions {
    /// Custom height in points (None = default)
    pub height: Option<f64>,
    /// Row is hidden
    pub hidden: bool,
    /// Outline/grouping level (0-7)
    pub outline_level: u8,
    /// Row is collapsed (in outline)
    pub collapsed: bool,
    /// Default format for empty cells in the row
    pub format: Option<FormatId>,
}

impl RowOptions {
    /// Create default row options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom height in points
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Set hidden
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the outline level (clamped to 7)
    pub fn with_outline_level(mut self, level: u8) -> Self {
        self.outline_level = level.min(MAX_OUTLINE_LEVEL);
        self
    }

    /// Set collapsed
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Set the row's default format
    pub fn with_format(mut self, format: FormatId) -> Self {
        self.format = Some(format);
        self
    }

    /// Check if this row has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.height.is_some()
            || self.hidden
            || self.outline_level > 0
            || self.collapsed
            || self.format.map_or(false, |f| !f.is_default())
    }
}

/// One row of a worksheet grid: cells ordered by column plus row properties
#[derive(Debug, Clone, Default)]
pub(crate) struct Row {
    pub(crate) cells: BTreeMap<u16, CellData>,
    pub(crate) options: RowOptions,
}

impl Row {
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty() && !self.options.has_custom_settings()
    }

    /// Serialize as a `<row>` element; rows with nothing to say are skipped
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>, index: u32) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        xml.open_element("row")?;
        xml.attribute_num("r", index + 1)?;
        if let (Some(first), Some(last)) = (self.cells.keys().next(), self.cells.keys().next_back()) {
            xml.attribute("spans", &format!("{}:{}", first + 1, last + 1))?;
        }

        let opts = &self.options;
        if let Some(format) = opts.format.filter(|f| !f.is_default()) {
            xml.attribute_num("s", format.index())?;
            xml.attribute("customFormat", "1")?;
        }
        if let Some(height) = opts.height {
            xml.attribute_num("ht", height)?;
            xml.attribute("customHeight", "1")?;
        }
        if opts.hidden {
            xml.attribute("hidden", "1")?;
        }
        if opts.outline_level > 0 {
            xml.attribute_num("outlineLevel", opts.outline_level)?;
        }
        if opts.collapsed {
            xml.attribute("collapsed", "1")?;
        }

        for (&col, cell) in &self.cells {
            write_cell(xml, index, col, cell)?;
        }
        xml.close_element("row")
    }
}

fn write_cell<W: Write>(xml: &mut XmlEmitter<W>, row: u32, col: u16, cell: &CellData) -> Result<()> {
    xml.open_element("c")?;
    xml.attribute("r", &CellAddress::new(row, col).to_a1())?;
    if !cell.format.is_default() {
        xml.attribute_num("s", cell.format.index())?;
    }

    match &cell.value {
        CellValue::Number(n) if n.is_finite() => {
            xml.text_element("v", &n.to_string())?;
        }
        CellValue::Number(n) => {
            log::warn!(
                "non-finite number {} at {} written as #NUM!",
                n,
                CellAddress::new(row, col)
            );
            xml.attribute("t", "e")?;
            xml.text_element("v", "#NUM!")?;
        }
        CellValue::SharedString(idx) => {
            xml.attribute("t", "s")?;
            xml.text_element("v", &idx.to_string())?;
        }
        CellValue::InlineString(text) => {
            xml.attribute("t", "inlineStr")?;
            xml.open_element("is")?;
            write_text_element(xml, text)?;
            xml.close_element("is")?;
        }
        CellValue::Formula { text, cached } => {
            xml.text_element("f", text)?;
            if let Some(value) = cached.filter(|v| v.is_finite()) {
                xml.text_element("v", &value.to_string())?;
            }
        }
        CellValue::Boolean(b) => {
            xml.attribute("t", "b")?;
            xml.text_element("v", if *b { "1" } else { "0" })?;
        }
        CellValue::Error(e) => {
            xml.attribute("t", "e")?;
            xml.text_element("v", e.as_str())?;
        }
        CellValue::Blank => {}
    }

    xml.close_element("c")
}

//! Column types

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::Result;
use crate::row::MAX_OUTLINE_LEVEL;
use crate::style::FormatId;
use crate::xml::XmlEmitter;

/// Default column width in characters, used when only other settings are given
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Column properties, applied to a span of columns by `set_column`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    /// Custom width in characters (None = default)
    pub width: Option<f64>,
    /// Column is hidden
    pub hidden: bool,
    /// Outline/grouping level (0-7)
    pub outline_level: u8,
    /// Column is collapsed (in outline)
    pub collapsed: bool,
    /// Default format for empty cells in the column
    pub format: Option<FormatId>,
}

impl ColumnOptions {
    /// Create default column options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set width
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
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

    /// Set the column's default format
    pub fn with_format(mut self, format: FormatId) -> Self {
        self.format = Some(format);
        self
    }

    /// Check if this column has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.width.is_some()
            || self.hidden
            || self.outline_level > 0
            || self.collapsed
            || self.format.map_or(false, |f| !f.is_default())
    }
}

/// Per-column settings of one worksheet
///
/// Settings are stored per column; adjacent columns with identical settings
/// are written as a single `<col min max>` span.
#[derive(Debug, Clone, Default)]
pub(crate) struct Columns {
    columns: BTreeMap<u16, ColumnOptions>,
}

impl Columns {
    pub(crate) fn set(&mut self, first: u16, last: u16, options: &ColumnOptions) {
        for col in first..=last {
            if options.has_custom_settings() {
                self.columns.insert(col, options.clone());
            } else {
                self.columns.remove(&col);
            }
        }
    }

    pub(crate) fn get(&self, col: u16) -> Option<&ColumnOptions> {
        self.columns.get(&col)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coalesced `(first, last, options)` spans in column order
    pub(crate) fn spans(&self) -> Vec<(u16, u16, &ColumnOptions)> {
        let mut spans: Vec<(u16, u16, &ColumnOptions)> = Vec::new();
        for (&col, options) in &self.columns {
            match spans.last_mut() {
                Some((_, last, prev)) if *last + 1 == col && *prev == options => *last = col,
                _ => spans.push((col, col, options)),
            }
        }
        spans
    }

    /// Write the `<cols>` section; nothing when no column is customized
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        xml.open_element("cols")?;
        for (first, last, opts) in self.spans() {
            xml.open_element("col")?;
            xml.attribute_num("min", first + 1)?;
            xml.attribute_num("max", last + 1)?;
            let width = if opts.hidden {
                opts.width.unwrap_or(0.0)
            } else {
                opts.width.unwrap_or(DEFAULT_COLUMN_WIDTH)
            };
            xml.attribute_num("width", width)?;
            if let Some(format) = opts.format.filter(|f| !f.is_default()) {
                xml.attribute_num("style", format.index())?;
            }
            if opts.hidden {
                xml.attribute("hidden", "1")?;
            }
            if opts.width.is_some() || opts.hidden {
                xml.attribute("customWidth", "1")?;
            }
            if opts.outline_level > 0 {
                xml.attribute_num("outlineLevel", opts.outline_level)?;
            }
            if opts.collapsed {
                xml.attribute("collapsed", "1")?;
            }
            xml.close_element("col")?;
        }
        xml.close_element("cols")
    }
}

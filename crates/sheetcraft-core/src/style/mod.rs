//! Cell formatting
//!
//! This module contains the attribute types that make up a cell format and
//! the workbook-wide [`FormatTable`] that deduplicates them:
//! - [`Style`] - Complete set of format attributes
//! - [`FontStyle`] - Font settings
//! - [`FillStyle`] - Background fill
//! - [`BorderStyle`] - Cell borders
//! - [`Alignment`] - Text alignment
//! - [`NumberFormat`] - Number format code
//! - [`Color`] - Color representation

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod table;

pub use alignment::{
    Alignment, HorizontalAlignment, ReadingOrder, VerticalAlignment, VERTICAL_TEXT,
};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle, DiagonalDirection};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, FontVerticalAlign, Underline, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE};
pub use number_format::{NumberFormat, FIRST_CUSTOM_NUM_FMT_ID};
pub use table::{FormatId, FormatTable};

/// Complete set of cell format attributes
///
/// Pass a `Style` to [`FormatTable::get_or_create`] (usually through
/// `Workbook::create_format`) to obtain a [`FormatId`] that cells can use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Fill/background settings
    pub fill: FillStyle,
    /// Border settings
    pub border: BorderStyle,
    /// Text alignment
    pub alignment: Alignment,
    /// Number format
    pub number_format: NumberFormat,
    /// Cell protection
    pub protection: Protection,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set font to italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    /// Set font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set font name
    pub fn font_name<S: Into<String>>(mut self, name: S) -> Self {
        self.font.name = name.into();
        self
    }

    /// Set font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Set fill color (solid fill)
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::Solid { color };
        self
    }

    /// Set all four borders
    pub fn border(mut self, style: BorderLineStyle, color: Color) -> Self {
        self.border = BorderStyle::all(style, color);
        self
    }

    /// Set a custom number format code
    pub fn number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = NumberFormat::Custom(format.into());
        self
    }

    /// Use a built-in number format; ids must be below 164
    pub fn builtin_number_format(mut self, id: u32) -> Self {
        self.number_format = NumberFormat::BuiltIn(id);
        self
    }

    /// Set horizontal alignment
    pub fn horizontal_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.alignment.horizontal = align;
        self
    }

    /// Set vertical alignment
    pub fn vertical_alignment(mut self, align: VerticalAlignment) -> Self {
        self.alignment.vertical = align;
        self
    }

    /// Enable text wrapping
    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.alignment.wrap_text = wrap;
        self
    }

    /// Set the locked flag (effective when the sheet is protected)
    pub fn locked(mut self, locked: bool) -> Self {
        self.protection.locked = locked;
        self
    }

    /// Hide formulas when the sheet is protected
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.protection.hidden = hidden;
        self
    }

    /// Canonical attribute set; logically identical styles normalize equal
    pub fn normalized(&self) -> Style {
        Style {
            font: self.font.normalized(),
            fill: self.fill.normalized(),
            border: self.border.normalized(),
            alignment: self.alignment.normalized(),
            number_format: self.number_format.normalized(),
            protection: self.protection,
        }
    }
}

/// Cell protection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Protection {
    /// Cell is locked (protected when sheet is protected)
    pub locked: bool,
    /// Formula is hidden when sheet is protected
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

//! Font style types

use std::io::Write;

use super::Color;
use crate::error::Result;
use crate::xml::XmlEmitter;

/// Default font family name
pub const DEFAULT_FONT_NAME: &str = "Calibri";
/// Default font size in points
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

/// Font style settings
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: String,
    /// Font size in points
    pub size: f64,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Underline style
    pub underline: Underline,
    /// Strikethrough
    pub strikethrough: bool,
    /// Font color
    pub color: Color,
    /// Superscript/subscript
    pub vertical_align: FontVerticalAlign,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: Underline::None,
            strikethrough: false,
            color: Color::Auto,
            vertical_align: FontVerticalAlign::Baseline,
        }
    }
}

impl FontStyle {
    /// Create a new default font
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set underline
    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = underline;
        self
    }

    /// Canonical form used for deduplication
    ///
    /// Blank names fall back to the default family, unusable sizes to 11pt.
    pub fn normalized(&self) -> Self {
        let name = self.name.trim();
        let size = if self.size.is_finite() && self.size > 0.0 {
            // only two decimal places are significant
            (self.size * 100.0).round() / 100.0
        } else {
            DEFAULT_FONT_SIZE
        };
        Self {
            name: if name.is_empty() {
                DEFAULT_FONT_NAME.to_string()
            } else {
                name.to_string()
            },
            size,
            color: self.color.normalized(),
            ..self.clone()
        }
    }

    /// Write one `<font>` record of the fonts sub-table
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.open_element("font")?;
        if self.bold {
            xml.empty_element("b", &[])?;
        }
        if self.italic {
            xml.empty_element("i", &[])?;
        }
        if self.strikethrough {
            xml.empty_element("strike", &[])?;
        }
        match self.underline {
            Underline::None => {}
            Underline::Single => xml.empty_element("u", &[])?,
            other => xml.empty_element("u", &[("val", other.as_str())])?,
        }
        match self.vertical_align {
            FontVerticalAlign::Baseline => {}
            FontVerticalAlign::Superscript => {
                xml.empty_element("vertAlign", &[("val", "superscript")])?
            }
            FontVerticalAlign::Subscript => xml.empty_element("vertAlign", &[("val", "subscript")])?,
        }

        xml.open_element("sz")?;
        xml.attribute_num("val", self.size)?;
        xml.close_element("sz")?;

        // automatic font color is the theme text color
        match self.color {
            Color::Auto => xml.empty_element("color", &[("theme", "1")])?,
            color => color.write_element(xml, "color")?,
        }

        xml.empty_element("name", &[("val", self.name.as_str())])?;
        xml.empty_element("family", &[("val", "2")])?;
        if self.name == DEFAULT_FONT_NAME {
            xml.empty_element("scheme", &[("val", "minor")])?;
        }
        xml.close_element("font")
    }
}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
        self.vertical_align.hash(state);
    }
}

impl Eq for FontStyle {}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    /// No underline
    #[default]
    None,
    /// Single underline
    Single,
    /// Double underline
    Double,
    /// Single accounting underline (extends to cell width)
    SingleAccounting,
    /// Double accounting underline
    DoubleAccounting,
}

impl Underline {
    fn as_str(self) -> &'static str {
        match self {
            Underline::None => "none",
            Underline::Single => "single",
            Underline::Double => "double",
            Underline::SingleAccounting => "singleAccounting",
            Underline::DoubleAccounting => "doubleAccounting",
        }
    }
}

/// Font vertical alignment (superscript/subscript)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontVerticalAlign {
    /// Normal baseline
    #[default]
    Baseline,
    /// Superscript
    Superscript,
    /// Subscript
    Subscript,
}

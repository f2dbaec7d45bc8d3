//! Text alignment types

use std::io::Write;

use crate::error::Result;
use crate::xml::XmlEmitter;

/// Rotation value meaning "stacked vertical text"
pub const VERTICAL_TEXT: i16 = 255;

/// Text alignment settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap text
    pub wrap_text: bool,
    /// Shrink to fit
    pub shrink_to_fit: bool,
    /// Indent level (0-250)
    pub indent: u8,
    /// Text rotation in degrees (-90 to 90, or [`VERTICAL_TEXT`])
    pub rotation: i16,
    /// Reading order
    pub reading_order: ReadingOrder,
}

impl Alignment {
    /// Create a new default alignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.horizontal = align;
        self
    }

    /// Set indent level
    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Set rotation angle
    pub fn with_rotation(mut self, degrees: i16) -> Self {
        self.rotation = degrees;
        self
    }

    /// Canonical form used for deduplication
    ///
    /// Out-of-range rotations are clamped, indent implies left alignment unless
    /// the text is already right or distributed, and shrink-to-fit is dropped
    /// where it has no effect (wrapped or fill-aligned text).
    pub fn normalized(&self) -> Self {
        let mut al = *self;
        if al.rotation != VERTICAL_TEXT {
            al.rotation = al.rotation.clamp(-90, 90);
        }
        al.indent = al.indent.min(250);
        if al.indent > 0
            && !matches!(
                al.horizontal,
                HorizontalAlignment::Left
                    | HorizontalAlignment::Right
                    | HorizontalAlignment::Distributed
            )
        {
            al.horizontal = HorizontalAlignment::Left;
        }
        if al.shrink_to_fit && (al.wrap_text || al.horizontal == HorizontalAlignment::Fill) {
            al.shrink_to_fit = false;
        }
        al
    }

    /// Whether any attribute differs from the default
    pub fn is_default(&self) -> bool {
        *self == Alignment::default()
    }

    /// Write the `<alignment>` child of an `<xf>` record
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.open_element("alignment")?;
        if self.horizontal != HorizontalAlignment::General {
            xml.attribute("horizontal", self.horizontal.as_str())?;
        }
        if self.vertical != VerticalAlignment::Bottom {
            xml.attribute("vertical", self.vertical.as_str())?;
        }
        if self.rotation != 0 {
            // negative angles are stored as 90 + |angle|
            let stored = if self.rotation < 0 {
                90 - self.rotation
            } else {
                self.rotation
            };
            xml.attribute_num("textRotation", stored)?;
        }
        if self.wrap_text {
            xml.attribute("wrapText", "1")?;
        }
        if self.indent != 0 {
            xml.attribute_num("indent", self.indent)?;
        }
        if self.shrink_to_fit {
            xml.attribute("shrinkToFit", "1")?;
        }
        match self.reading_order {
            ReadingOrder::ContextDependent => {}
            ReadingOrder::LeftToRight => xml.attribute("readingOrder", "1")?,
            ReadingOrder::RightToLeft => xml.attribute("readingOrder", "2")?,
        }
        xml.close_element("alignment")
    }
}

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// General alignment (text left, numbers right)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
    /// Fill (repeat content to fill cell width)
    Fill,
    /// Justify (stretch to fit width)
    Justify,
    /// Center across selection
    CenterContinuous,
    /// Distributed (like justify, but for East Asian text)
    Distributed,
}

impl HorizontalAlignment {
    fn as_str(self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Fill => "fill",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
            HorizontalAlignment::Distributed => "distributed",
        }
    }
}

/// Vertical alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned (default)
    #[default]
    Bottom,
    /// Justify
    Justify,
    /// Distributed
    Distributed,
}

impl VerticalAlignment {
    fn as_str(self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Distributed => "distributed",
        }
    }
}

/// Reading order for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadingOrder {
    /// Context dependent
    #[default]
    ContextDependent,
    /// Left to right
    LeftToRight,
    /// Right to left
    RightToLeft,
}

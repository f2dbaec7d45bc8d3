//! Fill/background style types

use std::io::Write;

use super::Color;
use crate::error::Result;
use crate::xml::XmlEmitter;

/// Fill style for cell background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    /// No fill (transparent)
    #[default]
    None,

    /// Solid color fill
    Solid { color: Color },

    /// Pattern fill
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    /// Create a solid fill with the given color
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    /// Create a pattern fill
    pub fn pattern(pattern: PatternType, foreground: Color, background: Color) -> Self {
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        }
    }

    /// Check if this is a "no fill"
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }

    /// Canonical form used for deduplication
    ///
    /// Every visible fill becomes a `Pattern`. A solid fill is a solid pattern
    /// with an automatic background; a pattern of `None` that still carries a
    /// color is promoted to a solid pattern in that color; a pattern of `None`
    /// without colors is no fill at all.
    pub fn normalized(&self) -> Self {
        match *self {
            FillStyle::None => FillStyle::None,
            FillStyle::Solid { color } => FillStyle::Pattern {
                pattern: PatternType::Solid,
                foreground: color.normalized(),
                background: Color::Auto,
            },
            FillStyle::Pattern {
                pattern: PatternType::None,
                foreground,
                background,
            } => {
                let color = if foreground.is_auto() {
                    background
                } else {
                    foreground
                };
                if color.is_auto() {
                    FillStyle::None
                } else {
                    FillStyle::Pattern {
                        pattern: PatternType::Solid,
                        foreground: color.normalized(),
                        background: Color::Auto,
                    }
                }
            }
            FillStyle::Pattern {
                pattern,
                foreground,
                background,
            } => FillStyle::Pattern {
                pattern,
                foreground: foreground.normalized(),
                background: background.normalized(),
            },
        }
    }

    /// Write one `<fill>` record of the fills sub-table
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.open_element("fill")?;
        xml.open_element("patternFill")?;
        match self.normalized() {
            FillStyle::Pattern {
                pattern,
                foreground,
                background,
            } => {
                xml.attribute("patternType", pattern.as_str())?;
                if !(foreground.is_auto() && background.is_auto()) {
                    if !foreground.is_auto() {
                        foreground.write_element(xml, "fgColor")?;
                    }
                    match background {
                        Color::Auto => xml.empty_element("bgColor", &[("indexed", "64")])?,
                        other => other.write_element(xml, "bgColor")?,
                    }
                }
            }
            _ => xml.attribute("patternType", "none")?,
        }
        xml.close_element("patternFill")?;
        xml.close_element("fill")
    }
}

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    /// No pattern
    #[default]
    None,
    /// Solid (100% foreground)
    Solid,
    /// 50% gray
    MediumGray,
    /// 75% gray
    DarkGray,
    /// 25% gray
    LightGray,
    /// Horizontal stripe
    DarkHorizontal,
    /// Vertical stripe
    DarkVertical,
    /// Diagonal stripe (down)
    DarkDown,
    /// Diagonal stripe (up)
    DarkUp,
    /// Grid
    DarkGrid,
    /// Trellis
    DarkTrellis,
    /// Thin horizontal stripe
    LightHorizontal,
    /// Thin vertical stripe
    LightVertical,
    /// Thin diagonal stripe (down)
    LightDown,
    /// Thin diagonal stripe (up)
    LightUp,
    /// Thin grid
    LightGrid,
    /// Thin trellis
    LightTrellis,
    /// 12.5% gray
    Gray125,
    /// 6.25% gray
    Gray0625,
}

impl PatternType {
    /// Attribute value for `patternType`
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::None => "none",
            PatternType::Solid => "solid",
            PatternType::MediumGray => "mediumGray",
            PatternType::DarkGray => "darkGray",
            PatternType::LightGray => "lightGray",
            PatternType::DarkHorizontal => "darkHorizontal",
            PatternType::DarkVertical => "darkVertical",
            PatternType::DarkDown => "darkDown",
            PatternType::DarkUp => "darkUp",
            PatternType::DarkGrid => "darkGrid",
            PatternType::DarkTrellis => "darkTrellis",
            PatternType::LightHorizontal => "lightHorizontal",
            PatternType::LightVertical => "lightVertical",
            PatternType::LightDown => "lightDown",
            PatternType::LightUp => "lightUp",
            PatternType::LightGrid => "lightGrid",
            PatternType::LightTrellis => "lightTrellis",
            PatternType::Gray125 => "gray125",
            PatternType::Gray0625 => "gray0625",
        }
    }
}

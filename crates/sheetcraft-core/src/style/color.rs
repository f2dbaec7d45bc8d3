//! Color representation

use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::xml::XmlEmitter;

/// Color used by fonts, fills, borders and sheet tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (opaque)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with tint
    Theme {
        /// Theme color index (0-9)
        index: u8,
        /// Tint as a percentage (-100 to 100)
        tint: i8,
    },

    /// Indexed color (legacy palette)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: i8) -> Self {
        Color::Theme { index, tint }
    }

    /// Create from a hex string (`#RRGGBB`, `RRGGBB` or `AARRGGBB`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            })
            .map(Color::normalized),
            _ => None,
        }
    }

    /// Canonical form: opaque ARGB collapses to RGB, tint is clamped
    pub fn normalized(self) -> Self {
        match self {
            Color::Argb { a: 0xFF, r, g, b } => Color::Rgb { r, g, b },
            Color::Theme { index, tint } => Color::Theme {
                index,
                tint: tint.clamp(-100, 100),
            },
            other => other,
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    /// ARGB hex string as written to `rgb` attributes, if this is an explicit color
    pub fn to_argb_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("FF{r:02X}{g:02X}{b:02X}")),
            Color::Argb { a, r, g, b } => Some(format!("{a:02X}{r:02X}{g:02X}{b:02X}")),
            _ => None,
        }
    }

    /// Write the color attributes onto the element opened last
    ///
    /// `Auto` is written as `auto="1"`.
    pub(crate) fn write_attributes<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        match self {
            Color::Auto => xml.attribute("auto", "1"),
            Color::Rgb { .. } | Color::Argb { .. } => {
                xml.attribute("rgb", &self.to_argb_hex().unwrap_or_default())
            }
            Color::Theme { index, tint } => {
                xml.attribute_num("theme", index)?;
                if *tint != 0 {
                    xml.attribute_num("tint", *tint as f64 / 100.0)?;
                }
                Ok(())
            }
            Color::Indexed(i) => xml.attribute_num("indexed", i),
        }
    }

    /// Write `<tag .../>` for this color
    pub(crate) fn write_element<W: Write>(&self, xml: &mut XmlEmitter<W>, tag: &str) -> Result<()> {
        xml.open_element(tag)?;
        self.write_attributes(xml)?;
        xml.close_element(tag)
    }

    // Common colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{r:02X}{g:02X}{b:02X}"),
            Color::Argb { a, r, g, b } => write!(f, "#{a:02X}{r:02X}{g:02X}{b:02X}"),
            Color::Theme { index, tint } => write!(f, "theme({index}, {tint}%)"),
            Color::Indexed(i) => write!(f, "indexed({i})"),
        }
    }
}

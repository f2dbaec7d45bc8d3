//! Border style types

use std::io::Write;

use super::Color;
use crate::error::Result;
use crate::xml::XmlEmitter;

/// Border style for a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    /// Left border
    pub left: Option<BorderEdge>,
    /// Right border
    pub right: Option<BorderEdge>,
    /// Top border
    pub top: Option<BorderEdge>,
    /// Bottom border
    pub bottom: Option<BorderEdge>,
    /// Diagonal border
    pub diagonal: Option<BorderEdge>,
    /// Diagonal border direction
    pub diagonal_direction: DiagonalDirection,
}

impl BorderStyle {
    /// Create a new border style with no borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Same edge on all four sides
    pub fn all(style: BorderLineStyle, color: Color) -> Self {
        let edge = Some(BorderEdge::new(style, color));
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
            ..Self::default()
        }
    }

    /// Set the bottom border
    pub fn with_bottom(mut self, style: BorderLineStyle, color: Color) -> Self {
        self.bottom = Some(BorderEdge::new(style, color));
        self
    }

    /// Set the diagonal border and its direction
    pub fn with_diagonal(
        mut self,
        style: BorderLineStyle,
        color: Color,
        direction: DiagonalDirection,
    ) -> Self {
        self.diagonal = Some(BorderEdge::new(style, color));
        self.diagonal_direction = direction;
        self
    }

    /// Check if all borders are empty
    pub fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.top.is_none()
            && self.bottom.is_none()
            && self.diagonal.is_none()
    }

    /// Canonical form used for deduplication
    ///
    /// Edges with a `None` line style are removed. A diagonal direction with no
    /// diagonal edge gets a thin automatic edge; a diagonal edge with no
    /// direction is removed since it can never be drawn.
    pub fn normalized(&self) -> Self {
        let clean = |edge: Option<BorderEdge>| {
            edge.filter(|e| e.style != BorderLineStyle::None)
                .map(BorderEdge::normalized)
        };

        let mut diagonal = clean(self.diagonal);
        let direction = self.diagonal_direction;
        match (direction, diagonal) {
            (DiagonalDirection::None, Some(_)) => diagonal = None,
            (DiagonalDirection::None, None) => {}
            (_, None) => diagonal = Some(BorderEdge::new(BorderLineStyle::Thin, Color::Auto)),
            (_, Some(_)) => {}
        }

        Self {
            left: clean(self.left),
            right: clean(self.right),
            top: clean(self.top),
            bottom: clean(self.bottom),
            diagonal,
            diagonal_direction: direction,
        }
    }

    /// Write one `<border>` record of the borders sub-table
    pub(crate) fn write_xml<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.open_element("border")?;
        match self.diagonal_direction {
            DiagonalDirection::None => {}
            DiagonalDirection::Up => xml.attribute("diagonalUp", "1")?,
            DiagonalDirection::Down => xml.attribute("diagonalDown", "1")?,
            DiagonalDirection::Both => {
                xml.attribute("diagonalUp", "1")?;
                xml.attribute("diagonalDown", "1")?;
            }
        }
        write_edge(xml, "left", self.left.as_ref())?;
        write_edge(xml, "right", self.right.as_ref())?;
        write_edge(xml, "top", self.top.as_ref())?;
        write_edge(xml, "bottom", self.bottom.as_ref())?;
        write_edge(xml, "diagonal", self.diagonal.as_ref())?;
        xml.close_element("border")
    }
}

fn write_edge<W: Write>(xml: &mut XmlEmitter<W>, tag: &str, edge: Option<&BorderEdge>) -> Result<()> {
    xml.open_element(tag)?;
    if let Some(edge) = edge {
        if let Some(style) = edge.style.as_str() {
            xml.attribute("style", style)?;
            edge.color.write_element(xml, "color")?;
        }
    }
    xml.close_element(tag)
}

/// A single border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    /// Line style
    pub style: BorderLineStyle,
    /// Line color
    pub color: Color,
}

impl BorderEdge {
    /// Create a new border edge
    pub fn new(style: BorderLineStyle, color: Color) -> Self {
        Self { style, color }
    }

    /// Create a thin automatic-color border
    pub fn thin() -> Self {
        Self::new(BorderLineStyle::Thin, Color::Auto)
    }

    fn normalized(self) -> Self {
        Self {
            style: self.style,
            color: self.color.normalized(),
        }
    }
}

/// Border line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderLineStyle {
    /// No border
    #[default]
    None,
    /// Thin line
    Thin,
    /// Medium line
    Medium,
    /// Thick line
    Thick,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Double line
    Double,
    /// Hair line (very thin)
    Hair,
    /// Medium dashed
    MediumDashed,
    /// Dash-dot
    DashDot,
    /// Medium dash-dot
    MediumDashDot,
    /// Dash-dot-dot
    DashDotDot,
    /// Medium dash-dot-dot
    MediumDashDotDot,
    /// Slant dash-dot
    SlantDashDot,
}

impl BorderLineStyle {
    fn as_str(self) -> Option<&'static str> {
        Some(match self {
            BorderLineStyle::None => return None,
            BorderLineStyle::Thin => "thin",
            BorderLineStyle::Medium => "medium",
            BorderLineStyle::Thick => "thick",
            BorderLineStyle::Dashed => "dashed",
            BorderLineStyle::Dotted => "dotted",
            BorderLineStyle::Double => "double",
            BorderLineStyle::Hair => "hair",
            BorderLineStyle::MediumDashed => "mediumDashed",
            BorderLineStyle::DashDot => "dashDot",
            BorderLineStyle::MediumDashDot => "mediumDashDot",
            BorderLineStyle::DashDotDot => "dashDotDot",
            BorderLineStyle::MediumDashDotDot => "mediumDashDotDot",
            BorderLineStyle::SlantDashDot => "slantDashDot",
        })
    }
}

/// Diagonal border direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagonalDirection {
    /// No diagonal
    #[default]
    None,
    /// Diagonal from top-left to bottom-right
    Down,
    /// Diagonal from bottom-left to top-right
    Up,
    /// Both diagonals
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_none_edges_removed() {
        let mut border = BorderStyle::new();
        border.left = Some(BorderEdge::new(BorderLineStyle::None, Color::RED));
        assert_eq!(border.normalized(), BorderStyle::default());
    }

    #[test]
    fn test_diagonal_resolution() {
        let direction_only = BorderStyle {
            diagonal_direction: DiagonalDirection::Up,
            ..BorderStyle::default()
        };
        assert_eq!(
            direction_only.normalized().diagonal,
            Some(BorderEdge::thin())
        );

        let edge_only = BorderStyle {
            diagonal: Some(BorderEdge::thin()),
            ..BorderStyle::default()
        };
        assert!(edge_only.normalized().is_empty());
    }

    #[test]
    fn test_write_xml() {
        let border = BorderStyle::new().with_bottom(BorderLineStyle::Double, Color::Auto);
        let mut xml = XmlEmitter::new(Vec::new());
        BorderStyle::default().write_xml(&mut xml).unwrap();
        border.write_xml(&mut xml).unwrap();
        let out = String::from_utf8(xml.close().unwrap()).unwrap();
        assert_eq!(
            out,
            concat!(
                "<border><left/><right/><top/><bottom/><diagonal/></border>",
                r#"<border><left/><right/><top/><bottom style="double"><color auto="1"/></bottom><diagonal/></border>"#
            )
        );
    }
}

//! Workbook-wide format table
//!
//! Formats are deduplicated on their normalized attribute set, so two
//! requests that differ only in spelling share one index. Index 0 is always
//! the default format.
//!
//! The table has two phases. While open it accepts new formats. The first
//! call to [`FormatTable::emit`] (or [`FormatTable::seal`]) freezes it and
//! builds the font, fill, border and number-format sub-tables that the
//! combined `<xf>` records point into; from then on
//! [`FormatTable::get_or_create`] fails with [`Error::SealedFormatTable`].

use std::hash::Hash;
use std::io::Write;

use ahash::AHashMap;

use super::{
    BorderStyle, Color, FillStyle, FontStyle, NumberFormat, PatternType, Protection, Style,
    FIRST_CUSTOM_NUM_FMT_ID,
};
use crate::error::{Error, Result};
use crate::xml::XmlEmitter;
use crate::SPREADSHEETML_NS;

/// Handle to a format in a workbook's [`FormatTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FormatId(u32);

impl FormatId {
    /// The workbook default format
    pub const DEFAULT: FormatId = FormatId(0);

    #[cfg(test)]
    pub(crate) fn new(index: u32) -> Self {
        FormatId(index)
    }

    /// Index of the `<xf>` record this handle refers to
    pub fn index(self) -> u32 {
        self.0
    }

    /// Whether this is the default format
    pub fn is_default(self) -> bool {
        self.0 == 0
    }
}

/// Deduplicating format table with an open → sealed lifecycle
#[derive(Debug)]
pub struct FormatTable {
    /// Normalized formats; position is the xf index
    formats: Vec<Style>,
    /// Fast lookup for deduplication
    index_map: AHashMap<Style, u32>,
    /// Present once sealed
    sealed: Option<SubTables>,
}

impl FormatTable {
    /// Create a table holding only the default format
    pub fn new() -> Self {
        let default = Style::default().normalized();
        let mut index_map = AHashMap::with_capacity(64);
        index_map.insert(default.clone(), 0);
        Self {
            formats: vec![default],
            index_map,
            sealed: None,
        }
    }

    /// Get or create the format for `style`
    ///
    /// Fails with [`Error::SealedFormatTable`] once the table has been sealed,
    /// and with [`Error::InvalidNumberFormat`] for a built-in id at or past
    /// the first custom id.
    pub fn get_or_create(&mut self, style: &Style) -> Result<FormatId> {
        if self.sealed.is_some() {
            return Err(Error::SealedFormatTable);
        }

        let style = style.normalized();
        if let NumberFormat::BuiltIn(id) = style.number_format {
            if id >= FIRST_CUSTOM_NUM_FMT_ID {
                return Err(Error::InvalidNumberFormat(id));
            }
        }
        if let Some(&idx) = self.index_map.get(&style) {
            return Ok(FormatId(idx));
        }

        let idx = self.formats.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.formats.push(style);
        Ok(FormatId(idx))
    }

    /// The normalized attributes behind a handle
    pub fn get(&self, id: FormatId) -> Option<&Style> {
        self.formats.get(id.0 as usize)
    }

    /// Whether `id` refers to a format in this table
    pub fn contains(&self, id: FormatId) -> bool {
        (id.0 as usize) < self.formats.len()
    }

    /// Number of formats, default included
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Always false; the default format is always present
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Whether the table has been sealed
    pub fn is_sealed(&self) -> bool {
        self.sealed.is_some()
    }

    /// Freeze the table and build its sub-tables; repeated calls are no-ops
    pub fn seal(&mut self) {
        seal_tables(&self.formats, &mut self.sealed);
    }

    /// Write the `styles.xml` part, sealing the table first
    pub fn emit<W: Write>(&mut self, xml: &mut XmlEmitter<W>) -> Result<()> {
        let tables = seal_tables(&self.formats, &mut self.sealed);

        xml.declaration()?;
        xml.open_element("styleSheet")?;
        xml.attribute("xmlns", SPREADSHEETML_NS)?;

        if !tables.num_fmts.is_empty() {
            xml.open_element("numFmts")?;
            xml.attribute_num("count", tables.num_fmts.len())?;
            for (id, code) in &tables.num_fmts {
                xml.open_element("numFmt")?;
                xml.attribute_num("numFmtId", id)?;
                xml.attribute("formatCode", code)?;
                xml.close_element("numFmt")?;
            }
            xml.close_element("numFmts")?;
        }

        xml.open_element("fonts")?;
        xml.attribute_num("count", tables.fonts.len())?;
        for font in &tables.fonts {
            font.write_xml(xml)?;
        }
        xml.close_element("fonts")?;

        xml.open_element("fills")?;
        xml.attribute_num("count", tables.fills.len())?;
        for fill in &tables.fills {
            fill.write_xml(xml)?;
        }
        xml.close_element("fills")?;

        xml.open_element("borders")?;
        xml.attribute_num("count", tables.borders.len())?;
        for border in &tables.borders {
            border.write_xml(xml)?;
        }
        xml.close_element("borders")?;

        xml.open_element("cellStyleXfs")?;
        xml.attribute("count", "1")?;
        xml.empty_element(
            "xf",
            &[
                ("numFmtId", "0"),
                ("fontId", "0"),
                ("fillId", "0"),
                ("borderId", "0"),
            ],
        )?;
        xml.close_element("cellStyleXfs")?;

        xml.open_element("cellXfs")?;
        xml.attribute_num("count", tables.xfs.len())?;
        for (style, ids) in self.formats.iter().zip(&tables.xfs) {
            write_xf(xml, style, ids)?;
        }
        xml.close_element("cellXfs")?;

        xml.open_element("cellStyles")?;
        xml.attribute("count", "1")?;
        xml.empty_element(
            "cellStyle",
            &[("name", "Normal"), ("xfId", "0"), ("builtinId", "0")],
        )?;
        xml.close_element("cellStyles")?;

        xml.empty_element("dxfs", &[("count", "0")])?;
        xml.empty_element(
            "tableStyles",
            &[
                ("count", "0"),
                ("defaultTableStyle", "TableStyleMedium9"),
                ("defaultPivotStyle", "PivotStyleLight16"),
            ],
        )?;

        xml.close_element("styleSheet")
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the sub-tables on first use; later calls return the frozen ones
fn seal_tables<'a>(formats: &[Style], sealed: &'a mut Option<SubTables>) -> &'a SubTables {
    sealed.get_or_insert_with(|| {
        let tables = SubTables::build(formats);
        log::debug!(
            "sealed format table: {} formats, {} fonts, {} fills, {} borders, {} custom number formats",
            formats.len(),
            tables.fonts.len(),
            tables.fills.len(),
            tables.borders.len(),
            tables.num_fmts.len()
        );
        tables
    })
}

/// Sub-table indices referenced by one `<xf>` record
#[derive(Debug, Clone, Copy)]
struct XfIds {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
}

/// Component tables, fully populated before any `<xf>` is written
#[derive(Debug)]
struct SubTables {
    num_fmts: Vec<(u32, String)>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    xfs: Vec<XfIds>,
}

impl SubTables {
    fn build(formats: &[Style]) -> Self {
        let mut fonts = Pool::seeded([FontStyle::default().normalized()]);
        // consumers require "none" and "gray125" as fills 0 and 1
        let mut fills = Pool::seeded([
            FillStyle::None,
            FillStyle::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
        ]);
        let mut borders = Pool::seeded([BorderStyle::default()]);
        let mut num_fmt_ids: AHashMap<String, u32> = AHashMap::new();
        let mut num_fmts = Vec::new();

        let xfs = formats
            .iter()
            .map(|style| {
                let num_fmt_id = match &style.number_format {
                    NumberFormat::Custom(code) => *num_fmt_ids.entry(code.clone()).or_insert_with(|| {
                        let id = FIRST_CUSTOM_NUM_FMT_ID + num_fmts.len() as u32;
                        num_fmts.push((id, code.clone()));
                        id
                    }),
                    other => other.builtin_id().unwrap_or(0),
                };
                XfIds {
                    num_fmt_id,
                    font_id: fonts.intern(&style.font),
                    fill_id: fills.intern(&style.fill),
                    border_id: borders.intern(&style.border),
                }
            })
            .collect();

        Self {
            num_fmts,
            fonts: fonts.items,
            fills: fills.items,
            borders: borders.items,
            xfs,
        }
    }
}

/// Insertion-ordered dedup list for one sub-table
struct Pool<T> {
    items: Vec<T>,
    index: AHashMap<T, u32>,
}

impl<T: Clone + Eq + Hash> Pool<T> {
    fn seeded<const N: usize>(seed: [T; N]) -> Self {
        let mut pool = Pool {
            items: Vec::new(),
            index: AHashMap::new(),
        };
        for item in seed {
            pool.intern(&item);
        }
        pool
    }

    fn intern(&mut self, item: &T) -> u32 {
        if let Some(&idx) = self.index.get(item) {
            return idx;
        }
        let idx = self.items.len() as u32;
        self.items.push(item.clone());
        self.index.insert(item.clone(), idx);
        idx
    }
}

fn write_xf<W: Write>(xml: &mut XmlEmitter<W>, style: &Style, ids: &XfIds) -> Result<()> {
    xml.open_element("xf")?;
    xml.attribute_num("numFmtId", ids.num_fmt_id)?;
    xml.attribute_num("fontId", ids.font_id)?;
    xml.attribute_num("fillId", ids.fill_id)?;
    xml.attribute_num("borderId", ids.border_id)?;
    xml.attribute("xfId", "0")?;

    let custom_alignment = !style.alignment.is_default();
    let custom_protection = style.protection != Protection::default();
    if ids.num_fmt_id != 0 {
        xml.attribute("applyNumberFormat", "1")?;
    }
    if ids.font_id != 0 {
        xml.attribute("applyFont", "1")?;
    }
    if ids.fill_id != 0 {
        xml.attribute("applyFill", "1")?;
    }
    if ids.border_id != 0 {
        xml.attribute("applyBorder", "1")?;
    }
    if custom_alignment {
        xml.attribute("applyAlignment", "1")?;
    }
    if custom_protection {
        xml.attribute("applyProtection", "1")?;
    }

    if custom_alignment {
        style.alignment.write_xml(xml)?;
    }
    if custom_protection {
        xml.open_element("protection")?;
        if !style.protection.locked {
            xml.attribute("locked", "0")?;
        }
        if style.protection.hidden {
            xml.attribute("hidden", "1")?;
        }
        xml.close_element("protection")?;
    }
    xml.close_element("xf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderLineStyle, HorizontalAlignment};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn render(table: &mut FormatTable) -> String {
        let mut xml = XmlEmitter::new(Vec::new());
        table.emit(&mut xml).unwrap();
        String::from_utf8(xml.close().unwrap()).unwrap()
    }

    #[test]
    fn test_builtin_id_past_reserved_range_rejected() {
        let mut table = FormatTable::new();
        let text = table
            .get_or_create(&Style::new().builtin_number_format(NumberFormat::ID_TEXT))
            .unwrap();
        let custom = table.get_or_create(&Style::new().number_format("0.0")).unwrap();
        assert_eq!((text.index(), custom.index()), (1, 2));
        for id in [164, 300] {
            let err = table
                .get_or_create(&Style::new().builtin_number_format(id))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidNumberFormat(bad) if bad == id));
            assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        }
        assert_eq!(table.len(), 3);

        let xml = render(&mut table);
        assert!(xml.contains(r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="0.0"/></numFmts>"#));
        assert_eq!(xml.matches(r#"numFmtId="164""#).count(), 2, "{xml}");
    }

    #[test]
    fn test_default_format() {
        let mut table = FormatTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_or_create(&Style::default()).unwrap(), FormatId::DEFAULT);
        assert_eq!(table.get(FormatId::DEFAULT), Some(&Style::default().normalized()));
    }

    #[test]
    fn test_deduplication() {
        let mut table = FormatTable::new();

        let bold = table.get_or_create(&Style::new().bold(true)).unwrap();
        let bold_again = table.get_or_create(&Style::new().bold(true)).unwrap();
        let italic = table.get_or_create(&Style::new().italic(true)).unwrap();

        assert_eq!(bold, bold_again);
        assert_ne!(bold, italic);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_equivalent_spellings_collapse() {
        let mut table = FormatTable::new();
        let a = table
            .get_or_create(&Style::new().fill_color(Color::RED).number_format("0.00"))
            .unwrap();
        let b = table
            .get_or_create(&Style {
                fill: FillStyle::pattern(PatternType::Solid, Color::RED, Color::Auto),
                number_format: NumberFormat::BuiltIn(2),
                ..Style::default()
            })
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sealed_after_emit() {
        let mut table = FormatTable::new();
        let bold = table.get_or_create(&Style::new().bold(true)).unwrap();
        render(&mut table);

        assert!(table.is_sealed());
        assert!(matches!(
            table.get_or_create(&Style::new().bold(true)),
            Err(Error::SealedFormatTable)
        ));
        assert!(matches!(
            table.get_or_create(&Style::new().italic(true)),
            Err(Error::SealedFormatTable)
        ));
        assert!(table.contains(bold));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_emit_is_repeatable() {
        let mut table = FormatTable::new();
        table.get_or_create(&Style::new().number_format("0.000%")).unwrap();
        let first = render(&mut table);
        let second = render(&mut table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_emit_default_only() {
        let mut table = FormatTable::new();
        let xml = render(&mut table);
        assert!(xml.contains(r#"<fonts count="1">"#));
        assert!(xml.contains(r#"<fills count="2">"#));
        assert!(xml.contains(r#"<borders count="1">"#));
        assert!(xml.contains(
            r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#
        ));
        assert!(!xml.contains("<numFmts"));
    }

    #[test]
    fn test_emit_sub_tables() {
        let mut table = FormatTable::new();
        table
            .get_or_create(
                &Style::new()
                    .bold(true)
                    .fill_color(Color::YELLOW)
                    .border(BorderLineStyle::Thin, Color::Auto)
                    .number_format("0.0")
                    .horizontal_alignment(HorizontalAlignment::Center)
                    .locked(false),
            )
            .unwrap();
        // shares the bold font and the custom number format
        table
            .get_or_create(&Style::new().bold(true).number_format("0.0"))
            .unwrap();

        let xml = render(&mut table);
        assert!(xml.contains(
            r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="0.0"/></numFmts>"#
        ));
        assert!(xml.contains(r#"<fonts count="2">"#));
        assert!(xml.contains(r#"<fills count="3">"#));
        assert!(xml.contains(r#"<borders count="2">"#));
        assert!(xml.contains(concat!(
            r#"<xf numFmtId="164" fontId="1" fillId="2" borderId="1" xfId="0" applyNumberFormat="1" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1" applyProtection="1">"#,
            r#"<alignment horizontal="center"/><protection locked="0"/></xf>"#
        )));
        assert!(xml.contains(
            r#"<xf numFmtId="164" fontId="1" fillId="0" borderId="0" xfId="0" applyNumberFormat="1" applyFont="1"/>"#
        ));
    }

    fn style_strategy() -> impl Strategy<Value = Style> {
        (
            any::<bool>(),
            any::<bool>(),
            prop_oneof![Just(None), Just(Some(Color::RED)), Just(Some(Color::BLUE))],
            prop_oneof![
                Just(NumberFormat::General),
                Just(NumberFormat::Custom("General".into())),
                Just(NumberFormat::BuiltIn(2)),
                Just(NumberFormat::Custom("0.00".into())),
                Just(NumberFormat::Custom("0.0".into())),
            ],
            any::<bool>(),
        )
            .prop_map(|(bold, italic, fill, number_format, solid_as_pattern)| {
                let fill = match (fill, solid_as_pattern) {
                    (None, _) => FillStyle::None,
                    (Some(c), false) => FillStyle::solid(c),
                    (Some(c), true) => FillStyle::pattern(PatternType::Solid, c, Color::Auto),
                };
                Style {
                    fill,
                    number_format,
                    ..Style::new().bold(bold).italic(italic)
                }
            })
    }

    proptest! {
        #[test]
        fn prop_same_normal_form_same_index(a in style_strategy(), b in style_strategy()) {
            let mut table = FormatTable::new();
            let ia = table.get_or_create(&a).unwrap();
            let ib = table.get_or_create(&b).unwrap();
            prop_assert_eq!(ia == ib, a.normalized() == b.normalized());
        }
    }
}

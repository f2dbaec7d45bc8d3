//! Package-level parts: `xl/workbook.xml` and `docProps/*`

use std::io::Write;

use sheetcraft_core::{Workbook, XmlEmitter, RELATIONSHIPS_NS, SPREADSHEETML_NS};

use crate::error::XlsxResult;

const EXTENDED_PROPERTIES_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const DOC_PROPS_VTYPES_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";
const CORE_PROPERTIES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

/// Write `xl/workbook.xml`; sheet `i` refers to workbook relationship `rId{i+1}`
pub(crate) fn write_workbook<W: Write>(workbook: &Workbook, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
    xml.declaration()?;
    xml.open_element("workbook")?;
    xml.attribute("xmlns", SPREADSHEETML_NS)?;
    xml.attribute("xmlns:r", RELATIONSHIPS_NS)?;

    if workbook.settings().date_1904 {
        xml.empty_element("workbookPr", &[("date1904", "1")])?;
    } else {
        xml.empty_element("workbookPr", &[])?;
    }

    xml.open_element("bookViews")?;
    xml.open_element("workbookView")?;
    let active = workbook.active_sheet();
    if active > 0 {
        let first_visible = workbook
            .worksheets()
            .position(|ws| !ws.is_hidden())
            .unwrap_or(0);
        if first_visible > 0 {
            xml.attribute_num("firstSheet", first_visible)?;
        }
        xml.attribute_num("activeTab", active)?;
    }
    xml.close_element("workbookView")?;
    xml.close_element("bookViews")?;

    xml.open_element("sheets")?;
    for (i, sheet) in workbook.worksheets().enumerate() {
        xml.open_element("sheet")?;
        xml.attribute("name", sheet.name())?;
        xml.attribute_num("sheetId", i + 1)?;
        if sheet.is_hidden() {
            xml.attribute("state", "hidden")?;
        }
        xml.attribute("r:id", &format!("rId{}", i + 1))?;
        xml.close_element("sheet")?;
    }
    xml.close_element("sheets")?;

    write_defined_names(workbook, xml)?;

    xml.empty_element("calcPr", &[("calcId", "124519"), ("fullCalcOnLoad", "1")])?;
    xml.close_element("workbook")?;
    Ok(())
}

/// Defined names sorted by name, then by the sheet they are local to
fn write_defined_names<W: Write>(workbook: &Workbook, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
    if workbook.defined_names().is_empty() {
        return Ok(());
    }

    let mut names: Vec<_> = workbook
        .defined_names()
        .iter()
        .map(|name| (name, workbook.defined_name_scope(name)))
        .collect();
    names.sort_by(|(a, a_scope), (b, b_scope)| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a_scope.cmp(b_scope))
    });

    xml.open_element("definedNames")?;
    for (name, scope) in names {
        xml.open_element("definedName")?;
        xml.attribute("name", &name.name)?;
        if let Some(index) = scope {
            xml.attribute_num("localSheetId", index)?;
        }
        xml.text(&name.formula)?;
        xml.close_element("definedName")?;
    }
    xml.close_element("definedNames")?;
    Ok(())
}

/// Write `docProps/app.xml`
pub(crate) fn write_app_properties<W: Write>(workbook: &Workbook, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
    let props = workbook.properties();
    let count = workbook.sheet_count();

    xml.declaration()?;
    xml.open_element("Properties")?;
    xml.attribute("xmlns", EXTENDED_PROPERTIES_NS)?;
    xml.attribute("xmlns:vt", DOC_PROPS_VTYPES_NS)?;
    xml.text_element("Application", "Microsoft Excel")?;
    xml.text_element("DocSecurity", "0")?;
    xml.text_element("ScaleCrop", "false")?;

    xml.open_element("HeadingPairs")?;
    xml.open_element("vt:vector")?;
    xml.attribute("size", "2")?;
    xml.attribute("baseType", "variant")?;
    xml.open_element("vt:variant")?;
    xml.text_element("vt:lpstr", "Worksheets")?;
    xml.close_element("vt:variant")?;
    xml.open_element("vt:variant")?;
    xml.text_element("vt:i4", &count.to_string())?;
    xml.close_element("vt:variant")?;
    xml.close_element("vt:vector")?;
    xml.close_element("HeadingPairs")?;

    xml.open_element("TitlesOfParts")?;
    xml.open_element("vt:vector")?;
    xml.attribute_num("size", count)?;
    xml.attribute("baseType", "lpstr")?;
    for sheet in workbook.worksheets() {
        xml.text_element("vt:lpstr", sheet.name())?;
    }
    xml.close_element("vt:vector")?;
    xml.close_element("TitlesOfParts")?;

    if let Some(manager) = &props.manager {
        xml.text_element("Manager", manager)?;
    }
    xml.text_element("Company", props.company.as_deref().unwrap_or(""))?;
    xml.text_element("LinksUpToDate", "false")?;
    xml.text_element("SharedDoc", "false")?;
    xml.text_element("HyperlinksChanged", "false")?;
    xml.text_element("AppVersion", "12.0000")?;
    xml.close_element("Properties")?;
    Ok(())
}

/// Write `docProps/core.xml`
pub(crate) fn write_core_properties<W: Write>(workbook: &Workbook, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
    let props = workbook.properties();
    let created = workbook.created().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    xml.declaration()?;
    xml.open_element("cp:coreProperties")?;
    xml.attribute("xmlns:cp", CORE_PROPERTIES_NS)?;
    xml.attribute("xmlns:dc", "http://purl.org/dc/elements/1.1/")?;
    xml.attribute("xmlns:dcterms", "http://purl.org/dc/terms/")?;
    xml.attribute("xmlns:dcmitype", "http://purl.org/dc/dcmitype/")?;
    xml.attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")?;

    let optional = [
        ("dc:title", &props.title),
        ("dc:subject", &props.subject),
        ("dc:creator", &props.author),
        ("cp:keywords", &props.keywords),
        ("dc:description", &props.comments),
    ];
    for (tag, value) in optional {
        if let Some(value) = value {
            xml.text_element(tag, value)?;
        }
    }
    xml.text_element("cp:lastModifiedBy", props.author.as_deref().unwrap_or(""))?;

    for tag in ["dcterms:created", "dcterms:modified"] {
        xml.open_element(tag)?;
        xml.attribute("xsi:type", "dcterms:W3CDTF")?;
        xml.text(&created)?;
        xml.close_element(tag)?;
    }

    if let Some(category) = &props.category {
        xml.text_element("cp:category", category)?;
    }
    if let Some(status) = &props.status {
        xml.text_element("cp:contentStatus", status)?;
    }
    xml.close_element("cp:coreProperties")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sheetcraft_core::DocProperties;

    fn render<F>(workbook: &Workbook, f: F) -> String
    where
        F: FnOnce(&Workbook, &mut XmlEmitter<Vec<u8>>) -> XlsxResult<()>,
    {
        let mut xml = XmlEmitter::new(Vec::new());
        f(workbook, &mut xml).unwrap();
        String::from_utf8(xml.close().unwrap()).unwrap()
    }

    #[test]
    fn test_workbook_part() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Summary").unwrap();
        wb.add_worksheet("Data").unwrap().hide();
        wb.add_worksheet("Notes").unwrap();
        wb.set_active_sheet(2).unwrap();
        wb.define_name("Rate", "=Summary!$B$1").unwrap();
        wb.define_name("Notes!Area", "=Notes!$A$1:$C$9").unwrap();

        let out = render(&wb, write_workbook);
        assert!(out.contains(r#"<workbookView activeTab="2"/>"#));
        assert!(out.contains(concat!(
            r#"<sheets><sheet name="Summary" sheetId="1" r:id="rId1"/>"#,
            r#"<sheet name="Data" sheetId="2" state="hidden" r:id="rId2"/>"#,
            r#"<sheet name="Notes" sheetId="3" r:id="rId3"/></sheets>"#
        )));
        assert!(out.contains(concat!(
            "<definedNames>",
            r#"<definedName name="Area" localSheetId="2">Notes!$A$1:$C$9</definedName>"#,
            r#"<definedName name="Rate">Summary!$B$1</definedName>"#,
            "</definedNames>"
        )));
        assert!(out.ends_with(r#"<calcPr calcId="124519" fullCalcOnLoad="1"/></workbook>"#));
    }

    #[test]
    fn test_local_name_follows_moved_sheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet("A").unwrap();
        wb.add_worksheet("B").unwrap();
        wb.define_name("B!Local", "=B!$A$1").unwrap();
        wb.move_worksheet(1, 0).unwrap();

        let out = render(&wb, write_workbook);
        assert!(out.contains(r#"<definedName name="Local" localSheetId="0">B!$A$1</definedName>"#));
    }

    #[test]
    fn test_core_properties() {
        let mut wb = Workbook::new();
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
        wb.set_properties(
            DocProperties::new()
                .with_title("Q1 & Q2")
                .with_author("Finance")
                .with_status("Draft")
                .with_created(created),
        );

        let out = render(&wb, write_core_properties);
        assert!(out.contains("<dc:title>Q1 &amp; Q2</dc:title><dc:creator>Finance</dc:creator>"));
        assert!(out.contains(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">2024-01-15T08:30:00Z</dcterms:created>"#
        ));
        assert!(out.contains("<cp:contentStatus>Draft</cp:contentStatus>"));
    }

    #[test]
    fn test_app_properties_lists_sheets() {
        let mut wb = Workbook::new();
        wb.add_worksheet("One").unwrap();
        wb.add_worksheet("Two").unwrap();

        let out = render(&wb, write_app_properties);
        assert!(out.contains("<vt:i4>2</vt:i4>"));
        assert!(out.contains(
            r#"<vt:vector size="2" baseType="lpstr"><vt:lpstr>One</vt:lpstr><vt:lpstr>Two</vt:lpstr></vt:vector>"#
        ));
    }
}

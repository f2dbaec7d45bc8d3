//! End-to-end tests: build a workbook, save it, re-open the archive and
//! parse the parts back with quick-xml.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetcraft::prelude::*;

fn read_parts(path: &Path) -> BTreeMap<String, String> {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut parts = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        parts.insert(file.name().to_string(), content);
    }
    parts
}

/// A `<c>` element: reference, type, style and value
#[derive(Debug, Default, Clone, PartialEq)]
struct ParsedCell {
    reference: String,
    kind: Option<String>,
    style: Option<String>,
    value: Option<String>,
}

fn cell_from_attributes(e: &BytesStart<'_>) -> ParsedCell {
    let mut cell = ParsedCell::default();
    for attr in e.attributes() {
        let attr = attr.unwrap();
        let value = attr.unescape_value().unwrap().into_owned();
        match attr.key.as_ref() {
            b"r" => cell.reference = value,
            b"t" => cell.kind = Some(value),
            b"s" => cell.style = Some(value),
            _ => {}
        }
    }
    cell
}

fn parse_cells(sheet_xml: &str) -> Vec<ParsedCell> {
    let mut reader = Reader::from_str(sheet_xml);
    let mut cells = Vec::new();
    let mut current: Option<ParsedCell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Empty(e) if e.name().as_ref() == b"c" => cells.push(cell_from_attributes(&e)),
            Event::Start(e) if e.name().as_ref() == b"c" => current = Some(cell_from_attributes(&e)),
            Event::Start(e) if e.name().as_ref() == b"v" => in_value = true,
            Event::Text(t) if in_value => {
                if let Some(cell) = current.as_mut() {
                    cell.value = Some(t.unescape().unwrap().into_owned());
                }
            }
            Event::End(e) if e.name().as_ref() == b"v" => in_value = false,
            Event::End(e) if e.name().as_ref() == b"c" => cells.extend(current.take()),
            Event::Eof => break,
            _ => {}
        }
    }
    cells
}

fn count_elements(xml: &str, name: &[u8]) -> usize {
    let mut reader = Reader::from_str(xml);
    let mut count = 0;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == name => count += 1,
            Event::Eof => return count,
            _ => {}
        }
    }
}

#[test]
fn test_total_and_bold_number_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut wb = Workbook::new();
    let bold = wb.create_format(&Style::new().bold(true)).unwrap();
    let mut sheet = wb.add_worksheet("Report").unwrap();
    sheet.write_cell(0, 0, "Total", None).unwrap();
    sheet.write_cell(0, 1, 42.5, Some(bold)).unwrap();
    wb.close(&path).unwrap();

    let parts = read_parts(&path);

    // One shared string, "Total" at index 0
    let sst = &parts["xl/sharedStrings.xml"];
    assert_eq!(count_elements(sst, b"si"), 1);
    assert!(sst.contains("<si><t>Total</t></si>"));

    // Default record plus exactly one non-default record
    let styles = &parts["xl/styles.xml"];
    let xfs_start = styles.find("<cellXfs").unwrap();
    let xfs_end = styles.find("</cellXfs>").unwrap();
    assert_eq!(count_elements(&styles[xfs_start..xfs_end + 10], b"xf"), 2);

    let cells = parse_cells(&parts["xl/worksheets/sheet1.xml"]);
    assert_eq!(
        cells,
        vec![
            ParsedCell {
                reference: "A1".into(),
                kind: Some("s".into()),
                style: None,
                value: Some("0".into()),
            },
            ParsedCell {
                reference: "B1".into(),
                kind: None,
                style: Some("1".into()),
                value: Some("42.5".into()),
            },
        ]
    );
}

#[test]
fn test_double_save_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");

    let mut wb = Workbook::new();
    let money = wb
        .create_format(&Style::new().number_format("#,##0.00 \"EUR\""))
        .unwrap();
    let mut sheet = wb.add_worksheet("Ledger").unwrap();
    for row in 0..20u32 {
        sheet.write_string(row, 0, &format!("item {}", row % 7), None).unwrap();
        sheet.write_number(row, 1, f64::from(row) * 9.99, Some(money)).unwrap();
    }
    sheet.merge_range(21, 0, 21, 1, "end", None).unwrap();
    let mut stream = wb
        .add_worksheet_with_mode("Stream", WriteMode::Streaming)
        .unwrap();
    for row in 0..100u32 {
        stream.write_number(row, 0, f64::from(row), None).unwrap();
    }

    wb.save(&first).unwrap();
    wb.save(&second).unwrap();

    let (a, b) = (read_parts(&first), read_parts(&second));
    for part in [
        "xl/sharedStrings.xml",
        "xl/styles.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
    ] {
        assert_eq!(a[part], b[part], "{part}");
    }
    assert_eq!(a, b);
}

#[test]
fn test_streaming_rows_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.xlsx");

    let settings = WorkbookSettings::new()
        .with_constant_memory(true)
        .with_temp_dir(dir.path());
    let mut wb = Workbook::with_settings(settings);
    let mut sheet = wb.add_worksheet("Stream").unwrap();
    for row in [0, 1, 2] {
        sheet.write_number(row, 0, f64::from(row), None).unwrap();
    }
    let err = sheet.write_number(1, 0, 9.0, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OrderingViolation);
    sheet.write_number(5, 0, 5.0, None).unwrap();
    wb.save(&path).unwrap();

    let cells = parse_cells(&read_parts(&path)["xl/worksheets/sheet1.xml"]);
    let refs: Vec<&str> = cells.iter().map(|c| c.reference.as_str()).collect();
    assert_eq!(refs, ["A1", "A2", "A3", "A6"]);
    assert_eq!(cells[1].value.as_deref(), Some("1"));
}

#[test]
fn test_merged_ranges_read_back() {
    let mut wb = Workbook::new();
    let mut sheet = wb.add_worksheet("Merged").unwrap();
    sheet.merge_range(0, 0, 1, 1, "first", None).unwrap();
    let err = sheet.merge_range(1, 1, 2, 2, "overlap", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OverlapViolation);
    sheet.merge_range(2, 2, 3, 3, 7.0, None).unwrap();

    let bytes = wb.save_to_writer(Cursor::new(Vec::new())).unwrap().into_inner();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    let cells = parse_cells(&xml);
    let value_at = |r: &str| cells.iter().find(|c| c.reference == r).cloned().unwrap();
    assert_eq!(value_at("A1").value.as_deref(), Some("0"));
    assert_eq!(value_at("C3").value.as_deref(), Some("7"));
    for blank in ["B1", "A2", "B2", "D3", "C4", "D4"] {
        assert_eq!(value_at(blank).value, None, "{blank}");
    }
    assert_eq!(count_elements(&xml, b"mergeCell"), 2);
}

#[test]
fn test_dates_and_formulas() {
    let mut wb = Workbook::new();
    let date = wb
        .create_format(&Style::new().number_format("yyyy-mm-dd"))
        .unwrap();
    let mut sheet = wb.add_worksheet("Dates").unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    sheet.write_cell(0, 0, day, Some(date)).unwrap();
    sheet.write_formula(0, 1, "=A1+1", Some(45307.0), Some(date)).unwrap();
    sheet.write_boolean(0, 2, false, None).unwrap();

    let bytes = wb.save_to_writer(Cursor::new(Vec::new())).unwrap().into_inner();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    assert!(xml.contains(r#"<c r="A1" s="1"><v>45306</v></c>"#), "{xml}");
    assert!(xml.contains(r#"<c r="B1" s="1"><f>A1+1</f><v>45307</v></c>"#));
    assert!(xml.contains(r#"<c r="C1" t="b"><v>0</v></c>"#));
}

#[test]
fn test_save_rejects_other_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut wb = Workbook::new();
    wb.add_worksheet("Data").unwrap();

    let err = wb.save(dir.path().join("data.csv")).unwrap_err();
    assert!(matches!(err, XlsxError::InvalidFormat(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_streaming_temp_storage_is_released() {
    let temp = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let settings = WorkbookSettings::new()
        .with_constant_memory(true)
        .with_temp_dir(temp.path());
    let mut wb = Workbook::with_settings(settings);
    let mut sheet = wb.add_worksheet("Big").unwrap();
    for row in 0..1_000u32 {
        sheet.write_number(row, 0, f64::from(row), None).unwrap();
    }
    wb.close(out.path().join("big.xlsx")).unwrap();

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

//! XLSX writer
//!
//! Parts are written in a fixed order: content types, root relationships,
//! the workbook and its relationships, each worksheet (followed by its own
//! relationships when it has external links), shared strings, styles and the
//! two document property parts. Any failure aborts the walk; the archive is
//! then incomplete and must be discarded.

mod content_types;
mod parts;
mod relationships;
mod sink;

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use sheetcraft_core::{InvalidCharPolicy, Workbook, XmlEmitter};

use crate::error::XlsxResult;

pub use content_types::{ContentTypes, CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES, CT_WORKBOOK};
pub use relationships::{
    Relationships, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES, REL_HYPERLINK, REL_OFFICE_DOCUMENT,
};
pub use sink::{PartSink, ZipPartSink};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    ///
    /// The archive is built in a temporary file next to `path` and moved into
    /// place only after every part was written, so a failed save never leaves
    /// a truncated file behind.
    pub fn write_file<P: AsRef<Path>>(workbook: &mut Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = tempfile::NamedTempFile::new_in(dir)?;
        let file = temp.reopen()?;
        let writer = Self::write(workbook, BufWriter::new(file))?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        log::debug!("saved workbook to {}", path.display());
        Ok(())
    }

    /// Write a workbook to a writer, returning the writer when done
    pub fn write<W: Write + Seek>(workbook: &mut Workbook, writer: W) -> XlsxResult<W> {
        let settings = workbook.settings();
        let mut sink = ZipPartSink::new(
            writer,
            settings.compression,
            settings.large_file,
            workbook.created(),
        );
        Self::write_parts(workbook, &mut sink)?;
        sink.finish()
    }

    /// Write every part of the package to `sink`
    ///
    /// A workbook without worksheets gets an empty `Sheet1` first.
    pub fn write_parts<S: PartSink + ?Sized>(workbook: &mut Workbook, sink: &mut S) -> XlsxResult<()> {
        if workbook.sheet_count() == 0 {
            workbook.add_worksheet_auto()?;
        }
        let policy = workbook.settings().invalid_chars;
        let sheet_count = workbook.sheet_count();
        let has_strings = !workbook.strings().is_empty();

        // [Content_Types].xml
        let mut types = ContentTypes::new();
        types.add_override("/xl/workbook.xml", CT_WORKBOOK);
        for i in 0..sheet_count {
            types.add_spreadsheetml(&format!("/xl/worksheets/sheet{}.xml", i + 1), "worksheet");
        }
        types.add_spreadsheetml("/xl/styles.xml", "styles");
        if has_strings {
            types.add_spreadsheetml("/xl/sharedStrings.xml", "sharedStrings");
        }
        types.add_override("/docProps/core.xml", CT_CORE_PROPERTIES);
        types.add_override("/docProps/app.xml", CT_EXTENDED_PROPERTIES);
        write_part(sink, "[Content_Types].xml", policy, |xml| types.write(xml))?;

        // _rels/.rels
        let mut root = Relationships::new();
        root.add(REL_OFFICE_DOCUMENT, "xl/workbook.xml");
        root.add(REL_CORE_PROPERTIES, "docProps/core.xml");
        root.add(REL_EXTENDED_PROPERTIES, "docProps/app.xml");
        write_part(sink, "_rels/.rels", policy, |xml| root.write(xml))?;

        // xl/workbook.xml and xl/_rels/workbook.xml.rels
        write_part(sink, "xl/workbook.xml", policy, |xml| {
            parts::write_workbook(workbook, xml)
        })?;
        let mut book = Relationships::new();
        for i in 0..sheet_count {
            book.add_office("worksheet", &format!("worksheets/sheet{}.xml", i + 1));
        }
        book.add_office("styles", "styles.xml");
        if has_strings {
            book.add_office("sharedStrings", "sharedStrings.xml");
        }
        write_part(sink, "xl/_rels/workbook.xml.rels", policy, |xml| book.write(xml))?;

        // xl/worksheets/sheetN.xml
        for i in 0..sheet_count {
            let path = format!("xl/worksheets/sheet{}.xml", i + 1);
            write_part(sink, &path, policy, |xml| Ok(workbook.emit_worksheet(i, xml)?))?;

            let mut links = Relationships::new();
            if let Some(sheet) = workbook.worksheet(i) {
                for url in sheet.external_links() {
                    links.add_external(REL_HYPERLINK, url);
                }
            }
            if !links.is_empty() {
                let path = format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1);
                write_part(sink, &path, policy, |xml| links.write(xml))?;
            }
        }

        // xl/sharedStrings.xml, xl/styles.xml
        if has_strings {
            write_part(sink, "xl/sharedStrings.xml", policy, |xml| {
                Ok(workbook.emit_shared_strings(xml)?)
            })?;
        }
        write_part(sink, "xl/styles.xml", policy, |xml| Ok(workbook.emit_styles(xml)?))?;

        // docProps
        write_part(sink, "docProps/app.xml", policy, |xml| {
            parts::write_app_properties(workbook, xml)
        })?;
        write_part(sink, "docProps/core.xml", policy, |xml| {
            parts::write_core_properties(workbook, xml)
        })?;

        log::debug!("wrote package with {} worksheets", sheet_count);
        Ok(())
    }
}

/// Start `path` in the sink and run `body` against an emitter over it
fn write_part<S, F>(sink: &mut S, path: &str, policy: InvalidCharPolicy, body: F) -> XlsxResult<()>
where
    S: PartSink + ?Sized,
    F: FnOnce(&mut XmlEmitter<&mut dyn Write>) -> XlsxResult<()>,
{
    sink.start_part(path)?;
    let mut xml = XmlEmitter::with_policy(sink.part_writer(), policy);
    body(&mut xml)?;
    xml.close()?.flush()?;
    log::debug!("wrote part {}", path);
    Ok(())
}

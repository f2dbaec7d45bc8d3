//! Relationship parts (`*.rels`)

use std::io::Write;

use sheetcraft_core::XmlEmitter;

use crate::error::XlsxResult;

const PACKAGE_RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// `officeDocument` relationship from the package root to the workbook
pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
/// Core (Dublin Core) document properties
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
/// External hyperlink target of a worksheet cell
pub const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
/// Application document properties
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

/// Relationships declared by one part
///
/// Identifiers are `rId1`, `rId2`, ... in the order relationships are added.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship to another part of the package, returning its id
    pub fn add(&mut self, kind: &str, target: &str) -> String {
        self.push(kind, target, false)
    }

    /// Add a relationship to a resource outside the package
    pub fn add_external(&mut self, kind: &str, target: &str) -> String {
        self.push(kind, target, true)
    }

    /// Add an `officeDocument/2006/relationships/{name}` relationship
    pub fn add_office(&mut self, name: &str, target: &str) -> String {
        self.push(&format!("{OFFICE_DOCUMENT}/{name}"), target, false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, kind: &str, target: &str, external: bool) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            kind: kind.to_string(),
            target: target.to_string(),
            external,
        });
        id
    }

    /// Write the `<Relationships>` part
    pub fn write<W: Write>(&self, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
        xml.declaration()?;
        xml.open_element("Relationships")?;
        xml.attribute("xmlns", PACKAGE_RELATIONSHIPS_NS)?;
        for rel in &self.entries {
            xml.open_element("Relationship")?;
            xml.attribute("Id", &rel.id)?;
            xml.attribute("Type", &rel.kind)?;
            xml.attribute("Target", &rel.target)?;
            if rel.external {
                xml.attribute("TargetMode", "External")?;
            }
            xml.close_element("Relationship")?;
        }
        xml.close_element("Relationships")?;
        Ok(())
    }
}

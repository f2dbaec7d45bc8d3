//! `[Content_Types].xml`

use std::io::Write;

use sheetcraft_core::XmlEmitter;

use crate::error::XlsxResult;

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const SPREADSHEETML: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml";

/// Content type of the workbook part
pub const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
/// Content type of the core properties part
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
/// Content type of the application properties part
pub const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Maps part extensions and part names to content types
#[derive(Debug, Clone)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTypes {
    /// Start with the defaults every package needs (`rels` and `xml`)
    pub fn new() -> Self {
        Self {
            defaults: vec![
                (
                    "rels".into(),
                    "application/vnd.openxmlformats-package.relationships+xml".into(),
                ),
                ("xml".into(), "application/xml".into()),
            ],
            overrides: Vec::new(),
        }
    }

    /// Register the content type of one part, e.g. `/xl/workbook.xml`
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides
            .push((part_name.to_string(), content_type.to_string()));
    }

    /// Register a SpreadsheetML part; `kind` is e.g. `worksheet` or `styles`
    pub fn add_spreadsheetml(&mut self, part_name: &str, kind: &str) {
        self.add_override(part_name, &format!("{SPREADSHEETML}.{kind}+xml"));
    }

    /// Content type registered for a part
    pub fn get(&self, part_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(name, _)| name == part_name)
            .map(|(_, ct)| ct.as_str())
    }

    /// Write the `<Types>` part
    pub fn write<W: Write>(&self, xml: &mut XmlEmitter<W>) -> XlsxResult<()> {
        xml.declaration()?;
        xml.open_element("Types")?;
        xml.attribute("xmlns", CONTENT_TYPES_NS)?;
        for (extension, content_type) in &self.defaults {
            xml.empty_element(
                "Default",
                &[("Extension", extension.as_str()), ("ContentType", content_type.as_str())],
            )?;
        }
        for (part_name, content_type) in &self.overrides {
            xml.empty_element(
                "Override",
                &[("PartName", part_name.as_str()), ("ContentType", content_type.as_str())],
            )?;
        }
        xml.close_element("Types")?;
        Ok(())
    }
}

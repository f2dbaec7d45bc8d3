//! Workbook type - the main document structure

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::grid::WriteMode;
use crate::named_range::DefinedName;
use crate::properties::DocProperties;
use crate::strings::StringTable;
use crate::style::{FormatId, FormatTable, Style};
use crate::worksheet::{Worksheet, WorksheetMut};
use crate::xml::{is_xml_char, InvalidCharPolicy, XmlEmitter};
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
///
/// The workbook owns its worksheets together with the shared string and
/// format tables. Worksheets are written through [`WorksheetMut`] handles;
/// the package itself is produced by the `sheetcraft-xlsx` crate, which
/// calls the `emit_*` methods below.
#[derive(Debug)]
pub struct Workbook {
    /// Worksheets in tab order
    worksheets: Vec<Worksheet>,
    /// Shared strings
    strings: StringTable,
    /// Cell formats
    formats: FormatTable,
    /// Workbook settings
    settings: WorkbookSettings,
    /// Document metadata
    properties: DocProperties,
    /// Defined names in definition order
    defined_names: Vec<DefinedName>,
    /// Active sheet index
    active_sheet: usize,
    /// Construction time, used when no creation time is set
    created: DateTime<Utc>,
}

impl Workbook {
    /// Create an empty workbook with default settings
    pub fn new() -> Self {
        Self::with_settings(WorkbookSettings::default())
    }

    /// Create an empty workbook with the given settings
    pub fn with_settings(settings: WorkbookSettings) -> Self {
        Self {
            worksheets: Vec::new(),
            strings: StringTable::new(),
            formats: FormatTable::new(),
            settings,
            properties: DocProperties::default(),
            defined_names: Vec::new(),
            active_sheet: 0,
            created: Utc::now(),
        }
    }

    /// Get workbook settings
    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    // ==================== Worksheets ====================

    /// Add a worksheet in the default write mode
    ///
    /// The default mode is streaming when
    /// [`WorkbookSettings::constant_memory`] is set, buffered otherwise.
    pub fn add_worksheet(&mut self, name: &str) -> Result<WorksheetMut<'_>> {
        let mode = if self.settings.constant_memory {
            WriteMode::Streaming
        } else {
            WriteMode::Buffered
        };
        self.add_worksheet_with_mode(name, mode)
    }

    /// Add a worksheet named `SheetN`, picking the first free `N`
    pub fn add_worksheet_auto(&mut self) -> Result<WorksheetMut<'_>> {
        let name = self.generate_sheet_name();
        self.add_worksheet(&name)
    }

    /// Add a worksheet with an explicit write mode
    pub fn add_worksheet_with_mode(&mut self, name: &str, mode: WriteMode) -> Result<WorksheetMut<'_>> {
        self.validate_sheet_name(name, None)?;

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(
            name.to_string(),
            mode,
            self.settings.temp_dir.clone(),
            self.settings.invalid_chars,
        ));
        log::debug!("added worksheet {} '{}' ({:?})", index, name, mode);

        let count = self.worksheets.len();
        self.handle(index).ok_or(Error::SheetOutOfBounds(index, count))
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a write handle for a worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<WorksheetMut<'_>> {
        self.handle(index)
    }

    /// Get a worksheet by name (case-insensitive)
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get(i))
    }

    /// Get a write handle for a worksheet by name (case-insensitive)
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<WorksheetMut<'_>> {
        let index = self.sheet_index(name)?;
        self.handle(index)
    }

    /// Get the index of a worksheet by name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let lower = name.to_lowercase();
        self.worksheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == lower)
    }

    /// Iterate over all worksheets in tab order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Rename a worksheet; names local to it follow the new name
    pub fn rename_worksheet(&mut self, index: usize, name: &str) -> Result<()> {
        let count = self.worksheets.len();
        if index >= count {
            return Err(Error::SheetOutOfBounds(index, count));
        }
        self.validate_sheet_name(name, Some(index))?;

        let old = self.worksheets[index].name().to_lowercase();
        for defined in &mut self.defined_names {
            if let Some(sheet) = defined.sheet.as_mut() {
                if sheet.to_lowercase() == old {
                    *sheet = name.to_string();
                }
            }
        }
        log::debug!("renamed worksheet {} to '{}'", index, name);
        self.worksheets[index].set_name(name.to_string());
        Ok(())
    }

    /// Move a worksheet to a new position
    pub fn move_worksheet(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(from, self.worksheets.len()));
        }
        if to >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(to, self.worksheets.len()));
        }

        let worksheet = self.worksheets.remove(from);
        self.worksheets.insert(to, worksheet);

        // Adjust active sheet if needed
        if self.active_sheet == from {
            self.active_sheet = to;
        } else if from < self.active_sheet && to >= self.active_sheet {
            self.active_sheet = self.active_sheet.saturating_sub(1);
        } else if from > self.active_sheet && to <= self.active_sheet {
            self.active_sheet = self.active_sheet.saturating_add(1);
        }

        Ok(())
    }

    /// Get the active sheet index
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Set the active sheet index; a hidden sheet is made visible
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        let count = self.worksheets.len();
        let mut sheet = self
            .handle(index)
            .ok_or(Error::SheetOutOfBounds(index, count))?;
        sheet.activate();
        Ok(())
    }

    // ==================== Formats and strings ====================

    /// Intern a cell format, returning its handle
    ///
    /// Styles that normalize to the same attributes share one handle. Fails
    /// with [`Error::SealedFormatTable`] once the styles part was emitted.
    pub fn create_format(&mut self, style: &Style) -> Result<FormatId> {
        self.formats.get_or_create(style)
    }

    /// Look up the style behind a handle
    pub fn format(&self, id: FormatId) -> Option<&Style> {
        self.formats.get(id)
    }

    /// The shared string table
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// The format table
    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    // ==================== Metadata ====================

    /// Set the document properties
    pub fn set_properties(&mut self, properties: DocProperties) {
        self.properties = properties;
    }

    /// Get the document properties
    pub fn properties(&self) -> &DocProperties {
        &self.properties
    }

    /// Creation timestamp written to the core properties part
    pub fn created(&self) -> DateTime<Utc> {
        self.properties.created.unwrap_or(self.created)
    }

    /// Define a name; `Sheet1!Name` makes it local to `Sheet1`
    ///
    /// # Example
    /// ```
    /// use sheetcraft_core::Workbook;
    ///
    /// let mut wb = Workbook::new();
    /// wb.add_worksheet("Sheet1").unwrap();
    /// wb.define_name("TaxRate", "=Sheet1!$B$1").unwrap();
    /// wb.define_name("Sheet1!Local", "=Sheet1!$A$1:$A$9").unwrap();
    /// ```
    pub fn define_name(&mut self, name: &str, formula: &str) -> Result<()> {
        let mut defined = DefinedName::parse(name, formula)?;
        if let Some(sheet) = defined.sheet.take() {
            let index = self
                .sheet_index(&sheet)
                .ok_or(Error::SheetNotFound(sheet))?;
            defined.sheet = Some(self.worksheets[index].name().to_string());
        }
        if self.defined_names.iter().any(|d| d.same_key(&defined)) {
            return Err(Error::InvalidName(format!("'{name}' is already defined")));
        }
        self.defined_names.push(defined);
        Ok(())
    }

    /// Defined names in definition order
    pub fn defined_names(&self) -> &[DefinedName] {
        &self.defined_names
    }

    /// Current index of the sheet a local name belongs to
    pub fn defined_name_scope(&self, name: &DefinedName) -> Option<usize> {
        name.sheet.as_deref().and_then(|sheet| self.sheet_index(sheet))
    }

    // ==================== Emit ====================

    /// Write worksheet `index` as a SpreadsheetML part
    ///
    /// Streaming worksheets flush their trailing row first. Emitting twice
    /// without writes in between produces identical bytes.
    pub fn emit_worksheet<W: Write>(&mut self, index: usize, xml: &mut XmlEmitter<W>) -> Result<()> {
        let count = self.worksheets.len();
        let active = index == self.active_sheet;
        let sheet = self
            .worksheets
            .get_mut(index)
            .ok_or(Error::SheetOutOfBounds(index, count))?;
        sheet.emit(xml, active)?;
        log::debug!("emitted worksheet '{}'", sheet.name());
        Ok(())
    }

    /// Write the shared strings part
    pub fn emit_shared_strings<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        self.strings.emit(xml)?;
        log::debug!(
            "emitted {} shared strings ({} references)",
            self.strings.unique_count(),
            self.strings.total_count()
        );
        Ok(())
    }

    /// Write the styles part; the format table is sealed afterwards
    pub fn emit_styles<W: Write>(&mut self, xml: &mut XmlEmitter<W>) -> Result<()> {
        self.formats.emit(xml)?;
        log::debug!("emitted {} cell formats", self.formats.len());
        Ok(())
    }

    fn handle(&mut self, index: usize) -> Option<WorksheetMut<'_>> {
        let Workbook {
            worksheets,
            strings,
            formats,
            settings,
            active_sheet,
            ..
        } = self;
        let sheet = worksheets.get_mut(index)?;
        Some(WorksheetMut {
            sheet,
            index,
            active_sheet,
            strings,
            formats: &*formats,
            policy: settings.invalid_chars,
            date_1904: settings.date_1904,
        })
    }

    /// Validate a sheet name, optionally excluding a sheet from duplicate check
    fn validate_sheet_name(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        // Check length
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        // Check for invalid characters
        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        for c in INVALID_CHARS {
            if name.contains(*c) {
                return Err(Error::InvalidSheetName(format!(
                    "Sheet name cannot contain '{}'",
                    c
                )));
            }
        }
        if let Some(c) = name.chars().find(|c| c.is_control() || !is_xml_char(*c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain U+{:04X}",
                u32::from(c)
            )));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(Error::InvalidSheetName(
                "Sheet name cannot start or end with an apostrophe".into(),
            ));
        }

        // Check for duplicate names (case-insensitive)
        let name_lower = name.to_lowercase();
        for (i, ws) in self.worksheets.iter().enumerate() {
            if Some(i) != exclude_index && ws.name().to_lowercase() == name_lower {
                return Err(Error::DuplicateSheetName(name.into()));
            }
        }

        Ok(())
    }

    /// Generate a unique sheet name
    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.validate_sheet_name(&name, None).is_ok() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// ZIP compression for package parts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Deflate every part
    #[default]
    Deflate,
    /// Store parts uncompressed
    Store,
}

/// Workbook-level settings
#[derive(Debug, Clone, Default)]
pub struct WorkbookSettings {
    /// New worksheets stream their rows to temporary storage
    pub constant_memory: bool,
    /// Directory for streaming row storage (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
    /// What to do with characters XML cannot carry
    pub invalid_chars: InvalidCharPolicy,
    /// Compression of package parts
    pub compression: Compression,
    /// Write ZIP64 entries so parts may exceed 4 GiB
    pub large_file: bool,
    /// Date system: false = 1900 (Windows), true = 1904 (Mac)
    pub date_1904: bool,
}

impl WorkbookSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constant_memory(mut self, enabled: bool) -> Self {
        self.constant_memory = enabled;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_invalid_chars(mut self, policy: InvalidCharPolicy) -> Self {
        self.invalid_chars = policy;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_large_file(mut self, enabled: bool) -> Self {
        self.large_file = enabled;
        self
    }

    pub fn with_date_1904(mut self, enabled: bool) -> Self {
        self.date_1904 = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_workbook_is_empty() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 0);
        assert!(wb.strings().is_empty());
        assert_eq!(wb.formats().len(), 1);
    }

    #[test]
    fn test_add_worksheets() {
        let mut wb = Workbook::new();
        assert_eq!(wb.add_worksheet("Data").unwrap().index(), 0);
        assert_eq!(wb.add_worksheet_auto().unwrap().name(), "Sheet2");
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Data");
        assert_eq!(wb.sheet_index("data"), Some(0));
    }

    #[test]
    fn test_duplicate_name() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Sheet1").unwrap();
        let err = wb.add_worksheet("SHEET1").unwrap_err();
        assert!(matches!(err, Error::DuplicateSheetName(_)));
        assert_eq!(wb.sheet_count(), 1);
    }

    #[test]
    fn test_invalid_names() {
        let mut wb = Workbook::new();
        let long = "x".repeat(32);
        for bad in ["", "a:b", "a/b", "what?", "[x]", "'quoted'", long.as_str()] {
            let err = wb.add_worksheet(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName, "{bad:?}");
        }
        assert!(wb.add_worksheet(&"y".repeat(31)).is_ok());
        assert!(wb.add_worksheet("Résumé 2024").is_ok());
    }

    #[test]
    fn test_constant_memory_default_mode() {
        let mut wb = Workbook::with_settings(WorkbookSettings::new().with_constant_memory(true));
        let sheet = wb.add_worksheet("Big").unwrap();
        assert_eq!(sheet.write_mode(), WriteMode::Streaming);
        let sheet = wb.add_worksheet_with_mode("Small", WriteMode::Buffered).unwrap();
        assert_eq!(sheet.write_mode(), WriteMode::Buffered);
    }

    #[test]
    fn test_sheet_name_control_chars_rejected() {
        let mut wb = Workbook::new();
        wb.add_worksheet("a").unwrap();
        for name in ["a\u{1}", "tab\there", "\u{FFFE}"] {
            let err = wb.add_worksheet(name).unwrap_err();
            assert!(matches!(err, Error::InvalidSheetName(_)), "{name:?}");
            assert_eq!(err.kind(), crate::ErrorKind::InvalidName);
        }
        assert!(wb.rename_worksheet(0, "b\u{7}").is_err());
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "a");
    }

    #[test]
    fn test_rename_worksheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Data").unwrap();
        wb.add_worksheet("Notes").unwrap();
        wb.define_name("Data!Region", "=Data!$A$1:$A$9").unwrap();

        // same name with different case is allowed for the sheet itself
        wb.rename_worksheet(0, "DATA").unwrap();
        wb.rename_worksheet(0, "Sales").unwrap();
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sales");
        assert_eq!(wb.defined_names()[0].sheet.as_deref(), Some("Sales"));

        let err = wb.rename_worksheet(0, "notes").unwrap_err();
        assert!(matches!(err, Error::DuplicateSheetName(_)));
        assert!(matches!(
            wb.rename_worksheet(5, "Other"),
            Err(Error::SheetOutOfBounds(5, 2))
        ));
    }

    #[test]
    fn test_move_worksheet_tracks_active() {
        let mut wb = Workbook::new();
        for name in ["A", "B", "C"] {
            wb.add_worksheet(name).unwrap();
        }
        wb.set_active_sheet(1).unwrap();
        wb.move_worksheet(0, 2).unwrap();
        assert_eq!(wb.active_sheet(), 0);
        assert_eq!(wb.worksheet(0).unwrap().name(), "B");
        assert!(wb.set_active_sheet(3).is_err());
    }

    #[test]
    fn test_activate_unhides() {
        let mut wb = Workbook::new();
        wb.add_worksheet("A").unwrap();
        let mut sheet = wb.add_worksheet("B").unwrap();
        sheet.hide();
        assert!(sheet.is_hidden());
        sheet.activate();
        assert!(!wb.worksheet(1).unwrap().is_hidden());
        assert_eq!(wb.active_sheet(), 1);
    }

    #[test]
    fn test_define_name() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Sheet1").unwrap();
        wb.define_name("TaxRate", "=Sheet1!$B$1").unwrap();
        wb.define_name("sheet1!TaxRate", "=Sheet1!$B$2").unwrap();

        let err = wb.define_name("TAXRATE", "=1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
        assert!(matches!(
            wb.define_name("Missing!Rate", "=1"),
            Err(Error::SheetNotFound(_))
        ));

        let local = &wb.defined_names()[1];
        assert_eq!(local.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(wb.defined_name_scope(local), Some(0));
    }

    #[test]
    fn test_format_table_seals_on_emit() {
        let mut wb = Workbook::new();
        let bold = wb.create_format(&Style::new().bold(true)).unwrap();
        assert_eq!(wb.create_format(&Style::new().bold(true)).unwrap(), bold);

        let mut xml = XmlEmitter::new(Vec::new());
        wb.emit_styles(&mut xml).unwrap();
        let err = wb.create_format(&Style::new().italic(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SealedTableMutation);
        assert!(wb.format(bold).is_some());
    }

    #[test]
    fn test_created_override() {
        let mut wb = Workbook::new();
        let pinned = DateTime::parse_from_rfc3339("2024-01-15T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        wb.set_properties(DocProperties::new().with_title("Report").with_created(pinned));
        assert_eq!(wb.created(), pinned);
        assert_eq!(wb.properties().title.as_deref(), Some("Report"));
    }
}

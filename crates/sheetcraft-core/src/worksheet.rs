//! Worksheet type
//!
//! A [`Worksheet`] is owned by its [`Workbook`](crate::Workbook). Reading is
//! done through `&Worksheet`; writing goes through a [`WorksheetMut`] handle,
//! which borrows the worksheet together with the workbook's shared string and
//! format tables so text can be interned and formats validated as cells are
//! written.

use std::collections::BTreeMap;
use std::io::Write;
use std::ops::Deref;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::cell::{
    check_bounds, datetime_to_serial, normalize_formula, CellAddress, CellData, CellError,
    CellInput, CellRange, CellValue,
};
use crate::column::{ColumnOptions, Columns, DEFAULT_COLUMN_WIDTH};
use crate::error::{Error, Result};
use crate::grid::{Grid, WriteMode};
use crate::row::RowOptions;
use crate::strings::StringTable;
use crate::style::{Color, FormatId, FormatTable};
use crate::xml::{InvalidCharPolicy, XmlEmitter};
use crate::{MAX_COLS, MAX_ROWS, RELATIONSHIPS_NS, SPREADSHEETML_NS};

/// Longest hyperlink target a consumer accepts
pub const MAX_URL_LEN: usize = 2079;

/// Most hyperlinks a single worksheet may hold
pub const MAX_HYPERLINKS: usize = 65_530;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "ftps://", "mailto:", "file://"];

/// Where a hyperlink points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A URL outside the workbook; stored in the sheet's relationships part
    External(String),
    /// A location inside the workbook, e.g. `Sheet2!A1`
    Internal(String),
}

/// A hyperlink attached to one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// Cell carrying the link
    pub cell: CellAddress,
    /// Link target
    pub target: LinkTarget,
    /// Hover text
    pub tooltip: Option<String>,
}

impl Hyperlink {
    /// Parse a `write_url` target: a URL with a known scheme, or `internal:Location`
    pub fn parse_target(url: &str) -> Result<LinkTarget> {
        if url.chars().count() > MAX_URL_LEN {
            return Err(Error::InvalidUrl(format!(
                "target is longer than {MAX_URL_LEN} characters"
            )));
        }
        if let Some(location) = url.strip_prefix("internal:") {
            if location.is_empty() {
                return Err(Error::InvalidUrl("internal link without a location".into()));
            }
            return Ok(LinkTarget::Internal(location.to_string()));
        }
        let lower = url.to_ascii_lowercase();
        if URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) && url.len() > 7 {
            Ok(LinkTarget::External(url.to_string()))
        } else {
            Err(Error::InvalidUrl(format!("unsupported link target '{url}'")))
        }
    }
}

/// Frozen or split panes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panes {
    /// Rows above `row` and columns left of `col` stay in place
    Frozen { row: u32, col: u16 },
    /// Movable split; `y` in points, `x` in character widths
    Split { y: f64, x: f64 },
}

/// Sheet view state
#[derive(Debug, Clone, Default)]
struct SheetView {
    panes: Option<Panes>,
    selection: Option<CellRange>,
    zoom: Option<u16>,
    hide_gridlines: bool,
}

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage, buffered or streaming
    grid: Grid,
    /// Smallest rectangle holding every written cell
    dimension: Option<CellRange>,
    /// Column settings
    columns: Columns,
    /// Merged ranges, pairwise disjoint
    merged: Vec<CellRange>,
    /// Hyperlinks by cell, at most one per cell
    hyperlinks: BTreeMap<CellAddress, Hyperlink>,
    /// View settings
    view: SheetView,
    /// Tab color
    tab_color: Option<Color>,
    /// Sheet is hidden
    hidden: bool,
    /// Tab is selected
    selected: bool,
    /// Highest row outline level in use
    outline_rows: u8,
    /// Highest column outline level in use
    outline_cols: u8,
}

impl Worksheet {
    pub(crate) fn new(
        name: String,
        mode: WriteMode,
        temp_dir: Option<PathBuf>,
        policy: InvalidCharPolicy,
    ) -> Self {
        Self {
            name,
            grid: Grid::new(mode, temp_dir, policy),
            dimension: None,
            columns: Columns::default(),
            merged: Vec::new(),
            hyperlinks: BTreeMap::new(),
            view: SheetView::default(),
            tab_color: None,
            hidden: false,
            selected: false,
            outline_rows: 0,
            outline_cols: 0,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// How this worksheet accepts writes
    pub fn write_mode(&self) -> WriteMode {
        self.grid.mode()
    }

    /// Get a stored cell
    ///
    /// Streaming worksheets only retain the row being written, so cells in
    /// flushed rows are reported as absent.
    pub fn cell(&self, row: u32, col: u16) -> Option<&CellData> {
        self.grid.get(row, col)
    }

    /// Get a stored cell by A1 address
    pub fn cell_a1(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell(addr.row, addr.col))
    }

    /// Smallest range holding every written cell
    pub fn dimension(&self) -> Option<CellRange> {
        self.dimension
    }

    /// Merged ranges in the order they were added
    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged
    }

    /// Hyperlinks in row-major cell order
    pub fn hyperlinks(&self) -> impl Iterator<Item = &Hyperlink> {
        self.hyperlinks.values()
    }

    /// Hyperlink attached to a cell
    pub fn hyperlink(&self, row: u32, col: u16) -> Option<&Hyperlink> {
        self.hyperlinks.get(&CellAddress::new(row, col))
    }

    /// External link targets; the n-th one is relationship `rId{n}` of this sheet
    pub fn external_links(&self) -> impl Iterator<Item = &str> {
        self.hyperlinks.values().filter_map(|link| match &link.target {
            LinkTarget::External(url) => Some(url.as_str()),
            LinkTarget::Internal(_) => None,
        })
    }

    /// Whether the sheet needs its own relationships part
    pub fn has_external_links(&self) -> bool {
        self.external_links().next().is_some()
    }

    /// Settings of one column
    pub fn column_options(&self, col: u16) -> Option<&ColumnOptions> {
        self.columns.get(col)
    }

    /// Current pane configuration
    pub fn panes(&self) -> Option<Panes> {
        self.view.panes
    }

    /// Zoom percentage
    pub fn zoom(&self) -> u16 {
        self.view.zoom.unwrap_or(100)
    }

    /// Tab color
    pub fn tab_color(&self) -> Option<Color> {
        self.tab_color
    }

    /// Whether the sheet is hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the sheet tab is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            self.selected = false;
        }
    }

    fn extend_dimension(&mut self, range: CellRange) {
        self.dimension = Some(match self.dimension {
            Some(current) => current.union(&range),
            None => range,
        });
    }

    /// Write the `xl/worksheets/sheetN.xml` part
    ///
    /// Elements follow the order the worksheet schema requires. `active`
    /// marks the workbook's active sheet, whose tab is always selected.
    pub fn emit<W: Write>(&mut self, xml: &mut XmlEmitter<W>, active: bool) -> Result<()> {
        xml.declaration()?;
        xml.open_element("worksheet")?;
        xml.attribute("xmlns", SPREADSHEETML_NS)?;
        xml.attribute("xmlns:r", RELATIONSHIPS_NS)?;

        if let Some(color) = self.tab_color {
            xml.open_element("sheetPr")?;
            color.write_element(xml, "tabColor")?;
            xml.close_element("sheetPr")?;
        }

        let dimension = self
            .dimension
            .map_or_else(|| "A1".to_string(), |range| range.to_a1());
        xml.empty_element("dimension", &[("ref", dimension.as_str())])?;

        self.write_sheet_views(xml, active)?;

        xml.open_element("sheetFormatPr")?;
        xml.attribute_num("defaultRowHeight", DEFAULT_ROW_HEIGHT)?;
        if self.outline_rows > 0 {
            xml.attribute_num("outlineLevelRow", self.outline_rows)?;
        }
        if self.outline_cols > 0 {
            xml.attribute_num("outlineLevelCol", self.outline_cols)?;
        }
        xml.close_element("sheetFormatPr")?;

        self.columns.write_xml(xml)?;
        self.grid.write_sheet_data(xml)?;

        if !self.merged.is_empty() {
            xml.open_element("mergeCells")?;
            xml.attribute_num("count", self.merged.len())?;
            for range in &self.merged {
                xml.empty_element("mergeCell", &[("ref", range.to_a1().as_str())])?;
            }
            xml.close_element("mergeCells")?;
        }

        self.write_hyperlinks(xml)?;

        xml.empty_element(
            "pageMargins",
            &[
                ("left", "0.7"),
                ("right", "0.7"),
                ("top", "0.75"),
                ("bottom", "0.75"),
                ("header", "0.3"),
                ("footer", "0.3"),
            ],
        )?;
        xml.close_element("worksheet")
    }

    fn write_sheet_views<W: Write>(&self, xml: &mut XmlEmitter<W>, active: bool) -> Result<()> {
        xml.open_element("sheetViews")?;
        xml.open_element("sheetView")?;
        if self.view.hide_gridlines {
            xml.attribute("showGridLines", "0")?;
        }
        if self.selected || active {
            xml.attribute("tabSelected", "1")?;
        }
        if let Some(zoom) = self.view.zoom {
            xml.attribute_num("zoomScale", zoom)?;
            xml.attribute_num("zoomScaleNormal", zoom)?;
        }
        xml.attribute("workbookViewId", "0")?;

        let active_pane = match self.view.panes {
            Some(Panes::Frozen { row, col }) => {
                let pane = pane_name(row > 0, col > 0);
                xml.open_element("pane")?;
                if col > 0 {
                    xml.attribute_num("xSplit", col)?;
                }
                if row > 0 {
                    xml.attribute_num("ySplit", row)?;
                }
                xml.attribute("topLeftCell", &CellAddress::new(row, col).to_a1())?;
                xml.attribute("activePane", pane)?;
                xml.attribute("state", "frozen")?;
                xml.close_element("pane")?;
                Some(pane)
            }
            Some(Panes::Split { y, x }) => {
                let pane = pane_name(y > 0.0, x > 0.0);
                let top_left = CellAddress::new(
                    ((y / DEFAULT_ROW_HEIGHT).round() as u32).min(MAX_ROWS - 1),
                    ((x / DEFAULT_COLUMN_WIDTH).round() as u16).min(MAX_COLS - 1),
                );
                xml.open_element("pane")?;
                if x > 0.0 {
                    xml.attribute_num("xSplit", column_width_to_twips(x))?;
                }
                if y > 0.0 {
                    xml.attribute_num("ySplit", row_height_to_twips(y))?;
                }
                xml.attribute("topLeftCell", &top_left.to_a1())?;
                xml.attribute("activePane", pane)?;
                xml.close_element("pane")?;
                Some(pane)
            }
            None => None,
        };

        if active_pane == Some("bottomRight") {
            xml.empty_element("selection", &[("pane", "topRight")])?;
            xml.empty_element("selection", &[("pane", "bottomLeft")])?;
        }

        let selection = self.view.selection.filter(|s| s.to_a1() != "A1");
        if active_pane.is_some() || selection.is_some() {
            xml.open_element("selection")?;
            if let Some(pane) = active_pane {
                xml.attribute("pane", pane)?;
            }
            if let Some(range) = selection {
                xml.attribute("activeCell", &range.first().to_a1())?;
                xml.attribute("sqref", &range.to_a1())?;
            }
            xml.close_element("selection")?;
        }

        xml.close_element("sheetView")?;
        xml.close_element("sheetViews")
    }

    fn write_hyperlinks<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        if self.hyperlinks.is_empty() {
            return Ok(());
        }

        xml.open_element("hyperlinks")?;
        let mut rel_id = 0;
        for link in self.hyperlinks.values() {
            xml.open_element("hyperlink")?;
            xml.attribute("ref", &link.cell.to_a1())?;
            match &link.target {
                LinkTarget::External(_) => {
                    rel_id += 1;
                    xml.attribute("r:id", &format!("rId{rel_id}"))?;
                }
                LinkTarget::Internal(location) => {
                    xml.attribute("location", location)?;
                    xml.attribute("display", location)?;
                }
            }
            if let Some(tooltip) = &link.tooltip {
                xml.attribute("tooltip", tooltip)?;
            }
            xml.close_element("hyperlink")?;
        }
        xml.close_element("hyperlinks")
    }
}

/// Largest split offsets: the top-left cell of the lower pane stays on the sheet
const MAX_SPLIT_Y: f64 = (MAX_ROWS - 1) as f64 * DEFAULT_ROW_HEIGHT;
const MAX_SPLIT_X: f64 = (MAX_COLS - 1) as f64 * DEFAULT_COLUMN_WIDTH;

fn clamp_split(value: f64, max: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        0.0
    } else if value > max {
        log::warn!("split position {} clamped to {}", value, max);
        max
    } else {
        value
    }
}

fn pane_name(rows: bool, cols: bool) -> &'static str {
    match (rows, cols) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        (false, _) => "topRight",
    }
}

/// Pane split position for a height in points
fn row_height_to_twips(height: f64) -> u32 {
    (20.0 * height + 300.0).round() as u32
}

/// Pane split position for a width in characters (7px digits, 5px padding)
fn column_width_to_twips(width: f64) -> u32 {
    let pixels = if width < 1.0 {
        (width * 12.0 + 0.5).floor()
    } else {
        (width * 7.0 + 0.5).floor() + 5.0
    };
    (pixels * 0.75 * 20.0 + 390.0).round() as u32
}

/// Write handle for one worksheet
///
/// Obtained from [`Workbook::add_worksheet`](crate::Workbook::add_worksheet)
/// or [`Workbook::worksheet_mut`](crate::Workbook::worksheet_mut). Every
/// method validates its arguments before touching any state, so a call that
/// returns an error leaves the worksheet and the shared tables unchanged.
#[derive(Debug)]
pub struct WorksheetMut<'a> {
    pub(crate) sheet: &'a mut Worksheet,
    pub(crate) index: usize,
    pub(crate) active_sheet: &'a mut usize,
    pub(crate) strings: &'a mut StringTable,
    pub(crate) formats: &'a FormatTable,
    pub(crate) policy: InvalidCharPolicy,
    pub(crate) date_1904: bool,
}

impl Deref for WorksheetMut<'_> {
    type Target = Worksheet;

    fn deref(&self) -> &Worksheet {
        &*self.sheet
    }
}

impl WorksheetMut<'_> {
    /// Position of this worksheet in the workbook
    pub fn index(&self) -> usize {
        self.index
    }

    /// Write any value, with an optional format
    ///
    /// ```
    /// use sheetcraft_core::Workbook;
    ///
    /// let mut wb = Workbook::new();
    /// let mut sheet = wb.add_worksheet("Data").unwrap();
    /// sheet.write_cell(0, 0, "Total", None).unwrap();
    /// sheet.write_cell(0, 1, 42.5, None).unwrap();
    /// ```
    pub fn write_cell<'v, V: Into<CellInput<'v>>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
        format: Option<FormatId>,
    ) -> Result<()> {
        check_bounds(row, col)?;
        let format = self.prepare(row, format)?;
        let value = self.resolve(value.into())?;
        self.store(row, col, CellData::new(value, format))
    }

    /// Write any value at an A1 address
    pub fn write_cell_a1<'v, V: Into<CellInput<'v>>>(
        &mut self,
        address: &str,
        value: V,
        format: Option<FormatId>,
    ) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.write_cell(addr.row, addr.col, value, format)
    }

    /// Write a number
    pub fn write_number(&mut self, row: u32, col: u16, value: f64, format: Option<FormatId>) -> Result<()> {
        self.write_cell(row, col, CellInput::Number(value), format)
    }

    /// Write text through the shared string table
    pub fn write_string(&mut self, row: u32, col: u16, text: &str, format: Option<FormatId>) -> Result<()> {
        self.write_cell(row, col, CellInput::String(text.into()), format)
    }

    /// Write text stored in the cell rather than the shared string table
    pub fn write_inline_string(
        &mut self,
        row: u32,
        col: u16,
        text: &str,
        format: Option<FormatId>,
    ) -> Result<()> {
        self.write_cell(row, col, CellInput::InlineString(text.into()), format)
    }

    /// Write a boolean
    pub fn write_boolean(&mut self, row: u32, col: u16, value: bool, format: Option<FormatId>) -> Result<()> {
        self.write_cell(row, col, CellInput::Boolean(value), format)
    }

    /// Write an error value such as `#N/A`
    pub fn write_error(&mut self, row: u32, col: u16, error: CellError, format: Option<FormatId>) -> Result<()> {
        self.write_cell(row, col, CellInput::Error(error), format)
    }

    /// Write a formula, stored verbatim, with an optional cached result
    pub fn write_formula(
        &mut self,
        row: u32,
        col: u16,
        formula: &str,
        cached: Option<f64>,
        format: Option<FormatId>,
    ) -> Result<()> {
        self.write_cell(
            row,
            col,
            CellInput::Formula {
                text: formula.into(),
                cached,
            },
            format,
        )
    }

    /// Write a blank cell that only carries a format
    pub fn write_blank(&mut self, row: u32, col: u16, format: Option<FormatId>) -> Result<()> {
        self.write_cell(row, col, CellInput::Blank, format)
    }

    /// Write a date/time as a serial number in the workbook's date system
    ///
    /// The cell needs a date number format to display as a date.
    pub fn write_datetime(
        &mut self,
        row: u32,
        col: u16,
        datetime: &NaiveDateTime,
        format: Option<FormatId>,
    ) -> Result<()> {
        self.write_cell(row, col, CellInput::DateTime(*datetime), format)
    }

    /// Write a hyperlink showing the target itself as the cell text
    pub fn write_url(&mut self, row: u32, col: u16, url: &str, format: Option<FormatId>) -> Result<()> {
        let text = url.strip_prefix("internal:").unwrap_or(url);
        self.write_url_with_text(row, col, url, text, None, format)
    }

    /// Write a hyperlink with explicit cell text and optional tooltip
    ///
    /// `url` is either an external URL (`http://`, `https://`, `ftp://`,
    /// `ftps://`, `mailto:`, `file://`) or `internal:Sheet2!A1`. A link
    /// already on the cell is replaced.
    pub fn write_url_with_text(
        &mut self,
        row: u32,
        col: u16,
        url: &str,
        text: &str,
        tooltip: Option<&str>,
        format: Option<FormatId>,
    ) -> Result<()> {
        let target = Hyperlink::parse_target(url)?;
        let cell = CellAddress::new(row, col);
        if self.sheet.hyperlinks.len() >= MAX_HYPERLINKS && !self.sheet.hyperlinks.contains_key(&cell) {
            return Err(Error::InvalidUrl(format!(
                "worksheet already holds {MAX_HYPERLINKS} hyperlinks"
            )));
        }
        if let Some(tooltip) = tooltip {
            self.policy.check(tooltip)?;
        }
        let (LinkTarget::External(location) | LinkTarget::Internal(location)) = &target;
        self.policy.check(location)?;

        self.write_cell(row, col, CellInput::String(text.into()), format)?;
        self.sheet.hyperlinks.insert(
            cell,
            Hyperlink {
                cell,
                target,
                tooltip: tooltip.map(str::to_string),
            },
        );
        Ok(())
    }

    /// Merge a rectangle, writing `value` to its top-left cell
    ///
    /// The other covered cells become blank placeholders carrying `format`.
    /// Fails with [`Error::MergeOverlap`] if the rectangle intersects a range
    /// merged earlier.
    pub fn merge_range<'v, V: Into<CellInput<'v>>>(
        &mut self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
        value: V,
        format: Option<FormatId>,
    ) -> Result<()> {
        let range = CellRange::new(first_row, first_col, last_row, last_col)?;
        if range.is_single_cell() {
            return Err(Error::InvalidRange(format!(
                "{range} is a single cell and cannot be merged"
            )));
        }
        if let Some(existing) = self.sheet.merged.iter().find(|m| m.overlaps(&range)) {
            return Err(Error::MergeOverlap {
                range: range.to_a1(),
                existing: existing.to_a1(),
            });
        }
        let format = self.prepare(first_row, format)?;
        let value = self.resolve(value.into())?;

        self.sheet
            .grid
            .fill_merge(&range, CellData::new(value, format), format)?;
        self.sheet
            .hyperlinks
            .retain(|cell, _| !range.contains(cell.row, cell.col));
        self.sheet.merged.push(range);
        self.sheet.extend_dimension(range);
        Ok(())
    }

    /// Set row height, visibility, outline level and default format
    pub fn set_row(&mut self, row: u32, options: RowOptions) -> Result<()> {
        check_bounds(row, 0)?;
        self.prepare(row, options.format)?;
        let level = options.outline_level;
        self.sheet.grid.set_row_options(row, options)?;
        self.sheet.outline_rows = self.sheet.outline_rows.max(level);
        Ok(())
    }

    /// Apply column settings to `first..=last`
    pub fn set_column(&mut self, first: u16, last: u16, options: ColumnOptions) -> Result<()> {
        check_bounds(0, first)?;
        check_bounds(0, last)?;
        let (first, last) = if first <= last { (first, last) } else { (last, first) };
        if let Some(format) = options.format {
            self.validate_format(format)?;
        }
        self.sheet.outline_cols = self.sheet.outline_cols.max(options.outline_level);
        self.sheet.columns.set(first, last, &options);
        Ok(())
    }

    /// Freeze the rows above `row` and the columns left of `col`
    ///
    /// `(0, 0)` removes any panes.
    pub fn freeze_panes(&mut self, row: u32, col: u16) -> Result<()> {
        check_bounds(row, col)?;
        self.sheet.view.panes = (row > 0 || col > 0).then_some(Panes::Frozen { row, col });
        Ok(())
    }

    /// Split the window at `y` points from the top and `x` characters from the left
    ///
    /// Positions past the last row or column are clamped to it.
    pub fn split_panes(&mut self, y: f64, x: f64) {
        let y = clamp_split(y, MAX_SPLIT_Y);
        let x = clamp_split(x, MAX_SPLIT_X);
        self.sheet.view.panes = (y > 0.0 || x > 0.0).then_some(Panes::Split { y, x });
    }

    /// Select a range; its top-left cell becomes the active cell
    pub fn set_selection(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Result<()> {
        let (first_row, last_row) = (first_row.min(last_row), first_row.max(last_row));
        let (first_col, last_col) = (first_col.min(last_col), first_col.max(last_col));
        self.sheet.view.selection = Some(CellRange::new(first_row, first_col, last_row, last_col)?);
        Ok(())
    }

    /// Set the zoom percentage; values outside 10..=400 are clamped
    pub fn set_zoom(&mut self, zoom: u16) {
        let clamped = zoom.clamp(10, 400);
        if clamped != zoom {
            log::warn!("zoom {} clamped to {}", zoom, clamped);
        }
        self.sheet.view.zoom = (clamped != 100).then_some(clamped);
    }

    /// Hide or show the grid lines
    pub fn hide_gridlines(&mut self, hide: bool) {
        self.sheet.view.hide_gridlines = hide;
    }

    /// Set the tab color
    pub fn set_tab_color(&mut self, color: Color) {
        self.sheet.tab_color = Some(color);
    }

    /// Hide the worksheet; the active worksheet stays visible
    pub fn hide(&mut self) {
        if *self.active_sheet == self.index {
            log::warn!("active worksheet '{}' cannot be hidden", self.sheet.name);
            return;
        }
        self.sheet.set_hidden(true);
    }

    /// Make this the active worksheet (the one shown when the file opens)
    pub fn activate(&mut self) {
        self.sheet.hidden = false;
        *self.active_sheet = self.index;
    }

    /// Select the worksheet tab
    pub fn select(&mut self) {
        self.sheet.hidden = false;
        self.sheet.selected = true;
    }

    /// Validate the format and the row against the grid's ordering rules
    fn prepare(&self, row: u32, format: Option<FormatId>) -> Result<FormatId> {
        let format = format.unwrap_or(FormatId::DEFAULT);
        self.validate_format(format)?;
        self.sheet.grid.check_row(row)?;
        Ok(format)
    }

    fn validate_format(&self, format: FormatId) -> Result<()> {
        if self.formats.contains(format) {
            Ok(())
        } else {
            Err(Error::InvalidFormatIndex(format.index()))
        }
    }

    /// Turn caller input into a stored value; interning is the last step
    fn resolve(&mut self, input: CellInput<'_>) -> Result<CellValue> {
        Ok(match input {
            CellInput::Number(n) => CellValue::Number(n),
            CellInput::Boolean(b) => CellValue::Boolean(b),
            CellInput::Error(e) => CellValue::Error(e),
            CellInput::Blank => CellValue::Blank,
            CellInput::DateTime(dt) => CellValue::Number(datetime_to_serial(&dt, self.date_1904)),
            CellInput::InlineString(text) => {
                self.policy.check(&text)?;
                CellValue::InlineString(text.into_owned())
            }
            CellInput::Formula { text, cached } => {
                let body = normalize_formula(&text).map_err(Error::FormulaParse)?;
                self.policy.check(body)?;
                CellValue::Formula {
                    text: body.to_string(),
                    cached,
                }
            }
            CellInput::String(text) => {
                self.policy.check(&text)?;
                CellValue::SharedString(self.strings.intern(&text))
            }
        })
    }

    /// Put a cell in the grid; a hyperlink on the old cell goes with it
    fn store(&mut self, row: u32, col: u16, cell: CellData) -> Result<()> {
        self.sheet.grid.write(row, col, cell)?;
        self.sheet.hyperlinks.remove(&CellAddress::new(row, col));
        self.sheet.extend_dimension(CellRange::single(CellAddress::new(row, col)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cell::{CellError, CellValue};
    use crate::error::{Error, ErrorKind};
    use crate::grid::WriteMode;
    use crate::style::{Color, FormatId, Style};
    use crate::xml::InvalidCharPolicy;
    use crate::{ColumnOptions, Panes, RowOptions, Workbook, WorkbookSettings};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn emit_sheet(wb: &mut Workbook, index: usize) -> String {
        let mut xml = crate::XmlEmitter::new(Vec::new());
        wb.emit_worksheet(index, &mut xml).unwrap();
        String::from_utf8(xml.close().unwrap()).unwrap()
    }

    #[test]
    fn test_write_and_read_back() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.write_string(0, 0, "Total", None).unwrap();
        sheet.write_number(0, 1, 42.5, None).unwrap();
        sheet.write_boolean(1, 0, true, None).unwrap();
        sheet.write_error(1, 1, CellError::Na, None).unwrap();

        assert_eq!(sheet.cell(0, 0).unwrap().value, CellValue::SharedString(0));
        assert_eq!(sheet.cell(0, 1).unwrap().value, CellValue::Number(42.5));
        assert_eq!(sheet.cell(1, 0).unwrap().value, CellValue::Boolean(true));
        assert_eq!(sheet.dimension().unwrap().to_a1(), "A1:B2");
        assert_eq!(wb.strings().get(0), Some("Total"));
    }

    #[test]
    fn test_overwrite_in_buffered_mode() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.write_cell(3, 3, 1.0, None).unwrap();
        sheet.write_cell(3, 3, "now text", None).unwrap();
        assert_eq!(sheet.cell(3, 3).unwrap().value, CellValue::SharedString(0));
    }

    #[test]
    fn test_out_of_range_leaves_state_untouched() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        let err = sheet.write_string(crate::MAX_ROWS, 0, "lost", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = sheet.write_string(0, crate::MAX_COLS, "lost", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(sheet.dimension().is_none());
        assert!(wb.strings().is_empty());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        let err = sheet.write_number(0, 0, 1.0, Some(FormatId::new(9))).unwrap_err();
        assert!(matches!(err, Error::InvalidFormatIndex(9)));
        assert!(sheet.cell(0, 0).is_none());
    }

    #[test]
    fn test_formula_validation() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.write_formula(0, 0, "=SUM(A2:A9)", Some(10.0), None).unwrap();
        assert_eq!(
            sheet.cell(0, 0).unwrap().value,
            CellValue::Formula {
                text: "SUM(A2:A9)".into(),
                cached: Some(10.0)
            }
        );
        assert!(matches!(
            sheet.write_formula(0, 1, "=SUM(A2:A9", None, None),
            Err(Error::FormulaParse(_))
        ));
    }

    #[test]
    fn test_write_datetime() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        sheet.write_datetime(0, 0, &dt, None).unwrap();
        assert_eq!(sheet.cell(0, 0).unwrap().value, CellValue::Number(45306.5));
    }

    #[test]
    fn test_reject_policy_keeps_tables_clean() {
        let settings = WorkbookSettings::new().with_invalid_chars(InvalidCharPolicy::Reject);
        let mut wb = Workbook::with_settings(settings);
        let mut sheet = wb.add_worksheet("Data").unwrap();
        let err = sheet.write_string(0, 0, "bell\u{7}", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingError);
        assert!(sheet.cell(0, 0).is_none());
        assert!(wb.strings().is_empty());
    }

    #[test]
    fn test_merge_overlap() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.merge_range(0, 0, 1, 1, "first", None).unwrap();

        let err = sheet.merge_range(1, 1, 2, 2, "second", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OverlapViolation);
        assert!(sheet.cell(2, 2).is_none());
        assert_eq!(wb.strings().unique_count(), 1);
    }

    #[test]
    fn test_merge_placeholders() {
        let mut wb = Workbook::new();
        let centered = wb.create_format(&Style::new().bold(true)).unwrap();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.merge_range(0, 0, 1, 1, "first", Some(centered)).unwrap();
        sheet.merge_range(2, 2, 3, 3, 99.0, None).unwrap();

        assert_eq!(sheet.cell(0, 0).unwrap().value, CellValue::SharedString(0));
        assert_eq!(sheet.cell(2, 2).unwrap().value, CellValue::Number(99.0));
        for (row, col) in [(0, 1), (1, 0), (1, 1)] {
            let cell = sheet.cell(row, col).unwrap();
            assert_eq!(cell.value, CellValue::Blank);
            assert_eq!(cell.format, centered);
        }
        for (row, col) in [(2, 3), (3, 2), (3, 3)] {
            assert_eq!(sheet.cell(row, col).unwrap().value, CellValue::Blank);
        }
        assert_eq!(sheet.merged_ranges().len(), 2);

        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(
            r#"<mergeCells count="2"><mergeCell ref="A1:B2"/><mergeCell ref="C3:D4"/></mergeCells>"#
        ));
    }

    #[test]
    fn test_merge_single_cell_rejected() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        assert!(matches!(
            sheet.merge_range(0, 0, 0, 0, "x", None),
            Err(Error::InvalidRange(_))
        ));
        assert!(matches!(
            sheet.merge_range(2, 0, 1, 0, "x", None),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_streaming_ordering() {
        let mut wb = Workbook::new();
        let mut sheet = wb
            .add_worksheet_with_mode("Stream", WriteMode::Streaming)
            .unwrap();
        for row in 0..3 {
            sheet.write_string(row, 0, "row", None).unwrap();
        }
        let err = sheet.write_string(1, 0, "late", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OrderingViolation);
        assert_eq!(wb.strings().unique_count(), 1);
        assert_eq!(wb.strings().total_count(), 3);
    }

    #[test]
    fn test_emit_worksheet_layout() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.write_number(1, 1, 5.0, None).unwrap();
        sheet.set_column(0, 0, ColumnOptions::new().with_width(20.0)).unwrap();
        sheet.set_row(1, RowOptions::new().with_height(25.0)).unwrap();
        sheet.freeze_panes(1, 0).unwrap();
        sheet.set_tab_color(Color::RED);
        sheet.write_url(2, 0, "https://example.com", None).unwrap();

        let xml = emit_sheet(&mut wb, 0);
        let order = [
            "<sheetPr>",
            "<dimension ref=\"A2:B3\"/>",
            "<sheetViews>",
            "<sheetFormatPr",
            "<cols>",
            "<sheetData>",
            "<hyperlinks>",
            "<pageMargins",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{xml}");

        assert!(xml.contains(r#"<tabColor rgb="FFFF0000"/>"#));
        assert!(xml.contains(concat!(
            r#"<sheetView tabSelected="1" workbookViewId="0">"#,
            r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#,
            r#"<selection pane="bottomLeft"/></sheetView>"#
        )));
        assert!(xml.contains(r#"<hyperlink ref="A3" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<row r="2" spans="2:2" ht="25" customHeight="1">"#));
    }

    #[test]
    fn test_freeze_both_and_selection() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.freeze_panes(2, 1).unwrap();
        sheet.set_selection(4, 3, 5, 4).unwrap();
        sheet.set_zoom(150);
        sheet.hide_gridlines(true);

        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(concat!(
            r#"<sheetView showGridLines="0" tabSelected="1" zoomScale="150" zoomScaleNormal="150" workbookViewId="0">"#,
            r#"<pane xSplit="1" ySplit="2" topLeftCell="B3" activePane="bottomRight" state="frozen"/>"#,
            r#"<selection pane="topRight"/><selection pane="bottomLeft"/>"#,
            r#"<selection pane="bottomRight" activeCell="D5" sqref="D5:E6"/>"#,
        )));
    }

    #[test]
    fn test_split_panes() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.split_panes(15.0, 8.43);
        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(
            r#"<pane xSplit="1350" ySplit="600" topLeftCell="B2" activePane="bottomRight"/>"#
        ));
    }

    #[test]
    fn test_split_panes_clamped_to_sheet() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet.split_panes(1e12, f64::INFINITY);
        assert_eq!(
            sheet.panes(),
            Some(Panes::Split {
                y: f64::from(crate::MAX_ROWS - 1) * 15.0,
                x: 0.0
            })
        );
        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(r#"topLeftCell="A1048576""#), "{xml}");

        let mut sheet = wb.worksheet_mut(0).unwrap();
        sheet.split_panes(20_000_000.0, 1e9);
        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(r#"topLeftCell="XFD1048576""#), "{xml}");
    }

    #[test]
    fn test_internal_link() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Summary").unwrap();
        let mut sheet = wb.add_worksheet("Data").unwrap();
        sheet
            .write_url_with_text(0, 0, "internal:Summary!A1", "Back", Some("Go back"), None)
            .unwrap();
        assert!(!sheet.has_external_links());
        assert!(matches!(
            sheet.write_url(1, 0, "not a url", None),
            Err(Error::InvalidUrl(_))
        ));

        let xml = emit_sheet(&mut wb, 1);
        assert!(xml.contains(
            r#"<hyperlink ref="A1" location="Summary!A1" display="Summary!A1" tooltip="Go back"/>"#
        ));
    }

    #[test]
    fn test_hyperlink_replaced_per_cell() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Links").unwrap();
        sheet.write_url(0, 0, "https://example.com/old", None).unwrap();
        sheet.write_url(0, 0, "https://example.com/new", None).unwrap();
        sheet.write_url(1, 0, "https://example.com/kept", None).unwrap();

        let links: Vec<&str> = sheet.external_links().collect();
        assert_eq!(links, ["https://example.com/new", "https://example.com/kept"]);
        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(concat!(
            r#"<hyperlinks><hyperlink ref="A1" r:id="rId1"/>"#,
            r#"<hyperlink ref="A2" r:id="rId2"/></hyperlinks>"#
        )));
    }

    #[test]
    fn test_overwrite_drops_hyperlink() {
        let mut wb = Workbook::new();
        let mut sheet = wb.add_worksheet("Links").unwrap();
        sheet.write_url(0, 0, "https://example.com", None).unwrap();
        sheet.write_url(4, 4, "internal:Links!A1", None).unwrap();
        sheet.write_number(0, 0, 5.0, None).unwrap();
        sheet.merge_range(3, 3, 5, 5, "merged", None).unwrap();

        assert!(sheet.hyperlink(0, 0).is_none());
        assert!(sheet.hyperlink(4, 4).is_none());
        assert!(!sheet.has_external_links());
        let xml = emit_sheet(&mut wb, 0);
        assert!(!xml.contains("<hyperlinks"), "{xml}");
    }

    #[test]
    fn test_empty_sheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Empty").unwrap();
        let xml = emit_sheet(&mut wb, 0);
        assert!(xml.contains(r#"<dimension ref="A1"/>"#));
        assert!(xml.contains("<sheetData/>"));
        assert!(!xml.contains("<mergeCells"));
    }
}

//! Constant-memory grid: finished rows are serialized to a temporary file

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::cell::{CellData, CellRange};
use crate::error::{Error, Result};
use crate::row::{Row, RowOptions};
use crate::style::FormatId;
use crate::xml::{InvalidCharPolicy, XmlEmitter};

/// Blank placeholders still owed to rows below the current one
#[derive(Debug)]
struct PendingMerge {
    range: CellRange,
    format: FormatId,
}

#[derive(Debug)]
pub(crate) struct StreamingGrid {
    /// Row being written, not yet serialized
    current: Option<(u32, Row)>,
    /// Highest row already serialized to the sink
    last_flushed: Option<u32>,
    /// Merge ranges that extend below the current row
    pending: Vec<PendingMerge>,
    /// Created on first flush, deleted when the grid is dropped
    sink: Option<XmlEmitter<BufWriter<File>>>,
    temp_dir: Option<PathBuf>,
    policy: InvalidCharPolicy,
}

impl StreamingGrid {
    pub(crate) fn new(temp_dir: Option<PathBuf>, policy: InvalidCharPolicy) -> Self {
        Self {
            current: None,
            last_flushed: None,
            pending: Vec::new(),
            sink: None,
            temp_dir,
            policy,
        }
    }

    pub(crate) fn check_row(&self, row: u32) -> Result<()> {
        let violation = match (&self.current, self.last_flushed) {
            (Some((current, _)), _) if row < *current => Some(*current),
            (None, Some(last)) if row <= last => Some(last),
            _ => None,
        };
        match violation {
            Some(current) => Err(Error::OrderingViolation { row, current }),
            None => Ok(()),
        }
    }

    pub(crate) fn write(&mut self, row: u32, col: u16, cell: CellData) -> Result<()> {
        self.row_mut(row)?.cells.insert(col, cell);
        Ok(())
    }

    pub(crate) fn set_row_options(&mut self, row: u32, options: RowOptions) -> Result<()> {
        self.row_mut(row)?.options = options;
        Ok(())
    }

    pub(crate) fn fill_merge(&mut self, range: &CellRange, top_left: CellData, format: FormatId) -> Result<()> {
        let first = self.row_mut(range.first_row)?;
        for col in range.first_col..=range.last_col {
            first.cells.insert(col, CellData::blank(format));
        }
        first.cells.insert(range.first_col, top_left);

        if range.last_row > range.first_row {
            self.pending.push(PendingMerge {
                range: *range,
                format,
            });
        }
        Ok(())
    }

    pub(crate) fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        match &self.current {
            Some((index, current)) if *index == row => current.cells.get(&col),
            _ => None,
        }
    }

    /// Flush the current row, then copy everything serialized so far
    ///
    /// The sink stays open and positioned at its end, so rows written later
    /// are appended and a second emit repeats the first.
    pub(crate) fn write_rows<W: Write>(&mut self, xml: &mut XmlEmitter<W>) -> Result<()> {
        self.advance(None)?;

        if let Some(sink) = self.sink.as_mut() {
            let writer = sink.get_mut()?;
            writer.flush()?;
            let file = writer.get_mut();
            file.seek(SeekFrom::Start(0))?;
            let copied = xml.copy_raw(file)?;
            file.seek(SeekFrom::End(0))?;
            log::debug!("copied {} bytes of streamed rows", copied);
        }
        Ok(())
    }

    /// The current row buffer for `row`, advancing past lower rows first
    fn row_mut(&mut self, row: u32) -> Result<&mut Row> {
        self.check_row(row)?;
        if self.current.as_ref().map_or(true, |(index, _)| *index != row) {
            self.advance(Some(row))?;
            let mut fresh = Row::default();
            self.apply_pending(row, &mut fresh);
            self.current = Some((row, fresh));
        }
        Ok(&mut self.current.get_or_insert_with(|| (row, Row::default())).1)
    }

    /// Serialize the current row and any merge-only rows below it, up to
    /// (not including) `target`; `None` drains everything
    fn advance(&mut self, target: Option<u32>) -> Result<()> {
        let mut next = match self.current.take() {
            Some((index, row)) => {
                self.flush_row(index, &row)?;
                index + 1
            }
            None => self.last_flushed.map_or(0, |last| last + 1),
        };

        let end = target.unwrap_or(u32::MAX);
        while let Some(row) = self.next_pending_row(next, end) {
            let mut blank = Row::default();
            self.apply_pending(row, &mut blank);
            self.flush_row(row, &blank)?;
            next = row + 1;
        }

        self.pending.retain(|p| p.range.last_row >= next);
        Ok(())
    }

    fn next_pending_row(&self, from: u32, end: u32) -> Option<u32> {
        self.pending
            .iter()
            .filter(|p| p.range.last_row >= from)
            .map(|p| (p.range.first_row + 1).max(from))
            .filter(|&row| row < end)
            .min()
    }

    fn apply_pending(&self, row: u32, target: &mut Row) {
        for pending in &self.pending {
            let range = &pending.range;
            if row <= range.first_row || row > range.last_row {
                continue;
            }
            for col in range.first_col..=range.last_col {
                target.cells.insert(col, CellData::blank(pending.format));
            }
        }
    }

    fn flush_row(&mut self, index: u32, row: &Row) -> Result<()> {
        if self.sink.is_none() {
            let file = match &self.temp_dir {
                Some(dir) => tempfile::tempfile_in(dir)?,
                None => tempfile::tempfile()?,
            };
            log::debug!("opened temporary row sink");
            self.sink = Some(XmlEmitter::with_policy(BufWriter::new(file), self.policy));
        }
        if let Some(sink) = self.sink.as_mut() {
            row.write_xml(sink, index)?;
        }
        self.last_flushed = Some(index);
        log::trace!("flushed streaming row {}", index);
        Ok(())
    }
}

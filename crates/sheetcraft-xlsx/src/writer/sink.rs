//! Destinations for package parts

use std::io::{Seek, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use sheetcraft_core::Compression;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::XlsxResult;

/// Receives the parts of a package one after another
///
/// A part is opened with [`start_part`](PartSink::start_part) and its bytes
/// go to [`part_writer`](PartSink::part_writer) until the next part starts.
pub trait PartSink {
    /// Begin the part stored under `path`
    fn start_part(&mut self, path: &str) -> XlsxResult<()>;

    /// Writer for the part started last
    fn part_writer(&mut self) -> &mut dyn Write;
}

/// Writes parts as entries of a ZIP archive
pub struct ZipPartSink<W: Write + Seek> {
    zip: ZipWriter<W>,
    compression: CompressionMethod,
    large_file: bool,
    modified: zip::DateTime,
}

impl<W: Write + Seek> ZipPartSink<W> {
    /// Create a sink; every entry carries `modified` as its timestamp
    pub fn new(writer: W, compression: Compression, large_file: bool, modified: DateTime<Utc>) -> Self {
        let compression = match compression {
            Compression::Deflate => CompressionMethod::Deflated,
            Compression::Store => CompressionMethod::Stored,
        };
        Self {
            zip: ZipWriter::new(writer),
            compression,
            large_file,
            modified: zip_timestamp(modified),
        }
    }

    /// Write the central directory and return the underlying writer
    pub fn finish(self) -> XlsxResult<W> {
        Ok(self.zip.finish()?)
    }

    fn options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.compression)
            .large_file(self.large_file)
            .last_modified_time(self.modified)
    }
}

impl<W: Write + Seek> PartSink for ZipPartSink<W> {
    fn start_part(&mut self, path: &str) -> XlsxResult<()> {
        let options = self.options();
        self.zip.start_file(path, options)?;
        Ok(())
    }

    fn part_writer(&mut self) -> &mut dyn Write {
        &mut self.zip
    }
}

/// ZIP timestamps cover 1980..=2107; anything outside falls back to 1980-01-01
fn zip_timestamp(time: DateTime<Utc>) -> zip::DateTime {
    let year = u16::try_from(time.year()).unwrap_or(0);
    zip::DateTime::from_date_and_time(
        year,
        time.month() as u8,
        time.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
    )
    .unwrap_or_default()
}

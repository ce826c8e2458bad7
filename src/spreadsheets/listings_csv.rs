// spreadsheets/listings_csv.rs
use crate::domain::listing::{Listing, CSV_HEADERS};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("sink already closed")]
    Closed,
}

/// How the output file is opened at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Start a fresh file with a header row.
    #[default]
    Truncate,
    /// Add rows to the end of an existing file, no header.
    Append,
}

/// Destination for accepted listings.
pub trait ListingSink {
    fn write_listing(&mut self, listing: &Listing) -> Result<(), SinkError>;

    /// Flush and stop accepting rows.
    fn close(&mut self) -> Result<(), SinkError>;
}

pub struct CsvListingSink<W: Write> {
    writer: csv::Writer<W>,
    closed: bool,
}

impl CsvListingSink<File> {
    pub fn open(path: impl AsRef<Path>, mode: OutputMode) -> Result<Self, SinkError> {
        let file = match mode {
            OutputMode::Truncate => File::create(path)?,
            OutputMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        Self::new(file, mode)
    }
}

impl<W: Write> CsvListingSink<W> {
    pub fn new(inner: W, mode: OutputMode) -> Result<Self, SinkError> {
        // CRLF rows keep appended runs consistent with files written earlier.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);

        if mode == OutputMode::Truncate {
            writer.write_record(CSV_HEADERS)?;
        }

        Ok(Self {
            writer,
            closed: false,
        })
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> ListingSink for CsvListingSink<W> {
    fn write_listing(&mut self, listing: &Listing) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.writer.write_record(listing.to_record())?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.closed = true;
        self.writer.flush()?;
        Ok(())
    }
}

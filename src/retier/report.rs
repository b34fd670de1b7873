//! Tab-delimited report writers.

use std::path::Path;

use super::result::{Record, COLUMNS};

/// Construct a TSV writer with the header row already written.
fn open_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<std::fs::File>, anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path.as_ref())
        .map_err(|e| anyhow::anyhow!("problem opening output file: {}", e))?;
    writer
        .write_record(COLUMNS)
        .map_err(|e| anyhow::anyhow!("problem writing header: {}", e))?;
    Ok(writer)
}

/// Writer for the full report, one row per retained report event.
pub struct ReportWriter {
    writer: csv::Writer<std::fs::File>,
}

impl ReportWriter {
    /// Create the report file and write the header row.
    ///
    /// # Errors
    ///
    /// If the file cannot be created.
    pub fn to_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        Ok(Self {
            writer: open_writer(path)?,
        })
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// If the record cannot be written.
    pub fn write(&mut self, record: &Record) -> Result<(), anyhow::Error> {
        self.writer
            .serialize(record)
            .map_err(|e| anyhow::anyhow!("problem writing record: {}", e))
    }

    /// Flush and close the report file.
    ///
    /// # Errors
    ///
    /// If flushing fails.
    pub fn finish(mut self) -> Result<(), anyhow::Error> {
        self.writer
            .flush()
            .map_err(|e| anyhow::anyhow!("problem flushing output file: {}", e))
    }
}

/// Writer for the filtered summary, only records whose gene is curated
/// with green confidence.
pub struct SummaryWriter {
    inner: ReportWriter,
}

impl SummaryWriter {
    /// Create the summary file and write the header row.
    ///
    /// # Errors
    ///
    /// If the file cannot be created.
    pub fn to_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        Ok(Self {
            inner: ReportWriter::to_path(path)?,
        })
    }

    /// Append one record if its gene confidence is green.
    ///
    /// # Errors
    ///
    /// If the record cannot be written.
    pub fn write(&mut self, record: &Record) -> Result<(), anyhow::Error> {
        if record.is_green() {
            self.inner.write(record)?;
        }
        Ok(())
    }

    /// Flush and close the summary file.
    ///
    /// # Errors
    ///
    /// If flushing fails.
    pub fn finish(self) -> Result<(), anyhow::Error> {
        self.inner.finish()
    }
}

//! Reading frames from storage
//!
//! Parquet files are read through the Arrow record batch reader of the `parquet`
//! crate; CSV files through the `csv` crate with a header row and per-column type
//! inference.

use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::session::Session;

mod csv_file;
mod parquet_file;

/// Reader obtained from [`Session::read`]
#[derive(Debug, Clone, Copy)]
pub struct FrameReader<'a> {
    session: &'a Session,
    delimiter: u8,
}

impl<'a> FrameReader<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self {
            session,
            delimiter: b',',
        }
    }

    /// Field delimiter for CSV input, `,` by default
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn parquet(&self, path: impl AsRef<Path>) -> Result<Frame> {
        let path = path.as_ref();
        let frame = parquet_file::read_parquet(path)?;
        self.log_loaded(path, &frame);
        Ok(frame)
    }

    pub fn csv(&self, path: impl AsRef<Path>) -> Result<Frame> {
        let path = path.as_ref();
        let frame = csv_file::read_csv(path, self.delimiter)?;
        self.log_loaded(path, &frame);
        Ok(frame)
    }

    /// Picks the reader from the file extension (`.parquet` or `.csv`).
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Frame> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("parquet") => self.parquet(path),
            Some("csv") => self.csv(path),
            _ => Err(Error::Config(format!(
                "cannot infer the format of `{}`, expected a .parquet or .csv file",
                path.display()
            ))),
        }
    }

    fn log_loaded(&self, path: &Path, frame: &Frame) {
        info!(
            "[{}] loaded {} rows x {} columns from {}",
            self.session.app_name(),
            frame.num_rows(),
            frame.num_columns(),
            path.display()
        );
    }
}

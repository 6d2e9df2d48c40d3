//! CSV file for the Moodle bulk user upload

use crate::roster::OutputRecord;
use eyre::{Context, Result, eyre};
use std::path::{Path, PathBuf};

/// A rendered upload file, ready to be saved or offered for download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the file into `dir`, returning its path
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        Ok(path)
    }
}

/// Renders records as a comma-separated, UTF-8 upload file named `<course>_<group>.csv`
pub struct CsvDownload {
    course: String,
    group: String,
}

impl CsvDownload {
    pub fn new(course: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            group: group.into(),
        }
    }

    pub fn filename(&self) -> String {
        format!("{}_{}.csv", self.course, self.group)
    }

    /// Header row followed by one line per record, in order
    pub fn render(&self, records: &[OutputRecord]) -> Result<Download> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(OutputRecord::header())?;
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to serialize record {}", record.username))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| eyre!("Failed to finish CSV: {}", e.error()))?;

        Ok(Download {
            filename: self.filename(),
            bytes,
        })
    }
}

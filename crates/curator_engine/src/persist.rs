use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::assemble::OutputRecord;
use crate::sink::{RecordSink, SinkError};
use crate::summary::RunSummary;

/// Record files, relative to the storage root.
pub const DATASET_DIR: &str = "datasets/default";
/// Run summary, relative to the storage root.
pub const KEY_VALUE_DIR: &str = "key_value_stores/default";
pub const SUMMARY_FILENAME: &str = "SUMMARY.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present to keep determinism.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    pub fn write_json<T: Serialize>(
        &self,
        filename: &str,
        value: &T,
    ) -> Result<PathBuf, PersistError> {
        let content = serde_json::to_string_pretty(value)?;
        self.write(filename, &content)
    }
}

/// One pretty-printed JSON file per record, numbered in push order:
/// `000000001.json`, `000000002.json`, ...
#[derive(Debug)]
pub struct DatasetSink {
    writer: AtomicFileWriter,
    next_index: AtomicU64,
}

impl DatasetSink {
    pub fn new(storage_root: &Path) -> Result<Self, PersistError> {
        let dir = storage_root.join(DATASET_DIR);
        ensure_output_dir(&dir)?;
        Ok(Self {
            writer: AtomicFileWriter::new(dir),
            next_index: AtomicU64::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }
}

impl RecordSink for DatasetSink {
    fn push(&self, record: &OutputRecord) -> Result<(), SinkError> {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.writer.write_json(&format!("{index:09}.json"), record)?;
        Ok(())
    }
}

pub fn write_summary(storage_root: &Path, summary: &RunSummary) -> Result<PathBuf, PersistError> {
    AtomicFileWriter::new(storage_root.join(KEY_VALUE_DIR)).write_json(SUMMARY_FILENAME, summary)
}

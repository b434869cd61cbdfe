use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::assemble::OutputRecord;
use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Destination for collected records.
pub trait RecordSink: Send + Sync {
    fn push(&self, record: &OutputRecord) -> Result<(), SinkError>;
}

/// Keeps records in memory, in push order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<OutputRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OutputRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn push(&self, record: &OutputRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

//! Delivery targets for enriched rows.
//!
//! A sink receives one chunk at a time and either persists the whole chunk or reports an
//! error having persisted none of it.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::output::OutputRecord;

mod database;
mod file;

pub use database::DatabaseSink;
pub use file::FileSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to write extract {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode extract line: {0}")]
    Csv(#[from] csv::Error),

    #[error("row has {values} values but the layout has {columns} columns")]
    Layout { columns: usize, values: usize },
}

#[async_trait]
pub trait BoxScoreSink<R: OutputRecord + Sync>: Send {
    /// Persists every row of the chunk, in order, or none of them.
    async fn write_chunk(&mut self, rows: &[R]) -> Result<(), SinkError>;

    /// Called once after the last chunk of a successful run.
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

//! Row sources feed raw box scores to the pipeline in read order.

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;

use crate::boxscores::BoxScore;
use crate::error::RowFailure;

mod postgres;

pub use postgres::{PgMapped, PgRowSource};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A fetched row: either decoded, or rejected with its natural key.
pub type Fetched<R> = Result<R, RowFailure>;

#[async_trait]
pub trait RowSource: Send {
    type Row: BoxScore;

    /// Returns up to `limit` rows in ascending game order. An empty chunk means the
    /// source is exhausted.
    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<Fetched<Self::Row>>, SourceError>;
}

/// Serves rows held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRowSource<R> {
    rows: VecDeque<Fetched<R>>,
}

impl<R> MemoryRowSource<R> {
    pub fn new(rows: impl IntoIterator<Item = R>) -> Self {
        Self {
            rows: rows.into_iter().map(Ok).collect(),
        }
    }

    /// Like [`MemoryRowSource::new`], but individual entries may already be rejected.
    pub fn from_fetched(rows: impl IntoIterator<Item = Fetched<R>>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<R: BoxScore> RowSource for MemoryRowSource<R> {
    type Row = R;

    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<Fetched<R>>, SourceError> {
        let take = limit.min(self.rows.len());
        Ok(self.rows.drain(..take).collect())
    }
}

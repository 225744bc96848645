//! Row shapes read by the pipeline and the enriched rows it delivers.

use crate::error::RowError;
use crate::output::OutputRecord;
use crate::types::RowKey;

mod official;
mod player;
mod team;

pub use official::{OfficialBoxScore, RawOfficialBoxScore};
pub use player::{PlayerBoxScore, RawPlayerBoxScore};
pub use team::{RawTeamBoxScore, TeamBoxScore};

/// A raw row the chunk processor can enrich.
pub trait BoxScore: Send + Sized {
    type Enriched: OutputRecord + Send + Sync;

    fn key(&self) -> RowKey;

    /// Validates the counting stats, then computes every derived metric. Pure: the same
    /// input always yields the same output.
    fn enrich(self) -> Result<Self::Enriched, RowError>;
}

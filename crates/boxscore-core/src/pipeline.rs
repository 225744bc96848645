//! Chunked run coordinator: fetch a chunk, enrich it, deliver it, repeat.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::boxscores::BoxScore;
use crate::config::{AggregateKind, Destination, ErrorPolicy, RunConfig};
use crate::error::{PipelineError, RowFailure, Side};
use crate::sink::BoxScoreSink;
use crate::source::{Fetched, RowSource};
use crate::types::RowKey;

type Enriched<S> = <<S as RowSource>::Row as BoxScore>::Enriched;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Fetching,
    Processing { chunk: usize },
    Writing { chunk: usize },
    Completed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (*self, next) {
            (Idle, Fetching) => true,
            (Fetching, Processing { .. }) | (Fetching, Completed) => true,
            (Processing { chunk }, Writing { chunk: next }) => chunk == next,
            (Writing { .. }, Fetching) => true,
            (Fetching | Processing { .. } | Writing { .. }, Failed) => true,
            _ => false,
        }
    }
}

/// Rows of one chunk that survived enrichment, plus the ones that did not.
#[derive(Debug)]
pub struct ProcessedChunk<E> {
    pub rows: Vec<E>,
    pub failures: Vec<RowFailure>,
}

/// Enriches a fetched chunk in read order. Under [`ErrorPolicy::FailFast`] the first
/// failing row is returned as the error and nothing of the chunk survives.
pub fn process_chunk<R: BoxScore>(
    fetched: Vec<Fetched<R>>,
    policy: ErrorPolicy,
) -> Result<ProcessedChunk<R::Enriched>, RowFailure> {
    let mut rows = Vec::with_capacity(fetched.len());
    let mut failures = Vec::new();

    for entry in fetched {
        let outcome = entry.and_then(|raw| {
            let key = raw.key();
            raw.enrich().map_err(|error| RowFailure { key, error })
        });
        match (outcome, policy) {
            (Ok(row), _) => rows.push(row),
            (Err(failure), ErrorPolicy::FailFast) => return Err(failure),
            (Err(failure), ErrorPolicy::BestEffort) => failures.push(failure),
        }
    }

    Ok(ProcessedChunk { rows, failures })
}

/// One rejected row as reported in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    #[serde(flatten)]
    pub key: RowKey,
    pub side: Option<Side>,
    pub metric: Option<&'static str>,
    pub message: String,
}

impl From<&RowFailure> for FailureReport {
    fn from(failure: &RowFailure) -> Self {
        Self {
            key: failure.key.clone(),
            side: failure.error.side(),
            metric: failure.error.metric(),
            message: failure.error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub kind: AggregateKind,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub destination: Destination,
    pub state: PipelineState,
    pub rows_read: usize,
    pub rows_written: usize,
    pub chunks_written: usize,
    pub row_failures: Vec<FailureReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// A failed run, carrying everything that was accomplished before the failure.
#[derive(Debug, Error)]
#[error("run {} failed: {source}", summary.run_id)]
pub struct RunFailure {
    pub summary: RunSummary,
    #[source]
    pub source: PipelineError,
}

pub struct Pipeline<S: RowSource> {
    config: RunConfig,
    source: S,
    sink: Box<dyn BoxScoreSink<Enriched<S>>>,
    summary: RunSummary,
}

impl<S: RowSource> Pipeline<S> {
    pub fn new(config: RunConfig, source: S, sink: Box<dyn BoxScoreSink<Enriched<S>>>) -> Self {
        let window = config.window();
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            kind: config.kind(),
            from_date: window.from(),
            to_date: window.to(),
            destination: config.writer().destination(),
            state: PipelineState::Idle,
            rows_read: 0,
            rows_written: 0,
            chunks_written: 0,
            row_failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        };
        Self {
            config,
            source,
            sink,
            summary,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.summary.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.summary.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.summary.state,
            next
        );
        debug!(
            run_id = %self.summary.run_id,
            from = ?self.summary.state,
            to = ?next,
            "Pipeline state change"
        );
        self.summary.state = next;
    }

    fn fail(mut self, source: PipelineError) -> RunFailure {
        self.transition(PipelineState::Failed);
        self.summary.finished_at = Some(Utc::now());
        error!(
            run_id = %self.summary.run_id,
            kind = %self.summary.kind,
            rows_written = self.summary.rows_written,
            error = %source,
            "Run failed"
        );
        RunFailure {
            summary: self.summary,
            source,
        }
    }

    fn record_failure(&mut self, failure: &RowFailure) {
        let key = &failure.key;
        match self.config.error_policy() {
            ErrorPolicy::FailFast => error!(
                game_date_time = %key.game_date_time,
                team = %key.team,
                opponent = %key.opponent,
                subject = ?key.subject,
                side = ?failure.error.side(),
                metric = ?failure.error.metric(),
                error = %failure.error,
                "Row failed enrichment"
            ),
            ErrorPolicy::BestEffort => warn!(
                game_date_time = %key.game_date_time,
                team = %key.team,
                opponent = %key.opponent,
                subject = ?key.subject,
                side = ?failure.error.side(),
                metric = ?failure.error.metric(),
                error = %failure.error,
                "Row excluded from delivery"
            ),
        }
        self.summary.row_failures.push(FailureReport::from(failure));
    }

    /// Drives the run to a terminal state. Chunks are delivered in read order; a chunk is
    /// either delivered whole or the run stops.
    pub async fn run(mut self) -> Result<RunSummary, RunFailure> {
        let chunk_size = self.config.chunk_size();
        let policy = self.config.error_policy();
        info!(
            run_id = %self.summary.run_id,
            kind = %self.summary.kind,
            from = %self.summary.from_date,
            to = %self.summary.to_date,
            destination = %self.summary.destination,
            chunk_size,
            error_policy = policy.as_str(),
            "Starting run"
        );

        self.transition(PipelineState::Fetching);
        let mut chunk = 0;
        loop {
            let next = self.source.next_chunk(chunk_size).await;
            let fetched = match next {
                Ok(fetched) => fetched,
                Err(err) => return Err(self.fail(err.into())),
            };
            if fetched.is_empty() {
                break;
            }

            chunk += 1;
            self.summary.rows_read += fetched.len();
            self.transition(PipelineState::Processing { chunk });

            let processed = match process_chunk(fetched, policy) {
                Ok(processed) => processed,
                Err(failure) => {
                    self.record_failure(&failure);
                    return Err(self.fail(failure.into()));
                }
            };
            for failure in &processed.failures {
                self.record_failure(failure);
            }

            self.transition(PipelineState::Writing { chunk });
            if !processed.rows.is_empty() {
                let delivered = self.sink.write_chunk(&processed.rows).await;
                if let Err(source) = delivered {
                    return Err(self.fail(PipelineError::Delivery { chunk, source }));
                }
                self.summary.rows_written += processed.rows.len();
                self.summary.chunks_written += 1;
            }
            info!(
                run_id = %self.summary.run_id,
                chunk,
                written = processed.rows.len(),
                rejected = processed.failures.len(),
                "Chunk delivered"
            );

            self.transition(PipelineState::Fetching);
        }

        let finished = self.sink.finish().await;
        if let Err(source) = finished {
            return Err(self.fail(PipelineError::Delivery { chunk, source }));
        }

        if !self.summary.row_failures.is_empty() {
            let count = self.summary.row_failures.len();
            return Err(self.fail(PipelineError::RowsRejected { count }));
        }

        self.transition(PipelineState::Completed);
        self.summary.finished_at = Some(Utc::now());
        info!(
            run_id = %self.summary.run_id,
            rows_read = self.summary.rows_read,
            rows_written = self.summary.rows_written,
            chunks = self.summary.chunks_written,
            "Run completed"
        );
        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineState::*;

    #[test]
    fn transitions_follow_the_chunk_cycle() {
        assert!(Idle.can_transition_to(Fetching));
        assert!(Fetching.can_transition_to(Processing { chunk: 1 }));
        assert!(Processing { chunk: 1 }.can_transition_to(Writing { chunk: 1 }));
        assert!(!Processing { chunk: 1 }.can_transition_to(Writing { chunk: 2 }));
        assert!(Writing { chunk: 1 }.can_transition_to(Fetching));
        assert!(Fetching.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states_are_final() {
        for state in [Completed, Failed] {
            assert!(state.is_terminal());
            assert!(!state.can_transition_to(Fetching));
            assert!(!state.can_transition_to(Failed));
        }
        assert!(!Idle.can_transition_to(Failed));
    }
}

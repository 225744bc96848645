// crates/boxscore-core/src/error.rs

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::sink::SinkError;
use crate::source::SourceError;
use crate::types::RowKey;

/// Which half of a paired box score a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Team,
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Team => f.write_str("team"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcFailure {
    ZeroDenominator,
    Overflow,
}

impl fmt::Display for CalcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcFailure::ZeroDenominator => f.write_str("denominator is zero"),
            CalcFailure::Overflow => f.write_str("decimal overflow"),
        }
    }
}

/// A derived metric that could not be computed for a row.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{metric}: {failure}")]
pub struct CalcError {
    pub metric: &'static str,
    pub failure: CalcFailure,
}

impl CalcError {
    pub fn zero_denominator(metric: &'static str) -> Self {
        Self {
            metric,
            failure: CalcFailure::ZeroDenominator,
        }
    }

    pub fn overflow(metric: &'static str) -> Self {
        Self {
            metric,
            failure: CalcFailure::Overflow,
        }
    }
}

/// Raw counting stats that violate the box-score contract.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is negative ({value})")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("{category} made ({made}) exceeds attempts ({attempts})")]
    MadeExceedsAttempts {
        category: &'static str,
        made: u16,
        attempts: u16,
    },

    #[error("three-point {field} ({three_point}) exceeds field-goal {field} ({field_goal})")]
    ThreePointExceedsFieldGoal {
        field: &'static str,
        three_point: u16,
        field_goal: u16,
    },

    #[error("minutes played must be greater than zero")]
    ZeroMinutes,

    #[error("unrecognized {field} value '{value}'")]
    UnknownValue { field: &'static str, value: String },
}

/// Why a single row could not be enriched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    #[error("{}invalid counts: {source}", side_prefix(.side))]
    Validation {
        side: Option<Side>,
        source: ValidationError,
    },

    #[error("{}{source}", side_prefix(.side))]
    Calculation {
        side: Option<Side>,
        source: CalcError,
    },
}

fn side_prefix(side: &Option<Side>) -> String {
    side.map(|side| format!("{side} ")).unwrap_or_default()
}

impl RowError {
    pub fn validation(side: Option<Side>) -> impl Fn(ValidationError) -> RowError {
        move |source| RowError::Validation { side, source }
    }

    pub fn calculation(side: Option<Side>) -> impl Fn(CalcError) -> RowError {
        move |source| RowError::Calculation { side, source }
    }

    /// Name of the failing formula, when the failure came from the calculation engine.
    pub fn metric(&self) -> Option<&'static str> {
        match self {
            RowError::Calculation { source, .. } => Some(source.metric),
            RowError::Validation { .. } => None,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            RowError::Validation { side, .. } | RowError::Calculation { side, .. } => *side,
        }
    }
}

/// A row that failed enrichment, identified by its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{key}: {error}")]
pub struct RowFailure {
    pub key: RowKey,
    #[source]
    pub error: RowError,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("row source failed: {0}")]
    Source(#[from] SourceError),

    #[error("row rejected: {0}")]
    Row(#[from] RowFailure),

    #[error("delivery of chunk {chunk} failed: {source}")]
    Delivery {
        chunk: usize,
        #[source]
        source: SinkError,
    },

    #[error("{count} row(s) failed enrichment and were not delivered")]
    RowsRejected { count: usize },
}

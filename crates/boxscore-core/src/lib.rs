pub mod boxscores;
pub mod calculations;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod types;

pub use boxscores::{
    BoxScore, OfficialBoxScore, PlayerBoxScore, RawOfficialBoxScore, RawPlayerBoxScore,
    RawTeamBoxScore, TeamBoxScore,
};
pub use config::{
    AggregateKind, ConfigError, ConfigFile, DatabaseConfig, DateWindow, Destination, ErrorPolicy,
    RunConfig, RunOverrides, WriterConfig,
};
pub use error::{CalcError, PipelineError, RowError, RowFailure, ValidationError};
pub use output::{FieldValue, OutputRecord};
pub use pipeline::{Pipeline, PipelineState, RunFailure, RunSummary};
pub use sink::{BoxScoreSink, DatabaseSink, FileSink, SinkError};
pub use source::{MemoryRowSource, PgMapped, PgRowSource, RowSource, SourceError};

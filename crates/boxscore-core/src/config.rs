// crates/boxscore-core/src/config.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 20;

pub const SOURCE_DATABASE_URL_ENV: &str = "BOXSCORE_SOURCE_DATABASE_URL";
pub const TARGET_DATABASE_URL_ENV: &str = "BOXSCORE_TARGET_DATABASE_URL";
pub const FALLBACK_DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid date '{value}' for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("date window is inverted: from {from} is after to {to}")]
    InvertedWindow { from: NaiveDate, to: NaiveDate },

    #[error("unknown aggregate kind '{0}', expected team, official or player")]
    UnknownKind(String),

    #[error("unknown writer destination '{0}', expected database or file")]
    UnknownDestination(String),

    #[error("unknown error policy '{0}', expected fail_fast or best_effort")]
    UnknownErrorPolicy(String),

    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("file destination requires an extract directory")]
    MissingExtractDir,

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Team,
    Official,
    Player,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Team => "team",
            AggregateKind::Official => "official",
            AggregateKind::Player => "player",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" => Ok(AggregateKind::Team),
            "official" => Ok(AggregateKind::Official),
            "player" => Ok(AggregateKind::Player),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Database,
    File,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Database => "database",
            Destination::File => "file",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "database" => Ok(Destination::Database),
            "file" => Ok(Destination::File),
            other => Err(ConfigError::UnknownDestination(other.to_string())),
        }
    }
}

/// What happens when a row cannot be enriched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The first failing row fails the run before its chunk is delivered.
    #[default]
    FailFast,
    /// Failing rows are excluded and recorded; the run still reports failure at the end.
    BestEffort,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::FailFast => "fail_fast",
            ErrorPolicy::BestEffort => "best_effort",
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail_fast" => Ok(ErrorPolicy::FailFast),
            "best_effort" => Ok(ErrorPolicy::BestEffort),
            other => Err(ConfigError::UnknownErrorPolicy(other.to_string())),
        }
    }
}

/// Parses an ISO calendar date supplied for `field`.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Closed interval of game dates, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ConfigError> {
        if from > to {
            return Err(ConfigError::InvertedWindow { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// First instant of `from`.
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// Last representable microsecond of `to`.
    pub fn end(&self) -> NaiveDateTime {
        self.to.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::microseconds(1)
    }
}

/// Resolved writer settings. The extract directory only exists for the file variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    Database,
    File { extract_dir: PathBuf },
}

impl WriterConfig {
    pub fn destination(&self) -> Destination {
        match self {
            WriterConfig::Database => Destination::Database,
            WriterConfig::File { .. } => Destination::File,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriterSection {
    pub destination: Option<Destination>,
    pub extract_dir: Option<PathBuf>,
}

/// On-disk TOML run settings. Every field may be overridden from the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub chunk_size: Option<usize>,
    pub error_policy: Option<ErrorPolicy>,
    #[serde(default)]
    pub writer: WriterSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Command-line values layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub destination: Option<Destination>,
    pub extract_dir: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub error_policy: Option<ErrorPolicy>,
}

/// Immutable settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    kind: AggregateKind,
    window: DateWindow,
    writer: WriterConfig,
    chunk_size: usize,
    error_policy: ErrorPolicy,
}

impl RunConfig {
    pub fn new(kind: AggregateKind, window: DateWindow, writer: WriterConfig) -> Self {
        Self {
            kind,
            window,
            writer,
            chunk_size: DEFAULT_CHUNK_SIZE,
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// Merges file settings and overrides. Overrides win; a missing destination means
    /// the database sink.
    pub fn resolve(
        kind: AggregateKind,
        file: ConfigFile,
        overrides: RunOverrides,
    ) -> Result<Self, ConfigError> {
        let from = overrides
            .from_date
            .or(file.from_date)
            .ok_or(ConfigError::Missing("from_date"))?;
        let to = overrides
            .to_date
            .or(file.to_date)
            .ok_or(ConfigError::Missing("to_date"))?;
        let window = DateWindow::new(from, to)?;

        let destination = overrides
            .destination
            .or(file.writer.destination)
            .unwrap_or(Destination::Database);
        let writer = match destination {
            Destination::Database => WriterConfig::Database,
            Destination::File => WriterConfig::File {
                extract_dir: overrides
                    .extract_dir
                    .or(file.writer.extract_dir)
                    .ok_or(ConfigError::MissingExtractDir)?,
            },
        };

        let chunk_size = overrides
            .chunk_size
            .or(file.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        let error_policy = overrides
            .error_policy
            .or(file.error_policy)
            .unwrap_or_default();

        RunConfig::new(kind, window, writer)
            .with_chunk_size(chunk_size)
            .map(|config| config.with_error_policy(error_policy))
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn writer(&self) -> &WriterConfig {
        &self.writer
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }
}

/// Connection strings for the upstream statistics database and the aggregate target.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub source_url: String,
    pub target_url: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let source_url = std::env::var(SOURCE_DATABASE_URL_ENV)
            .or_else(|_| std::env::var(FALLBACK_DATABASE_URL_ENV))
            .map_err(|_| ConfigError::MissingEnv(SOURCE_DATABASE_URL_ENV))?;
        let target_url =
            std::env::var(TARGET_DATABASE_URL_ENV).unwrap_or_else(|_| source_url.clone());
        Ok(Self {
            source_url,
            target_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_date("test", value).unwrap()
    }

    #[test]
    fn window_bounds_cover_whole_days() {
        let window = DateWindow::new(date("2016-10-26"), date("2016-10-27")).unwrap();
        assert_eq!(window.start().to_string(), "2016-10-26 00:00:00");
        assert_eq!(window.end().to_string(), "2016-10-27 23:59:59.999999");
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = DateWindow::new(date("2016-10-27"), date("2016-10-26")).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedWindow { .. }));
    }

    #[test]
    fn single_day_window_is_allowed() {
        let day = date("2016-10-26");
        assert!(DateWindow::new(day, day).is_ok());
    }
}

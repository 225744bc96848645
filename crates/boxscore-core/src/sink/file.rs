use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{BoxScoreSink, SinkError};
use crate::output::OutputRecord;

/// Writes header-less comma-delimited lines to an extract file.
///
/// The file is truncated when the sink is created, so each run replaces the previous
/// extract. Every chunk is encoded in memory first and appended with a single write.
pub struct FileSink {
    path: PathBuf,
    file: tokio::fs::File,
}

impl FileSink {
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        info!(path = %path.display(), "Creating extract file");
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|source| io_error(&path, source))?;

        Ok(Self { path, file })
    }

    /// Opens `R::EXTRACT_FILE` inside `dir`.
    pub async fn in_dir<R: OutputRecord>(dir: &Path) -> Result<Self, SinkError> {
        Self::create(dir.join(R::EXTRACT_FILE)).await
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn encode_rows<R: OutputRecord>(rows: &[R]) -> Result<Vec<u8>, SinkError> {
    let columns = R::columns().len();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for row in rows {
        let fields: Vec<String> = row.values().iter().map(|value| value.to_field()).collect();
        if fields.len() != columns {
            return Err(SinkError::Layout {
                columns,
                values: fields.len(),
            });
        }
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|err| SinkError::Csv(csv::Error::from(err.into_error())))
}

#[async_trait]
impl<R> BoxScoreSink<R> for FileSink
where
    R: OutputRecord + Sync,
{
    async fn write_chunk(&mut self, rows: &[R]) -> Result<(), SinkError> {
        let buffer = encode_rows(rows)?;
        self.file
            .write_all(&buffer)
            .await
            .map_err(|source| io_error(&self.path, source))?;
        self.file
            .flush()
            .await
            .map_err(|source| io_error(&self.path, source))?;

        debug!(path = %self.path.display(), rows = rows.len(), "Appended chunk");
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.file
            .sync_all()
            .await
            .map_err(|source| io_error(&self.path, source))
    }
}

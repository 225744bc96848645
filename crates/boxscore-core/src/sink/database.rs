use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{BoxScoreSink, SinkError};
use crate::output::{FieldValue, OutputRecord};

/// Postgres caps a single statement at this many bind parameters.
const MAX_BIND_PARAMETERS: usize = 65_535;

/// Inserts each chunk into the record's table inside one transaction.
#[derive(Clone)]
pub struct DatabaseSink {
    pool: PgPool,
}

impl DatabaseSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn insert_statement<'r, R: OutputRecord>(
        rows: &'r [R],
    ) -> Result<QueryBuilder<'r, Postgres>, SinkError> {
        let columns = R::columns();
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            R::TABLE,
            columns.join(", ")
        ));

        let mut layout_error = None;
        builder.push_values(rows, |mut row_builder, row| {
            let values = row.values();
            if values.len() != columns.len() && layout_error.is_none() {
                layout_error = Some(SinkError::Layout {
                    columns: columns.len(),
                    values: values.len(),
                });
            }
            for value in values {
                match value {
                    FieldValue::Text(text) => row_builder.push_bind(text),
                    FieldValue::Count(count) => row_builder.push_bind(count),
                    FieldValue::Decimal(decimal) => row_builder.push_bind(decimal),
                    FieldValue::Timestamp(timestamp) => row_builder.push_bind(timestamp),
                };
            }
        });

        match layout_error {
            Some(err) => Err(err),
            None => Ok(builder),
        }
    }
}

#[async_trait]
impl<R> BoxScoreSink<R> for DatabaseSink
where
    R: OutputRecord + Sync,
{
    async fn write_chunk(&mut self, rows: &[R]) -> Result<(), SinkError> {
        if rows.is_empty() {
            return Ok(());
        }

        let rows_per_statement = (MAX_BIND_PARAMETERS / R::columns().len()).max(1);
        let mut tx = self.pool.begin().await?;
        for batch in rows.chunks(rows_per_statement) {
            let mut statement = Self::insert_statement(batch)?;
            statement.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        debug!(table = R::TABLE, rows = rows.len(), "Committed chunk");
        Ok(())
    }
}

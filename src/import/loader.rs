//! Batch Loader - inserts every row of one import inside a single transaction

use crate::db::sql::{insert_sql, rows_per_statement};
use crate::error::{ImportError, Result};
use crate::import::schema::TableDefinition;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, Transaction};
use tracing::{debug, warn};

pub struct BatchLoader {
    pool: PgPool,
    rows_per_statement: usize,
}

impl BatchLoader {
    /// `rows_per_statement` of 1 inserts row by row; larger values put several
    /// rows in one `VALUES` list, capped by the bind-parameter limit.
    pub fn new(pool: PgPool, rows_per_statement: usize) -> Self {
        Self {
            pool,
            rows_per_statement: rows_per_statement.max(1),
        }
    }

    /// Insert `rows` in order. Either all rows are committed or none are.
    ///
    /// Each row holds one cell per column of `def`, in column order.
    pub async fn load(&self, def: &TableDefinition, rows: &[Vec<String>]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        match self.insert_all(&mut tx, def, rows).await {
            Ok(inserted) if inserted == rows.len() as u64 => {
                tx.commit().await?;
                Ok(inserted)
            }
            Ok(inserted) => {
                rollback(tx).await;
                Err(ImportError::RowCountMismatch {
                    expected: rows.len() as u64,
                    actual: inserted,
                })
            }
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            }
        }
    }

    async fn insert_all(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        def: &TableDefinition,
        rows: &[Vec<String>],
    ) -> std::result::Result<u64, sqlx::Error> {
        let chunk_size = rows_per_statement(self.rows_per_statement, def.columns.len());
        let full_chunk_sql = insert_sql(&def.table_name, def.column_names(), chunk_size);
        let mut inserted = 0u64;

        for (idx, chunk) in rows.chunks(chunk_size).enumerate() {
            let partial_sql;
            let sql = if chunk.len() == chunk_size {
                &full_chunk_sql
            } else {
                partial_sql = insert_sql(&def.table_name, def.column_names(), chunk.len());
                &partial_sql
            };

            let mut query = sqlx::query(sql);
            for row in chunk {
                for value in row {
                    query = query.bind(value.as_str());
                }
            }

            let done = query.execute(&mut **tx).await.map_err(|e| {
                debug!(statement = idx, error = %e, "Insert failed");
                e
            })?;
            inserted += done.rows_affected();
        }

        Ok(inserted)
    }
}

async fn rollback(tx: Transaction<'static, Postgres>) {
    // Dropping the transaction rolls back as well; this surfaces rollback errors.
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}

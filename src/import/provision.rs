//! Table Provisioner - drop-then-create of the target table
//!
//! This is destructive: any existing table with the target name is dropped
//! together with its data. Callers get no backup.

use crate::db::sql::{create_table_sql, drop_table_sql};
use crate::import::schema::TableDefinition;
use sqlx::PgPool;
use tracing::{debug, info};

pub struct TableProvisioner {
    pool: PgPool,
}

impl TableProvisioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recreate `def.table_name` with the columns of `def`.
    ///
    /// Drop and create share one transaction, so a failing `CREATE TABLE`
    /// leaves whatever table existed before in place.
    pub async fn provision(&self, def: &TableDefinition) -> Result<(), sqlx::Error> {
        let drop_sql = drop_table_sql(&def.table_name);
        let create_sql = create_table_sql(def);
        debug!(sql = %create_sql, "Provisioning table");

        let mut tx = self.pool.begin().await?;
        sqlx::query(&drop_sql).execute(&mut *tx).await?;
        sqlx::query(&create_sql).execute(&mut *tx).await?;
        tx.commit().await?;

        info!(
            table = %def.table_name,
            columns = def.columns.len(),
            primary_key = def.primary_key().map(|c| c.name.as_str()).unwrap_or("<none>"),
            "Table recreated"
        );
        Ok(())
    }
}

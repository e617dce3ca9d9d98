//! Storage seam for the import pipeline

use crate::error::Result;
use crate::import::loader::BatchLoader;
use crate::import::provision::TableProvisioner;
use crate::import::schema::TableDefinition;
use async_trait::async_trait;
use sqlx::PgPool;

/// Database operations the orchestrator needs.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Drop and recreate the table described by `def`.
    async fn provision(&self, def: &TableDefinition) -> Result<()>;

    /// Insert all rows atomically and return how many were inserted.
    async fn load(&self, def: &TableDefinition, rows: &[Vec<String>]) -> Result<u64>;
}

/// PostgreSQL-backed store sharing one connection pool.
pub struct PgImportStore {
    provisioner: TableProvisioner,
    loader: BatchLoader,
}

impl PgImportStore {
    pub fn new(pool: PgPool, rows_per_statement: usize) -> Self {
        Self {
            provisioner: TableProvisioner::new(pool.clone()),
            loader: BatchLoader::new(pool, rows_per_statement),
        }
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn provision(&self, def: &TableDefinition) -> Result<()> {
        Ok(self.provisioner.provision(def).await?)
    }

    async fn load(&self, def: &TableDefinition, rows: &[Vec<String>]) -> Result<u64> {
        self.loader.load(def, rows).await
    }
}

//! Import Orchestrator - runs one import from parsed rows to committed table
//!
//! Stages run strictly in order; the first failure ends the import:
//! Received -> Parsed -> MappingBuilt -> TableProvisioned -> Loaded -> Completed
//! An `ImportError` is the terminal failed state; the last stage reached is logged with it.

use crate::error::{ImportError, Result, ValidationError};
use crate::import::mapping::ColumnMapping;
use crate::import::schema::TableDefinition;
use crate::import::store::ImportStore;
use crate::import::ImportResult;
use crate::ingestion::{read_csv, Dataset};
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportStage {
    Received,
    Parsed,
    MappingBuilt,
    TableProvisioned,
    Loaded,
    Completed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Received => "received",
            ImportStage::Parsed => "parsed",
            ImportStage::MappingBuilt => "mapping_built",
            ImportStage::TableProvisioned => "table_provisioned",
            ImportStage::Loaded => "loaded",
            ImportStage::Completed => "completed",
        };
        f.write_str(name)
    }
}

pub struct ImportOrchestrator {
    store: Arc<dyn ImportStore>,
    timeout: Option<Duration>,
}

impl ImportOrchestrator {
    pub fn new(store: Arc<dyn ImportStore>) -> Self {
        Self { store, timeout: None }
    }

    /// Abort the whole pipeline after `timeout`. An open load transaction is
    /// rolled back when the pipeline future is dropped.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse `reader` as CSV and import it into `table_name`.
    ///
    /// Parsing runs on the calling task, so this is meant for small in-memory
    /// readers. Uploaded files are parsed with `read_csv_file` under
    /// `spawn_blocking` and handed to [`import_dataset`](Self::import_dataset).
    pub async fn import<R: Read>(&self, table_name: &str, reader: R) -> Result<ImportResult> {
        validate_table_name(table_name)?;
        let dataset = read_csv(reader)?;
        self.import_dataset(table_name, &dataset).await
    }

    /// Import already parsed rows into `table_name`. Every row must have one
    /// cell per header; a ragged row is rejected before the table is touched.
    pub async fn import_dataset(&self, table_name: &str, dataset: &Dataset) -> Result<ImportResult> {
        let import_id = Uuid::new_v4();
        let span = info_span!("import", %import_id, table = %table_name);
        let mut stage = ImportStage::Received;

        let pipeline = self.run(table_name, dataset, &mut stage).instrument(span.clone());
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pipeline)
                .await
                .unwrap_or(Err(ImportError::Timeout(limit))),
            None => pipeline.await,
        };

        let _entered = span.enter();
        match outcome {
            Ok(result) => {
                info!(rows = result.rows_imported, "Import finished");
                Ok(result)
            }
            Err(e) => {
                error!(last_stage = %stage, error = %e, "Import failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        table_name: &str,
        dataset: &Dataset,
        stage: &mut ImportStage,
    ) -> Result<ImportResult> {
        validate_table_name(table_name)?;
        if dataset.is_empty() {
            return Err(ValidationError::EmptyDataset.into());
        }
        check_row_widths(dataset)?;
        advance(stage, ImportStage::Parsed);

        let mapping = ColumnMapping::from_headers(&dataset.headers)?;
        info!(
            column_mapping = %serde_json::to_string(&mapping).unwrap_or_default(),
            "Column mapping"
        );
        advance(stage, ImportStage::MappingBuilt);

        let definition = TableDefinition::from_mapping(table_name, &mapping);
        self.store.provision(&definition).await?;
        advance(stage, ImportStage::TableProvisioned);

        let inserted = self.store.load(&definition, &dataset.rows).await?;
        advance(stage, ImportStage::Loaded);

        advance(stage, ImportStage::Completed);
        Ok(ImportResult::success(inserted, mapping))
    }
}

fn advance(stage: &mut ImportStage, next: ImportStage) {
    debug!(from = %stage, to = %next, "Import stage");
    *stage = next;
}

// Rows are bound cell by cell into multi-row statements, so a short row
// followed by a long one would shift values into the wrong columns.
fn check_row_widths(dataset: &Dataset) -> std::result::Result<(), ValidationError> {
    let expected = dataset.headers.len();
    match dataset.rows.iter().position(|row| row.len() != expected) {
        Some(index) => Err(ValidationError::RowWidth {
            row: index + 1,
            expected,
            found: dataset.rows[index].len(),
        }),
        None => Ok(()),
    }
}

fn validate_table_name(table_name: &str) -> std::result::Result<(), ValidationError> {
    if table_name.trim().is_empty() {
        return Err(ValidationError::MissingTableName);
    }
    Ok(())
}

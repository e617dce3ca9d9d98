//! Import pipeline: sanitize headers, derive the schema, recreate the table,
//! load every row in one transaction.
//!
//! Two concurrent imports into the same table name are not coordinated: one
//! import's drop-and-create can land between the other's provisioning and
//! load. Callers that need isolation must serialize imports per table.

pub mod loader;
pub mod mapping;
pub mod orchestrator;
pub mod provision;
pub mod sanitize;
pub mod schema;
pub mod store;

pub use loader::BatchLoader;
pub use mapping::{ColumnMapping, ColumnPair};
pub use orchestrator::ImportOrchestrator;
pub use provision::TableProvisioner;
pub use sanitize::sanitize;
pub use schema::{ColumnDef, ColumnType, TableDefinition};
pub use store::{ImportStore, PgImportStore};

use serde::Serialize;

/// Outcome of a successful import, as reported to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub column_mapping: ColumnMapping,
    #[serde(skip)]
    pub rows_imported: u64,
}

impl ImportResult {
    pub fn success(rows_imported: u64, column_mapping: ColumnMapping) -> Self {
        Self {
            success: true,
            message: format!("Successfully imported {rows_imported} rows"),
            column_mapping,
            rows_imported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_result_json_shape() {
        let mapping = ColumnMapping::from_headers(&["id", "Full Name"]).unwrap();
        let result = ImportResult::success(2, mapping);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "Successfully imported 2 rows",
                "columnMapping": { "id": "id", "Full Name": "full_name" }
            })
        );
    }
}

//! Schema Builder - derives an all-text table definition from a column mapping

use crate::import::mapping::ColumnMapping;

/// Only a column with exactly this sanitized name becomes the primary key.
pub const PRIMARY_KEY_COLUMN: &str = "id";

/// Storage type of every column. Type inference is intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDefinition {
    pub fn from_mapping(table_name: &str, mapping: &ColumnMapping) -> Self {
        let columns = mapping
            .sanitized_columns()
            .map(|name| ColumnDef {
                name: name.to_string(),
                column_type: ColumnType::Text,
                primary_key: name == PRIMARY_KEY_COLUMN,
            })
            .collect();

        Self {
            table_name: table_name.to_string(),
            columns,
        }
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_column_becomes_primary_key() {
        let mapping = ColumnMapping::from_headers(&["ID", "Full Name", "3rd Col"]).unwrap();
        let def = TableDefinition::from_mapping("people", &mapping);

        assert_eq!(def.table_name, "people");
        assert_eq!(def.columns.len(), 3);
        assert!(def.columns.iter().all(|c| c.column_type == ColumnType::Text));
        assert_eq!(def.primary_key().map(|c| c.name.as_str()), Some("id"));
        assert_eq!(def.columns.iter().filter(|c| c.primary_key).count(), 1);
    }

    #[test]
    fn test_no_id_column_means_no_primary_key() {
        let mapping = ColumnMapping::from_headers(&["user_id", "identifier", "name"]).unwrap();
        let def = TableDefinition::from_mapping("people", &mapping);
        assert!(def.primary_key().is_none());
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use csv_table_import::import::{ImportStore, TableDefinition};
use csv_table_import::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Provision(String),
    Load { table: String, rows: usize },
}

#[derive(Debug, Clone, Default)]
pub struct MemTable {
    pub columns: Vec<String>,
    pub primary_key: Option<String>,
    pub rows: Vec<Vec<String>>,
}

/// In-memory stand-in for PostgreSQL: drop-and-create replaces the table,
/// loads are all-or-nothing and a primary key rejects duplicate values.
#[derive(Default)]
pub struct RecordingStore {
    pub calls: Mutex<Vec<StoreCall>>,
    pub tables: Mutex<HashMap<String, MemTable>>,
    pub fail_provision: Option<String>,
    pub delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_provision(message: &str) -> Self {
        Self {
            fail_provision: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn table(&self, name: &str) -> Option<MemTable> {
        self.tables.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl ImportStore for RecordingStore {
    async fn provision(&self, def: &TableDefinition) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Provision(def.table_name.clone()));

        if let Some(message) = &self.fail_provision {
            return Err(sqlx::Error::Protocol(message.clone()).into());
        }

        let table = MemTable {
            columns: def.column_names().map(str::to_string).collect(),
            primary_key: def.primary_key().map(|c| c.name.clone()),
            rows: Vec::new(),
        };
        self.tables
            .lock()
            .unwrap()
            .insert(def.table_name.clone(), table);
        Ok(())
    }

    async fn load(&self, def: &TableDefinition, rows: &[Vec<String>]) -> Result<u64> {
        self.calls.lock().unwrap().push(StoreCall::Load {
            table: def.table_name.clone(),
            rows: rows.len(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut tables = self.tables.lock().unwrap();
        let table = tables.get_mut(&def.table_name).ok_or_else(|| {
            sqlx::Error::Protocol(format!("relation \"{}\" does not exist", def.table_name))
        })?;

        let key_index = table
            .primary_key
            .as_ref()
            .and_then(|pk| table.columns.iter().position(|c| c == pk));

        // Stage everything first so a failure leaves the table untouched.
        let mut seen: HashSet<String> = match key_index {
            Some(idx) => table.rows.iter().map(|r| r[idx].clone()).collect(),
            None => HashSet::new(),
        };
        for row in rows {
            if let Some(idx) = key_index {
                if !seen.insert(row[idx].clone()) {
                    return Err(sqlx::Error::Protocol(format!(
                        "duplicate key value violates unique constraint: {}",
                        row[idx]
                    ))
                    .into());
                }
            }
        }

        table.rows.extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }
}

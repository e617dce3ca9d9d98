pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod ingestion;
pub mod observability;

pub use config::{DbConfig, ServerConfig};
pub use error::{ImportError, Result, ValidationError};
pub use import::{ImportOrchestrator, ImportResult, ImportStore, PgImportStore};
pub use ingestion::Dataset;

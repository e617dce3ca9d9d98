use std::time::Duration;
use thiserror::Error;

/// Problems detected before the database is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Table name is required")]
    MissingTableName,

    #[error("CSV file is empty")]
    EmptyDataset,

    #[error("Columns \"{first}\" and \"{second}\" both map to column \"{sanitized}\"")]
    DuplicateColumn {
        first: String,
        second: String,
        sanitized: String,
    },

    #[error("Failed to parse CSV: {0}")]
    MalformedCsv(String),

    #[error("Row {row} has {found} fields but the header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Inserted {actual} rows but the file has {expected}")]
    RowCountMismatch { expected: u64, actual: u64 },

    #[error("Import timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// HTTP status the request boundary reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ImportError::Validation(_) => 400,
            _ => 500,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Validation(ValidationError::MalformedCsv(err.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let err: ImportError = ValidationError::EmptyDataset.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "CSV file is empty");
    }

    #[test]
    fn database_errors_keep_the_driver_message() {
        let err: ImportError = sqlx::Error::Protocol("connection reset".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn row_width_names_the_row() {
        let err: ImportError = ValidationError::RowWidth {
            row: 2,
            expected: 2,
            found: 1,
        }
        .into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Row 2 has 1 fields but the header has 2");
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = ImportError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Import timed out after 30 seconds");
        assert_eq!(err.status_code(), 500);
    }
}

//! SQL text for the import pipeline
//!
//! Identifiers are always double-quoted with embedded quotes doubled, which is
//! PostgreSQL's own escaping rule. Cell values never appear in SQL text; they
//! are bound as `$n` parameters.

use crate::import::schema::TableDefinition;
use itertools::Itertools;

/// PostgreSQL's hard limit on bind parameters in one statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_identifier(table_name))
}

pub fn create_table_sql(def: &TableDefinition) -> String {
    let columns = def
        .columns
        .iter()
        .map(|col| {
            let mut line = format!("{} {}", quote_identifier(&col.name), col.column_type.sql_name());
            if col.primary_key {
                line.push_str(" PRIMARY KEY");
            }
            line
        })
        .join(",\n  ");

    format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_identifier(&def.table_name),
        columns
    )
}

/// `INSERT` with `row_count` value tuples of `$n` placeholders.
pub fn insert_sql<'a, I>(table_name: &str, columns: I, row_count: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let columns: Vec<String> = columns.into_iter().map(quote_identifier).collect();
    let width = columns.len();

    let tuples = (0..row_count)
        .map(|row| {
            let placeholders = (1..=width).map(|col| format!("${}", row * width + col)).join(", ");
            format!("({placeholders})")
        })
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_identifier(table_name),
        columns.join(", "),
        tuples
    )
}

/// Largest number of rows that fits one statement, given the requested batch
/// size and the bind-parameter limit.
pub fn rows_per_statement(requested: usize, column_count: usize) -> usize {
    let limit = MAX_BIND_PARAMS / column_count.max(1);
    requested.clamp(1, limit.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::mapping::ColumnMapping;

    fn definition(table: &str, headers: &[&str]) -> TableDefinition {
        TableDefinition::from_mapping(table, &ColumnMapping::from_headers(headers).unwrap())
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("people"), "\"people\"");
        assert_eq!(quote_identifier("Mixed Case"), "\"Mixed Case\"");
        assert_eq!(
            quote_identifier("x\"; DROP TABLE users; --"),
            "\"x\"\"; DROP TABLE users; --\""
        );
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(drop_table_sql("people"), "DROP TABLE IF EXISTS \"people\"");
    }

    #[test]
    fn test_create_table_sql() {
        let def = definition("people", &["id", "Full Name", "3rd Col"]);
        assert_eq!(
            create_table_sql(&def),
            "CREATE TABLE \"people\" (\n  \"id\" TEXT PRIMARY KEY,\n  \"full_name\" TEXT,\n  \"col_3rd_col\" TEXT\n)"
        );
    }

    #[test]
    fn test_create_table_escapes_table_name() {
        let def = definition("evil\"name", &["a"]);
        assert!(create_table_sql(&def).starts_with("CREATE TABLE \"evil\"\"name\" ("));
    }

    #[test]
    fn test_insert_sql_single_row() {
        let sql = insert_sql("people", ["id", "full_name"], 1);
        assert_eq!(sql, "INSERT INTO \"people\" (\"id\", \"full_name\") VALUES ($1, $2)");
    }

    #[test]
    fn test_insert_sql_multi_row() {
        let sql = insert_sql("t", ["a", "b"], 3);
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2), ($3, $4), ($5, $6)"
        );
    }

    #[test]
    fn test_rows_per_statement_respects_bind_limit() {
        assert_eq!(rows_per_statement(1, 10), 1);
        assert_eq!(rows_per_statement(500, 10), 500);
        assert_eq!(rows_per_statement(100_000, 10), 6_553);
        assert_eq!(rows_per_statement(0, 3), 1);
        assert_eq!(rows_per_statement(10, 70_000), 1);
    }
}

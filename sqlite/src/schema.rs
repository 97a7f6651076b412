//! SQL generation with customizable table prefixes.
//!
//! The store uses a single table, `{prefix}kv`, holding one JSON document
//! per key. The prefix lets several isolated stores share one database
//! file (e.g. one per terminal profile).

use crate::error::{Result, SqliteError};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Name of the key-value table for `prefix`.
pub(crate) fn kv_table(prefix: &str) -> String {
    format!("{prefix}kv")
}

/// Generates the `CREATE` statements for the store.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix is empty or contains
/// characters other than alphanumerics and underscores.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#
    );

    Ok(sql)
}

/// Generates the `DROP` statements for the store.
pub fn generate_drop_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;
    Ok(format!("DROP TABLE IF EXISTS {prefix}kv;\n"))
}

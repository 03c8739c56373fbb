/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use duckdb::{Config, Connection};

pub const DEFAULT_MEMORY_GIG: u32 = 1;
pub const DEFAULT_THREADS: i64 = 4;

/// In-memory database holding one session's augmented log table.
pub fn duckdb_open_memory(mem_gig: u32) -> Result<Connection, duckdb::Error> {
    let mem_threshold = format!("{}GB", mem_gig);

    let config = Config::default()
        .max_memory(&mem_threshold)?
        .threads(DEFAULT_THREADS)?;

    Connection::open_in_memory_with_flags(config)
}

/// Renders an integer list for a SQL `IN (...)` clause.
pub fn sql_integer_list(values: &[i64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders a quoted string list for a SQL `IN (...)` clause.
pub fn sql_string_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("'{}'", value.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = duckdb_open_memory(DEFAULT_MEMORY_GIG).expect("open in-memory duckdb");
        let value: i64 = conn
            .query_row("SELECT 40 + 2", [], |row| row.get(0))
            .expect("query_row");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_sql_lists() {
        assert_eq!(sql_integer_list(&[80, 443]), "80,443");
        assert_eq!(sql_string_list(&["deny", "o'brien"]), "'deny','o''brien'");
    }
}

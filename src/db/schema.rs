use anyhow::{Context, Result};
use rusqlite::Connection;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA: &str = include_str!("migrations/001_initial.sql");

/// Create the saved layout tables unless `user_version` says they exist.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    if schema_version(conn)? >= SCHEMA_VERSION {
        return Ok(());
    }

    tracing::info!("Creating saved layout schema v{}", SCHEMA_VERSION);
    conn.execute_batch(&format!(
        "BEGIN TRANSACTION; {} PRAGMA user_version = {}; COMMIT;",
        SCHEMA, SCHEMA_VERSION
    ))
    .context("Failed to create saved layout schema")
}

fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_saved_layouts() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='saved_layouts'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn running_twice_keeps_the_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}

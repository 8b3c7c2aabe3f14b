mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{SavedLayout, SavedLayoutWithBlob};

/// Saved layout storage for the fixture provider.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "agile-map")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("agile-map.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Saved layouts
    // ============================================================

    /// Store a map blob as the next version.
    pub fn save_layout(&self, json: &str) -> Result<SavedLayout> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let version: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM saved_layouts",
            [],
            |row| row.get(0),
        )?;
        let bytes = json.len() as i64;

        conn.execute(
            "INSERT INTO saved_layouts (id, version, json, bytes, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (id.to_string(), version, json, bytes, now.to_rfc3339()),
        )?;

        Ok(SavedLayout {
            id,
            version,
            bytes,
            created_at: now,
        })
    }

    /// All versions, newest first.
    pub fn list_layouts(&self) -> Result<Vec<SavedLayout>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, version, bytes, created_at
             FROM saved_layouts ORDER BY version DESC",
        )?;

        let layouts = stmt
            .query_map([], layout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(layouts)
    }

    pub fn get_layout(&self, version: i64) -> Result<Option<SavedLayoutWithBlob>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let layout = conn
            .query_row(
                "SELECT id, version, bytes, created_at, json
                 FROM saved_layouts WHERE version = ?",
                [version],
                blob_from_row,
            )
            .optional()?;
        Ok(layout)
    }

    pub fn latest_layout(&self) -> Result<Option<SavedLayoutWithBlob>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let layout = conn
            .query_row(
                "SELECT id, version, bytes, created_at, json
                 FROM saved_layouts ORDER BY version DESC LIMIT 1",
                [],
                blob_from_row,
            )
            .optional()?;
        Ok(layout)
    }
}

fn layout_from_row(row: &Row<'_>) -> rusqlite::Result<SavedLayout> {
    Ok(SavedLayout {
        id: parse_uuid(row.get::<_, String>(0)?),
        version: row.get(1)?,
        bytes: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn blob_from_row(row: &Row<'_>) -> rusqlite::Result<SavedLayoutWithBlob> {
    Ok(SavedLayoutWithBlob {
        layout: layout_from_row(row)?,
        json: row.get(4)?,
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

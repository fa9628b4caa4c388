//! Database Connection and Setup
//!
//! Opens the SQLite file behind `SqliteStore` and brings its schema up to date.

use rusqlite::Connection;
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

/// Open (or create) the database at `db_path` and run migrations
pub fn open_db(db_path: &Path) -> DomainResult<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Internal(format!("Failed to create db dir: {}", e)))?;
        }
    }
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open db: {}", e)))?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema (tests, dry runs)
pub fn open_in_memory() -> DomainResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| DomainError::Internal(format!("Failed to open db: {}", e)))?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    let mut rows = stmt.query([]).map_err(|e| DomainError::Internal(e.to_string()))?;
    while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
        let name: String = row.get(1).map_err(|e| DomainError::Internal(e.to_string()))?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
///
/// Column types double as conversion hints for the store:
/// `BOOLEAN` reads back as true/false, `JSON` as structured values,
/// `TIMESTAMP` holds RFC 3339 text.
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS client_logos (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            image_url TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS hero_slides (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            subtitle TEXT,
            image_url TEXT NOT NULL,
            cta_label TEXT,
            cta_href TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT 'residential',
            location TEXT,
            year INTEGER,
            cover_image_url TEXT,
            gallery JSON NOT NULL DEFAULT '[]',
            featured BOOLEAN NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS page_heroes (
            id TEXT PRIMARY KEY,
            page TEXT NOT NULL UNIQUE,
            image_url TEXT NOT NULL,
            headline TEXT,
            updated_at TIMESTAMP NOT NULL
        );",
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    // Logos gained an outbound link after the first release
    if !column_exists(conn, "client_logos", "link_url")? {
        conn.execute("ALTER TABLE client_logos ADD COLUMN link_url TEXT", [])
            .map_err(|e| DomainError::Internal(format!("Failed to add link_url: {}", e)))?;
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_client_logos_position ON client_logos(position);
         CREATE INDEX IF NOT EXISTS idx_hero_slides_position ON hero_slides(position);
         CREATE INDEX IF NOT EXISTS idx_projects_created ON projects(created_at);",
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(())
}

use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Bring `conn` up to the latest schema. Each pending migration runs in its
/// own transaction together with its `schema_migrations` row.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    for migration in MIGRATIONS {
        if is_applied(conn, migration.version)? {
            tracing::debug!("migration {} already applied", migration.version);
            continue;
        }
        apply(conn, migration).with_context(|| {
            format!(
                "Failed to apply migration {} ({})",
                migration.version, migration.name
            )
        })?;
    }

    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let applied = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?)",
        [version],
        |row| row.get(0),
    )?;
    Ok(applied)
}

fn apply(conn: &mut Connection, migration: &Migration) -> Result<()> {
    tracing::info!("applying migration {} ({})", migration.version, migration.name);

    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (migration.version, migration.name, chrono::Utc::now().to_rfc3339()),
    )?;
    tx.commit()?;

    Ok(())
}

//! Schema versions, recorded in SQLite's `user_version` header field.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Upgrade steps; step `n` (zero-based) brings the schema to version `n + 1`.
const UPGRADES: &[&str] = &[include_str!("migrations/001_initial.sql")];

/// Schema version this build writes.
pub const SCHEMA_VERSION: usize = UPGRADES.len();

pub fn version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read schema version")?;
    usize::try_from(version).context("Negative schema version")
}

/// Bring the schema up to [`SCHEMA_VERSION`]. Each step commits together
/// with its version bump, so an interrupted upgrade resumes where it stopped.
pub fn upgrade(conn: &mut Connection) -> Result<()> {
    let from = version(conn)?;
    if from > SCHEMA_VERSION {
        bail!(
            "Database schema version {} is newer than supported version {}",
            from,
            SCHEMA_VERSION
        );
    }

    for (step, sql) in UPGRADES.iter().enumerate().skip(from) {
        let to = step + 1;
        tracing::info!(from = step, to, "upgrading database schema");

        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("Failed to upgrade schema to version {}", to))?;
        tx.pragma_update(None, "user_version", to as i64)?;
        tx.commit()?;
    }

    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::BaseDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Dot-directory under the user's home and the database file inside it.
static APP: Lazy<(&str, &str)> = Lazy::new(|| (".cashlog", "cashlog.db"));

pub fn default_db_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("Could not determine the home directory")?;
    Ok(base.home_dir().join(APP.0).join(APP.1))
}

/// Resolves the store location, preferring an explicit override, and makes
/// sure its parent directory exists.
pub fn db_path(override_path: Option<&Path>) -> Result<PathBuf> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
    }
    Ok(path)
}

pub fn open_or_init(override_path: Option<&Path>) -> Result<Connection> {
    let path = db_path(override_path)?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    info!(path = %path.display(), "store opened");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    debug!("ensuring schema");
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        tags TEXT,
        remark TEXT,
        transaction_time TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_time ON transactions(transaction_time);

    CREATE TABLE IF NOT EXISTS todos(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        tags TEXT,
        deadline TEXT,
        status TEXT NOT NULL DEFAULT 'todo' CHECK(status IN ('todo','doing','done')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_todos_status ON todos(status);
    "#,
    )
    .context("Failed to create schema")?;
    Ok(())
}

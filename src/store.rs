// Persistent key/value store for the client's secrets.
//
// The store lives in a directory (by default under the user's home) holding:
// - `store.db`: a SQLite database with a single `kv` table.
// - `LOCK`: a marker created on open and removed on close. Only one process
//   may hold the store at a time; a stale marker left by a crash is removed
//   with `force_unlock` (`sonarr unlock`).

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};

pub const LOCK_FILE_NAME: &str = "LOCK";
pub const DATABASE_FILE_NAME: &str = "store.db";

/// Minimal string map interface the credential logic is written against.
pub trait KeyValueStore {
    /// Read a value; `NotFound` when the key was never set.
    fn get(&self, key: &str) -> Result<String>;

    /// Insert or overwrite a value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Handle on an opened store directory. `conn` is `None` once closed.
#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    conn: Option<Connection>,
}

impl Store {
    /// Open the store at `dir`, creating the directory if needed and taking
    /// the lock. Fails with `LockHeld` if another handle owns it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tracing::debug!(dir = %dir.display(), "opening data store");

        fs::create_dir_all(&dir)
            .map_err(|err| Error::io(format!("failed to create {}", dir.display()), err))?;

        acquire_lock(&dir)?;

        let conn = match open_database(&dir.join(DATABASE_FILE_NAME)) {
            Ok(conn) => conn,
            Err(err) => {
                release_lock(&dir);
                return Err(err);
            }
        };

        tracing::debug!("data store opened");
        Ok(Self {
            dir,
            conn: Some(conn),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Close the database and release the lock. Closing an already closed
    /// store does nothing.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            tracing::debug!("data store already closed");
            return;
        };
        if let Err((_, err)) = conn.close() {
            tracing::warn!(error = %err, "data store failed to close cleanly");
        }
        release_lock(&self.dir);
        tracing::debug!(dir = %self.dir.display(), "data store closed");
    }

    /// Remove a lock left behind by a process that never closed its store.
    pub fn force_unlock(dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(LOCK_FILE_NAME);
        fs::remove_file(&path)
            .map_err(|err| Error::io(format!("failed to remove {}", path.display()), err))?;
        tracing::info!(path = %path.display(), "removed stale lock");
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::StoreClosed)
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<String> {
        self.conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tracing::debug!(key, "saved value to data store");
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(conn)
}

fn acquire_lock(dir: &Path) -> Result<()> {
    let path = dir.join(LOCK_FILE_NAME);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::LockHeld(dir.to_path_buf()));
        }
        Err(err) => {
            return Err(Error::io(format!("failed to create {}", path.display()), err));
        }
    };

    // The pid is informational only; presence of the file is the lock.
    if let Err(err) = writeln!(file, "{}", std::process::id()) {
        tracing::warn!(error = %err, "failed to record pid in lock file");
    }
    Ok(())
}

fn release_lock(dir: &Path) {
    let path = dir.join(LOCK_FILE_NAME);
    if let Err(err) = fs::remove_file(&path) {
        tracing::warn!(path = %path.display(), error = %err, "failed to release data store lock");
    }
}

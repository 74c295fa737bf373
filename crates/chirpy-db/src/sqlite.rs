use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::models::Snapshot;
use crate::persistence::Persistence;

pub const SQLITE_FILE_NAME: &str = "database.sqlite";

/// Snapshot stored as the same JSON document, kept in a single SQLite row.
///
/// Swaps the storage medium without touching the store's contract. The
/// whole document is still rewritten on every mutation.
pub struct SqliteSnapshot {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteSnapshot {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(SQLITE_FILE_NAME);
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        run_migrations(&conn)?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }
}

impl Persistence for SqliteSnapshot {
    fn ensure_exists(&self) -> Result<()> {
        let body = serde_json::to_string(&Snapshot::default())?;
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO snapshot (id, body) VALUES (1, ?1)",
                [&body],
            )?;
            if inserted > 0 {
                info!("Initialized empty snapshot row in {}", self.path.display());
            }
            Ok(())
        })
    }

    fn load(&self) -> Result<Snapshot> {
        let body: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row("SELECT body FROM snapshot WHERE id = 1", [], |row| row.get(0))
                .optional()?)
        })?;
        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Err(rusqlite::Error::QueryReturnedNoRows.into()),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let body = serde_json::to_string(snapshot)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO snapshot (id, body) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET body = excluded.body",
                [&body],
            )?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Snapshot DB: running migration v1 (snapshot table)");
        conn.execute_batch(
            "
            CREATE TABLE snapshot (
                id      INTEGER PRIMARY KEY CHECK (id = 1),
                body    TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use tempfile::TempDir;

    #[test]
    fn load_before_ensure_fails() {
        let dir = TempDir::new().unwrap();
        let store = SqliteSnapshot::open(dir.path()).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SqliteSnapshot::open(dir.path()).unwrap();
        store.ensure_exists().unwrap();
        assert_eq!(store.load().unwrap(), Snapshot::default());

        let mut snap = Snapshot::default();
        snap.users.insert(
            1,
            User {
                id: 1,
                email: "a@b.c".into(),
                password: "hash".into(),
                is_chirpy_red: false,
            },
        );
        store.save(&snap).unwrap();
        assert_eq!(store.load().unwrap(), snap);

        // ensure_exists must not clobber existing data
        store.ensure_exists().unwrap();
        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let mut snap = Snapshot::default();
        snap.users.insert(
            2,
            User {
                id: 2,
                email: "x@y.z".into(),
                password: "hash".into(),
                is_chirpy_red: true,
            },
        );
        {
            let store = SqliteSnapshot::open(dir.path()).unwrap();
            store.ensure_exists().unwrap();
            store.save(&snap).unwrap();
        }
        let store = SqliteSnapshot::open(dir.path()).unwrap();
        assert_eq!(store.load().unwrap(), snap);
    }
}

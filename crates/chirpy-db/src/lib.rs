pub mod chirps;
pub mod error;
pub mod models;
pub mod persistence;
pub mod sqlite;
pub mod tokens;
pub mod users;

use std::sync::RwLock;

use tracing::info;

pub use error::{Result, StoreError};
pub use models::{Chirp, RefreshToken, Snapshot, SortOrder, User, UserPatch};
pub use persistence::{JsonFile, Persistence};
pub use sqlite::SqliteSnapshot;
pub use tokens::TokenConfig;

/// The record store.
///
/// Owns the chirp, user and refresh-token tables. Nothing is cached between
/// calls: every operation loads the whole snapshot, and every mutation saves
/// it back before the lock is released.
pub struct Database {
    store: Box<dyn Persistence>,
    lock: RwLock<()>,
    tokens: TokenConfig,
}

impl Database {
    pub fn open<P>(store: P, tokens: TokenConfig) -> Result<Self>
    where
        P: Persistence + 'static,
    {
        store.ensure_exists()?;

        info!("Database opened at {}", store.describe());
        Ok(Self {
            store: Box::new(store),
            lock: RwLock::new(()),
            tokens,
        })
    }

    /// Replace the stored snapshot with an empty one.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        self.store.reset()?;
        info!("Database reset at {}", self.store.describe());
        Ok(())
    }

    /// Load a copy of the current snapshot under the shared lock.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let _guard = self.lock.read().map_err(|_| StoreError::LockPoisoned)?;
        self.store.load()
    }

    /// Store `snapshot` as-is under the exclusive lock.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        self.store.save(snapshot)
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.tokens
    }

    /// Load, mutate and save under the exclusive lock.
    ///
    /// Nothing is written if `f` fails.
    pub(crate) fn with_snapshot_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let _guard = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut snapshot = self.store.load()?;
        let out = f(&mut snapshot)?;
        self.store.save(&snapshot)?;
        Ok(out)
    }
}


#[cfg(test)]
mod tests {
    use std::fs;

    use super::test_support::open_temp;
    use super::*;

    #[test]
    fn failed_mutation_is_not_saved() {
        let (_dir, db) = open_temp();
        let res: Result<()> = db.with_snapshot_mut(|snap| {
            snap.users.insert(
                1,
                User {
                    id: 1,
                    email: "ghost@example.com".into(),
                    password: "h".into(),
                    is_chirpy_red: false,
                },
            );
            Err(StoreError::UserNotFound)
        });
        assert!(res.is_err());
        assert!(db.snapshot().unwrap().users.is_empty());
    }

    #[test]
    fn save_of_load_is_byte_identical() {
        let (dir, db) = open_temp();
        let alice = db.create_user("alice@example.com", "hash").unwrap();
        db.create_chirp("hello", alice.id).unwrap();
        db.issue_refresh_token(alice.id).unwrap();

        let path = dir.path().join(persistence::JSON_FILE_NAME);
        let before = fs::read(&path).unwrap();
        let snap = db.snapshot().unwrap();
        db.restore(&snap).unwrap();
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn reset_empties_all_tables() {
        let (_dir, db) = open_temp();
        let user = db.create_user("a@b.c", "h").unwrap();
        db.create_chirp("x", user.id).unwrap();
        db.issue_refresh_token(user.id).unwrap();

        db.reset().unwrap();
        assert_eq!(db.snapshot().unwrap(), Snapshot::default());
    }

    #[test]
    fn corrupt_file_surfaces_format_error() {
        let (dir, db) = open_temp();
        fs::write(dir.path().join(persistence::JSON_FILE_NAME), "not json").unwrap();
        assert!(matches!(db.get_chirps(None, SortOrder::Asc), Err(StoreError::Format(_))));
        assert!(matches!(db.create_chirp("x", 1), Err(StoreError::Format(_))));
    }
}

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{Chirp, SortOrder, next_id};
use crate::Database;

impl Database {
    /// Store a new chirp. The body is taken as-is; length limits and
    /// profanity masking are the caller's job.
    pub fn create_chirp(&self, body: &str, author_id: u64) -> Result<Chirp> {
        self.with_snapshot_mut(|snap| {
            let chirp = Chirp {
                id: next_id(&snap.chirps),
                body: body.to_string(),
                author_id,
            };
            snap.chirps.insert(chirp.id, chirp.clone());
            Ok(chirp)
        })
    }

    /// All chirps, optionally only those by `author_id`, ordered by ID.
    pub fn get_chirps(&self, author_id: Option<u64>, sort: SortOrder) -> Result<Vec<Chirp>> {
        let snap = self.snapshot()?;
        let mut chirps: Vec<Chirp> = snap
            .chirps
            .into_values()
            .filter(|c| author_id.is_none_or(|a| c.author_id == a))
            .collect();

        match sort {
            SortOrder::Asc => chirps.sort_by_key(|c| c.id),
            SortOrder::Desc => chirps.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(chirps)
    }

    /// Fetch one chirp.
    ///
    /// IDs above the number of stored chirps are rejected before lookup, so
    /// after a deletion the highest IDs become unreachable here.
    pub fn get_chirp(&self, id: u64) -> Result<Chirp> {
        let snap = self.snapshot()?;
        if id > snap.chirps.len() as u64 {
            return Err(StoreError::ChirpId);
        }
        snap.chirps.get(&id).cloned().ok_or(StoreError::ChirpId)
    }

    /// Remove a chirp owned by `user_id`. Missing chirps are also `Forbidden`.
    pub fn delete_chirp(&self, user_id: u64, chirp_id: u64) -> Result<()> {
        self.with_snapshot_mut(|snap| match snap.chirps.get(&chirp_id) {
            Some(chirp) if chirp.author_id == user_id => {
                snap.chirps.remove(&chirp_id);
                debug!("User {} deleted chirp {}", user_id, chirp_id);
                Ok(())
            }
            _ => Err(StoreError::Forbidden { user_id, chirp_id }),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::models::SortOrder;
    use crate::test_support::open_temp;

    fn ids(chirps: &[crate::Chirp]) -> Vec<u64> {
        chirps.iter().map(|c| c.id).collect()
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let (_dir, db) = open_temp();
        assert_eq!(db.create_chirp("a", 1).unwrap().id, 1);
        assert_eq!(db.create_chirp("b", 1).unwrap().id, 2);
        assert_eq!(db.create_chirp("c", 2).unwrap().id, 3);
    }

    #[test]
    fn deleting_highest_id_frees_it_for_reuse() {
        let (_dir, db) = open_temp();
        db.create_chirp("a", 1).unwrap();
        db.create_chirp("b", 1).unwrap();
        db.delete_chirp(1, 2).unwrap();
        assert_eq!(db.create_chirp("c", 1).unwrap().id, 2);
    }

    #[test]
    fn deleting_middle_id_does_not_lower_next_id() {
        let (_dir, db) = open_temp();
        for body in ["a", "b", "c"] {
            db.create_chirp(body, 1).unwrap();
        }
        db.delete_chirp(1, 2).unwrap();
        assert_eq!(db.create_chirp("d", 1).unwrap().id, 4);
    }

    #[test]
    fn filter_and_sort() {
        let (_dir, db) = open_temp();
        db.create_chirp("1", 1).unwrap();
        db.create_chirp("2", 2).unwrap();
        db.create_chirp("3", 1).unwrap();
        db.create_chirp("4", 1).unwrap();

        let all = db.get_chirps(None, SortOrder::Asc).unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3, 4]);

        let mine = db.get_chirps(Some(1), SortOrder::Desc).unwrap();
        assert_eq!(ids(&mine), vec![4, 3, 1]);
        assert!(mine.iter().all(|c| c.author_id == 1));

        assert!(db.get_chirps(Some(99), SortOrder::Asc).unwrap().is_empty());
    }

    #[test]
    fn get_chirp_by_id() {
        let (_dir, db) = open_temp();
        db.create_chirp("first", 1).unwrap();
        db.create_chirp("second", 1).unwrap();

        assert_eq!(db.get_chirp(2).unwrap().body, "second");
        assert!(matches!(db.get_chirp(3), Err(StoreError::ChirpId)));
        assert!(matches!(db.get_chirp(0), Err(StoreError::ChirpId)));
    }

    #[test]
    fn get_chirp_bound_is_table_size() {
        let (_dir, db) = open_temp();
        for body in ["a", "b", "c"] {
            db.create_chirp(body, 1).unwrap();
        }
        db.delete_chirp(1, 1).unwrap();

        // two chirps left (2 and 3): 3 still exists but is above the bound
        assert!(matches!(db.get_chirp(3), Err(StoreError::ChirpId)));
        assert_eq!(db.get_chirp(2).unwrap().body, "b");
        // 1 is within the bound but gone
        assert!(matches!(db.get_chirp(1), Err(StoreError::ChirpId)));
    }

    #[test]
    fn only_author_can_delete() {
        let (_dir, db) = open_temp();
        let chirp = db.create_chirp("mine", 1).unwrap();

        let err = db.delete_chirp(2, chirp.id).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { user_id: 2, chirp_id: 1 }));
        assert_eq!(db.get_chirps(None, SortOrder::Asc).unwrap().len(), 1);

        db.delete_chirp(1, chirp.id).unwrap();
        assert!(db.get_chirps(None, SortOrder::Asc).unwrap().is_empty());
    }

    #[test]
    fn deleting_missing_chirp_is_forbidden() {
        let (_dir, db) = open_temp();
        assert!(matches!(
            db.delete_chirp(1, 5),
            Err(StoreError::Forbidden { .. })
        ));
    }
}

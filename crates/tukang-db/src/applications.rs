use crate::models::{ApplicationRow, StoreApplicationRow, WorkerApplicationRow};
use crate::{Database, OptionalExt, now_secs};
use anyhow::Result;
use rusqlite::Connection;

/// Result of an insert attempt. Every branch other than `Created` leaves
/// the table untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(i64),
    Duplicate,
    StoreMissing,
    NotHiring,
}

/// Which principal a scoped write runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Applicant user id
    Worker(i64),
    /// Target store id
    Store(i64),
}

impl Scope {
    fn covers(&self, row: &ApplicationRow) -> bool {
        match *self {
            Scope::Worker(id) => row.tukang_id == id,
            Scope::Store(id) => row.store_id == id,
        }
    }
}

/// Result of a scoped update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedOutcome {
    Done,
    Missing,
    NotOwned,
    /// The row has already left `sent`; carries the stored status.
    NotPending(String),
}

impl Database {
    /// Insert a `sent` application. The pair check, the hiring check and
    /// the insert share one transaction.
    pub fn apply(&self, tukang_id: i64, store_id: i64, is_direct_hire: bool) -> Result<ApplyOutcome> {
        self.with_tx(|tx| {
            let existing = tx
                .query_row(
                    "SELECT 1 FROM applications WHERE tukang_id = ?1 AND store_id = ?2 LIMIT 1",
                    [tukang_id, store_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(ApplyOutcome::Duplicate);
            }

            let hiring: Option<bool> = tx
                .query_row("SELECT is_hiring FROM stores WHERE id = ?1", [store_id], |row| row.get(0))
                .optional()?;
            match hiring {
                None => return Ok(ApplyOutcome::StoreMissing),
                Some(false) => return Ok(ApplyOutcome::NotHiring),
                Some(true) => {}
            }

            let now = now_secs();
            tx.execute(
                "INSERT INTO applications (tukang_id, store_id, status, is_direct_hire, applied_at, updated_at)
                 VALUES (?1, ?2, 'sent', ?3, ?4, ?4)",
                rusqlite::params![tukang_id, store_id, is_direct_hire, now],
            )?;

            Ok(ApplyOutcome::Created(tx.last_insert_rowid()))
        })
    }

    pub fn get_application(&self, id: i64) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    /// Move a `sent` application to `status` on behalf of `scope`.
    pub fn update_application_status(&self, id: i64, scope: Scope, status: &str) -> Result<ScopedOutcome> {
        self.with_tx(|tx| {
            let Some(row) = query_application(tx, id)? else {
                return Ok(ScopedOutcome::Missing);
            };
            if !scope.covers(&row) {
                return Ok(ScopedOutcome::NotOwned);
            }
            if row.status != "sent" {
                return Ok(ScopedOutcome::NotPending(row.status));
            }

            tx.execute(
                "UPDATE applications SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'sent'",
                rusqlite::params![status, now_secs(), id],
            )?;
            Ok(ScopedOutcome::Done)
        })
    }

    /// Delete an application owned by `tukang_id`, whatever its status.
    pub fn delete_application(&self, id: i64, tukang_id: i64) -> Result<ScopedOutcome> {
        self.with_tx(|tx| {
            let Some(row) = query_application(tx, id)? else {
                return Ok(ScopedOutcome::Missing);
            };
            if !Scope::Worker(tukang_id).covers(&row) {
                return Ok(ScopedOutcome::NotOwned);
            }

            tx.execute(
                "DELETE FROM applications WHERE id = ?1 AND tukang_id = ?2",
                [id, tukang_id],
            )?;
            Ok(ScopedOutcome::Done)
        })
    }

    /// Reject every application for the store that is not already
    /// rejected, then clear the hiring flag, in one transaction.
    /// Returns `None` when the store does not exist, otherwise the number
    /// of applications rejected.
    pub fn close_hiring(&self, store_id: i64) -> Result<Option<usize>> {
        self.with_tx(|tx| {
            let closed = tx.execute("UPDATE stores SET is_hiring = 0 WHERE id = ?1", [store_id])?;
            if closed == 0 {
                return Ok(None);
            }

            let rejected = tx.execute(
                "UPDATE applications SET status = 'rejected', updated_at = ?1
                 WHERE store_id = ?2 AND status != 'rejected'",
                [now_secs(), store_id],
            )?;
            Ok(Some(rejected))
        })
    }

    pub fn applications_for_store(&self, store_id: i64) -> Result<Vec<StoreApplicationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.tukang_id, u.name, u.phone_number, a.status, a.is_direct_hire,
                        a.applied_at, a.updated_at
                 FROM applications a
                 JOIN users u ON a.tukang_id = u.id
                 WHERE a.store_id = ?1
                 ORDER BY a.applied_at DESC, a.id DESC",
            )?;

            let rows = stmt
                .query_map([store_id], |row| {
                    Ok(StoreApplicationRow {
                        id: row.get(0)?,
                        tukang_id: row.get(1)?,
                        user_name: row.get(2)?,
                        phone_number: row.get(3)?,
                        status: row.get(4)?,
                        is_direct_hire: row.get(5)?,
                        applied_at: row.get(6)?,
                        updated_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn applications_for_worker(&self, tukang_id: i64, is_direct_hire: bool) -> Result<Vec<WorkerApplicationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.store_id, s.store_name, s.address, s.url_image, s.working_hours,
                        s.is_hiring, a.is_direct_hire, a.status, a.applied_at, a.updated_at
                 FROM applications a
                 JOIN stores s ON a.store_id = s.id
                 WHERE a.tukang_id = ?1 AND a.is_direct_hire = ?2
                 ORDER BY a.applied_at DESC, a.id DESC",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![tukang_id, is_direct_hire], |row| {
                    Ok(WorkerApplicationRow {
                        id: row.get(0)?,
                        store_id: row.get(1)?,
                        store_name: row.get(2)?,
                        address: row.get(3)?,
                        url_image: row.get(4)?,
                        working_hours: row.get(5)?,
                        is_hiring: row.get(6)?,
                        is_direct_hire: row.get(7)?,
                        status: row.get(8)?,
                        applied_at: row.get(9)?,
                        updated_at: row.get(10)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_application(conn: &Connection, id: i64) -> Result<Option<ApplicationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, tukang_id, store_id, status, is_direct_hire, applied_at, updated_at
         FROM applications WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(ApplicationRow {
                id: row.get(0)?,
                tukang_id: row.get(1)?,
                store_id: row.get(2)?,
                status: row.get(3)?,
                is_direct_hire: row.get(4)?,
                applied_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewStore, NewUser};

    struct Fixture {
        db: Database,
        worker: i64,
        store: i64,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let worker = db
            .create_user_with_store(
                &NewUser {
                    phone_number: "+628100",
                    name: "Slamet",
                    password_hash: "hash",
                    role: "tukang",
                    is_verified: true,
                },
                None,
            )
            .unwrap()
            .user_id()
            .unwrap();
        let owner = db
            .create_user_with_store(
                &NewUser {
                    phone_number: "+628200",
                    name: "Budi",
                    password_hash: "hash",
                    role: "store",
                    is_verified: false,
                },
                Some(&NewStore {
                    store_name: "Toko Makmur",
                    address: "Jl. Pahlawan 3",
                    latitude: -7.9,
                    longitude: 112.6,
                    working_hours: "09:00-21:00",
                }),
            )
            .unwrap()
            .user_id()
            .unwrap();
        let store = db.get_store_by_owner(owner).unwrap().unwrap().id;
        db.set_store_hiring(store, true).unwrap();

        Fixture { db, worker, store }
    }

    #[test]
    fn apply_then_duplicate() {
        let f = fixture();
        let first = f.db.apply(f.worker, f.store, false).unwrap();
        assert!(matches!(first, ApplyOutcome::Created(_)));

        assert_eq!(f.db.apply(f.worker, f.store, true).unwrap(), ApplyOutcome::Duplicate);
        assert_eq!(f.db.applications_for_store(f.store).unwrap().len(), 1);
    }

    #[test]
    fn apply_respects_hiring_flag() {
        let f = fixture();
        f.db.set_store_hiring(f.store, false).unwrap();

        assert_eq!(f.db.apply(f.worker, f.store, false).unwrap(), ApplyOutcome::NotHiring);
        assert_eq!(f.db.apply(f.worker, f.store + 99, false).unwrap(), ApplyOutcome::StoreMissing);
        assert!(f.db.applications_for_store(f.store).unwrap().is_empty());
    }

    #[test]
    fn scoped_update_distinguishes_outcomes() {
        let f = fixture();
        let ApplyOutcome::Created(id) = f.db.apply(f.worker, f.store, false).unwrap() else {
            panic!("expected insert");
        };

        assert_eq!(
            f.db.update_application_status(id + 1, Scope::Store(f.store), "accepted").unwrap(),
            ScopedOutcome::Missing
        );
        assert_eq!(
            f.db.update_application_status(id, Scope::Worker(f.worker + 50), "accepted").unwrap(),
            ScopedOutcome::NotOwned
        );
        assert_eq!(f.db.get_application(id).unwrap().unwrap().status, "sent");

        assert_eq!(
            f.db.update_application_status(id, Scope::Store(f.store), "accepted").unwrap(),
            ScopedOutcome::Done
        );
        assert_eq!(
            f.db.update_application_status(id, Scope::Store(f.store), "rejected").unwrap(),
            ScopedOutcome::NotPending("accepted".to_string())
        );
    }

    #[test]
    fn close_hiring_rejects_everything_not_rejected() {
        let f = fixture();
        let ApplyOutcome::Created(id) = f.db.apply(f.worker, f.store, false).unwrap() else {
            panic!("expected insert");
        };
        f.db.update_application_status(id, Scope::Store(f.store), "accepted").unwrap();

        assert_eq!(f.db.close_hiring(f.store).unwrap(), Some(1));
        assert_eq!(f.db.get_application(id).unwrap().unwrap().status, "rejected");
        assert!(!f.db.get_store(f.store).unwrap().unwrap().is_hiring);

        // Nothing left to reject is still a successful close
        assert_eq!(f.db.close_hiring(f.store).unwrap(), Some(0));
        assert_eq!(f.db.close_hiring(f.store + 99).unwrap(), None);
    }

    #[test]
    fn delete_is_scoped_to_applicant() {
        let f = fixture();
        let ApplyOutcome::Created(id) = f.db.apply(f.worker, f.store, false).unwrap() else {
            panic!("expected insert");
        };

        assert_eq!(f.db.delete_application(id, f.worker + 1).unwrap(), ScopedOutcome::NotOwned);
        assert!(f.db.get_application(id).unwrap().is_some());

        assert_eq!(f.db.delete_application(id, f.worker).unwrap(), ScopedOutcome::Done);
        assert!(f.db.get_application(id).unwrap().is_none());
        assert_eq!(f.db.delete_application(id, f.worker).unwrap(), ScopedOutcome::Missing);
    }

    #[test]
    fn worker_listing_filters_direction() {
        let f = fixture();
        f.db.apply(f.worker, f.store, true).unwrap();

        let direct = f.db.applications_for_worker(f.worker, true).unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].store_name, "Toko Makmur");
        assert!(direct[0].is_direct_hire);

        assert!(f.db.applications_for_worker(f.worker, false).unwrap().is_empty());
    }
}

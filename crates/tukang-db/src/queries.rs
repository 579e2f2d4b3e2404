use crate::models::{NewStore, NewUser, StoreListRow, StoreRow, UserRow};
use crate::{Database, OptionalExt, now_millis};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, phone_number, name, password, role, is_verified, created_at";

const STORE_COLUMNS: &str = "s.id, s.user_id, s.store_name, s.address, s.url_image, s.latitude, s.longitude,
     s.working_hours, s.is_hiring, s.is_paid, u.is_verified, s.created_at";

/// Result of a registration insert. `PhoneTaken` leaves both tables
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(i64),
    PhoneTaken,
}

impl RegisterOutcome {
    pub fn user_id(self) -> Option<i64> {
        match self {
            Self::Created(id) => Some(id),
            Self::PhoneTaken => None,
        }
    }
}

impl Database {
    // -- Users --

    /// Insert a user and, when given, the store it owns. The phone check
    /// and both inserts share one transaction.
    pub fn create_user_with_store(
        &self,
        user: &NewUser<'_>,
        store: Option<&NewStore<'_>>,
    ) -> Result<RegisterOutcome> {
        self.with_tx(|tx| {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = ?1)",
                [user.phone_number],
                |row| row.get(0),
            )?;
            if taken {
                return Ok(RegisterOutcome::PhoneTaken);
            }

            let created_at = now_millis();
            tx.execute(
                "INSERT INTO users (phone_number, name, password, role, is_verified, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.phone_number,
                    user.name,
                    user.password_hash,
                    user.role,
                    user.is_verified,
                    created_at
                ],
            )?;
            let user_id = tx.last_insert_rowid();

            if let Some(store) = store {
                tx.execute(
                    "INSERT INTO stores (user_id, store_name, address, latitude, longitude, working_hours, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        user_id,
                        store.store_name,
                        store.address,
                        store.latitude,
                        store.longitude,
                        store.working_hours,
                        created_at
                    ],
                )?;
            }

            Ok(RegisterOutcome::Created(user_id))
        })
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1 LIMIT 1", [id], |row| row.get::<_, i64>(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn phone_exists(&self, phone_number: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = ?1)",
                [phone_number],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    pub fn get_user_by_phone(&self, phone_number: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "phone_number = ?1", &phone_number))
    }

    // -- Stores --

    pub fn store_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM stores WHERE id = ?1 LIMIT 1", [id], |row| row.get::<_, i64>(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn get_store(&self, id: i64) -> Result<Option<StoreRow>> {
        self.with_conn(|conn| query_store(conn, "s.id = ?1", id))
    }

    pub fn get_store_by_owner(&self, user_id: i64) -> Result<Option<StoreRow>> {
        self.with_conn(|conn| query_store(conn, "s.user_id = ?1", user_id))
    }

    /// Returns false when no store has this id.
    pub fn set_store_hiring(&self, id: i64, is_hiring: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE stores SET is_hiring = ?1 WHERE id = ?2",
                rusqlite::params![is_hiring, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false when no store has this id.
    pub fn set_store_image(&self, id: i64, url_image: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE stores SET url_image = ?1 WHERE id = ?2",
                rusqlite::params![url_image, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Mark the owner of a store as verified. Returns false when no store
    /// has this id.
    pub fn verify_store_owner(&self, store_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_verified = 1
                 WHERE id = (SELECT user_id FROM stores WHERE id = ?1)",
                [store_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Mark the owner verified and save the image url in one transaction.
    /// Returns false, with nothing written, when no store has this id.
    pub fn attach_store_image(&self, store_id: i64, url_image: &str) -> Result<bool> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE stores SET url_image = ?1 WHERE id = ?2",
                rusqlite::params![url_image, store_id],
            )?;
            if changed == 0 {
                return Ok(false);
            }

            tx.execute(
                "UPDATE users SET is_verified = 1
                 WHERE id = (SELECT user_id FROM stores WHERE id = ?1)",
                [store_id],
            )?;
            Ok(true)
        })
    }

    /// Newest stores first. `hiring` narrows the listing when set.
    pub fn list_stores(&self, limit: u32, offset: u32, hiring: Option<bool>) -> Result<Vec<StoreListRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, store_name, address, url_image, working_hours, is_hiring, is_paid
                 FROM stores
                 WHERE (?1 IS NULL OR is_hiring = ?1)
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![hiring, limit, offset], |row| {
                    Ok(StoreListRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        store_name: row.get(2)?,
                        address: row.get(3)?,
                        url_image: row.get(4)?,
                        working_hours: row.get(5)?,
                        is_hiring: row.get(6)?,
                        is_paid: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, value: &dyn rusqlite::ToSql) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                phone_number: row.get(1)?,
                name: row.get(2)?,
                password: row.get(3)?,
                role: row.get(4)?,
                is_verified: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_store(conn: &Connection, predicate: &str, value: i64) -> Result<Option<StoreRow>> {
    let sql = format!(
        "SELECT {STORE_COLUMNS}
         FROM stores s
         JOIN users u ON s.user_id = u.id
         WHERE {predicate}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], store_from_row).optional()?;
    Ok(row)
}

fn store_from_row(row: &Row<'_>) -> rusqlite::Result<StoreRow> {
    Ok(StoreRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        store_name: row.get(2)?,
        address: row.get(3)?,
        url_image: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        working_hours: row.get(7)?,
        is_hiring: row.get(8)?,
        is_paid: row.get(9)?,
        is_verified: row.get(10)?,
        created_at: row.get(11)?,
    })
}

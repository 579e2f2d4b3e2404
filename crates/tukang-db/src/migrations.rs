use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, stores, applications)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                phone_number    TEXT NOT NULL UNIQUE,
                name            TEXT NOT NULL,
                password        TEXT NOT NULL,
                role            TEXT NOT NULL CHECK (role IN ('tukang', 'store')),
                is_verified     INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL
            );

            CREATE TABLE stores (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER NOT NULL UNIQUE REFERENCES users(id),
                store_name      TEXT NOT NULL,
                address         TEXT NOT NULL,
                latitude        REAL NOT NULL,
                longitude       REAL NOT NULL,
                working_hours   TEXT NOT NULL DEFAULT '',
                is_hiring       INTEGER NOT NULL DEFAULT 0,
                is_paid         INTEGER NOT NULL DEFAULT 0,
                url_image       TEXT NOT NULL DEFAULT '',
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX idx_stores_created ON stores(created_at);

            CREATE TABLE applications (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                tukang_id       INTEGER NOT NULL REFERENCES users(id),
                store_id        INTEGER NOT NULL REFERENCES stores(id),
                status          TEXT NOT NULL CHECK (status IN ('sent', 'accepted', 'rejected')),
                is_direct_hire  INTEGER NOT NULL DEFAULT 0,
                applied_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE INDEX idx_applications_store ON applications(store_id);
            CREATE INDEX idx_applications_tukang ON applications(tukang_id, is_direct_hire);

            -- At most one pending application per (worker, store) pair
            CREATE UNIQUE INDEX idx_applications_pending_pair
                ON applications(tukang_id, store_id) WHERE status = 'sent';

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}

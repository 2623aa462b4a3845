use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::rusqlite::{params, OpenFlags};
use r2d2_sqlite::SqliteConnectionManager;

use crate::storage::area::StorageArea;

/// SQLite database holding named storage areas.
///
/// One database can serve both the durable and the session area of a host:
/// every row is tagged with the name of the area it belongs to.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE |
                    OpenFlags::SQLITE_OPEN_CREATE |
                    OpenFlags::SQLITE_OPEN_URI
            )
            .with_init(|c| {
                c.busy_timeout(Duration::from_millis(500))?;
                c.pragma_update(None, "journal_mode", &"WAL")?;
                c.execute_batch(
                    "CREATE TABLE IF NOT EXISTS web_storage (
                        area TEXT NOT NULL,
                        key TEXT NOT NULL,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
                        PRIMARY KEY(area, key)
                    );"
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        Ok(Self { pool })
    }

    /// Returns the area called `name`. Areas with the same name share their items.
    pub fn area(&self, name: &str) -> Arc<dyn StorageArea> {
        Arc::new(SqliteArea {
            pool: self.pool.clone(),
            area: name.to_string(),
        })
    }
}

/// One named area inside a [`SqliteStorage`] database.
pub struct SqliteArea {
    pool: Pool<SqliteConnectionManager>,
    area: String,
}

impl SqliteArea {
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

impl StorageArea for SqliteArea {
    fn get_item(&self, key: &str) -> Option<String> {
        let conn = self.conn().ok()?;
        conn.query_row(
            "SELECT value FROM web_storage WHERE area=?1 AND key=?2",
            params![self.area, key],
            |row| row.get::<_, String>(0),
        ).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO web_storage(area,key,value) VALUES (?1,?2,?3)
             ON CONFLICT(area,key) DO UPDATE
             SET value=excluded.value, updated_at=strftime('%s','now')",
            params![self.area, key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM web_storage WHERE area=?1 AND key=?2",
            params![self.area, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM web_storage WHERE area=?1", params![self.area])?;
        Ok(())
    }

    fn len(&self) -> usize {
        let conn = match self.conn() { Ok(c) => c, Err(_) => return 0 };
        conn.query_row::<u32, _, _>(
            "SELECT COUNT(*) FROM web_storage WHERE area=?1",
            params![self.area],
            |row| row.get(0),
        ).unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_contract() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path().join("storage.db")).unwrap();
        let area = storage.area("local");

        assert_eq!(area.len(), 0);
        assert!(area.get_item("missing").is_none());

        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("1"));

        // overwrite keeps len
        area.set_item("a", "ONE").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("ONE"));

        area.remove_item("b").unwrap();
        assert_eq!(area.len(), 1);
        assert!(area.get_item("b").is_none());

        area.clear().unwrap();
        assert!(area.is_empty());
    }

    #[test]
    fn areas_are_isolated_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path().join("storage.db")).unwrap();

        let local = storage.area("local");
        let session = storage.area("session");
        local.set_item("k", "v").unwrap();

        assert!(session.get_item("k").is_none());
        assert_eq!(storage.area("local").get_item("k").as_deref(), Some("v"));

        session.clear().unwrap();
        assert_eq!(local.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn values_survive_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.db");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.area("local").set_item("token", "\"abc\"").unwrap();
        }

        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.area("local").get_item("token").as_deref(), Some("\"abc\""));
    }
}

//! SQLite-backed record store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use intake_model::{ActorId, CARD_SCHEMA, CASE_SCHEMA};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::port::{Inserter, RecordStore};
use crate::row::{ColumnValue, InsertRow};

const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Placeholder hash for accounts created by the importer. Never matches a
/// real password hash, so such accounts cannot log in.
const LOCKED_PASSWORD_HASH: &str = "!";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT UNIQUE NOT NULL,
  password_hash TEXT NOT NULL,
  is_admin INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS appeals (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  applicant_name TEXT NOT NULL,
  address TEXT,
  phone TEXT,
  source_org TEXT,
  source_system TEXT,
  subject TEXT,
  direction TEXT,
  client_code TEXT,
  card TEXT,
  appeal_date TEXT NOT NULL,
  damage_amount REAL,
  comment TEXT,
  created_by INTEGER NOT NULL,
  updated_by INTEGER,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  updated_at TEXT,
  FOREIGN KEY (created_by) REFERENCES users(id),
  FOREIGN KEY (updated_by) REFERENCES users(id)
);
CREATE INDEX IF NOT EXISTS idx_appeals_date ON appeals(appeal_date);
CREATE INDEX IF NOT EXISTS idx_appeals_client_code ON appeals(client_code);
CREATE INDEX IF NOT EXISTS idx_appeals_created_by ON appeals(created_by);

CREATE TABLE IF NOT EXISTS drop_cards (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  card_number TEXT NOT NULL,
  blocked_at TEXT NOT NULL,
  balance REAL,
  blocked_by INTEGER NOT NULL,
  updated_by INTEGER,
  comment TEXT,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  updated_at TEXT,
  FOREIGN KEY (blocked_by) REFERENCES users(id),
  FOREIGN KEY (updated_by) REFERENCES users(id)
);
CREATE INDEX IF NOT EXISTS idx_drop_cards_blocked_at ON drop_cards(blocked_at);
CREATE INDEX IF NOT EXISTS idx_drop_cards_blocked_by ON drop_cards(blocked_by);
";

/// Tables that accept inserts and counts. Table names are interpolated into
/// SQL, so nothing outside this list reaches a statement.
fn known_table(table: &str) -> Result<&'static str> {
    [CASE_SCHEMA.table, CARD_SCHEMA.table, "users"]
        .into_iter()
        .find(|known| *known == table)
        .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// The application database.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema. The parent directory is created when missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let open_err = |source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(open_err)?;
        apply_pragmas(&conn).map_err(open_err)?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.migrate()?;
        info!(path = %path.display(), "Opened database");
        Ok(store)
    }

    /// Opens a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let open_err = |source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        };
        let conn = Connection::open_in_memory().map_err(open_err)?;
        apply_pragmas(&conn).map_err(open_err)?;

        let store = Self { conn, path: None };
        store.migrate()?;
        Ok(store)
    }

    /// Creates missing tables and indexes. Safe to run repeatedly.
    pub fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|source| StoreError::Schema { source })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the id of `username`, creating a locked account if it does
    /// not exist yet.
    pub fn ensure_actor(&self, username: &str) -> Result<ActorId> {
        let query_err = |source| StoreError::Query {
            table: "users".to_string(),
            source,
        };

        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;
        if let Some(id) = existing {
            return Ok(ActorId::new(id));
        }

        self.conn
            .execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username, LOCKED_PASSWORD_HASH],
            )
            .map_err(|source| StoreError::Insert {
                table: "users".to_string(),
                source,
            })?;
        let id = self.conn.last_insert_rowid();
        info!(username, id, "Created actor account");
        Ok(ActorId::new(id))
    }

    /// Returns whether a user with this id exists.
    pub fn actor_exists(&self, actor: ActorId) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                params![actor.get()],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Query {
                table: "users".to_string(),
                source,
            })
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> Result<u64> {
        let table = known_table(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(|source| StoreError::Query {
                table: table.to_string(),
                source,
            })?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Raw connection, for read-side queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteStore {
    fn run_in_transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Inserter) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction()
            .map_err(|source| StoreError::Transaction {
                operation: "begin",
                source,
            })?;

        let mut inserter = SqliteInserter { tx: &tx, rows: 0 };
        // Dropping `tx` on the error path rolls back.
        let value = work(&mut inserter)?;
        let rows = inserter.rows;

        tx.commit().map_err(|source| StoreError::Transaction {
            operation: "commit",
            source,
        })?;
        debug!(rows, "Committed transaction");
        Ok(value)
    }
}

struct SqliteInserter<'a> {
    tx: &'a Transaction<'a>,
    rows: usize,
}

impl Inserter for SqliteInserter<'_> {
    fn insert(&mut self, table: &str, row: &InsertRow) -> Result<i64> {
        let table = known_table(table)?;
        if let Some(bad) = row.column_names().find(|name| !is_identifier(name)) {
            return Err(StoreError::InvalidColumn(bad.to_string()));
        }

        let sql = insert_sql(table, row);
        let insert_err = |source| StoreError::Insert {
            table: table.to_string(),
            source,
        };
        let mut stmt = self.tx.prepare_cached(&sql).map_err(insert_err)?;
        stmt.execute(params_from_iter(row.values()))
            .map_err(insert_err)?;
        self.rows += 1;
        Ok(self.tx.last_insert_rowid())
    }
}

fn insert_sql(table: &str, row: &InsertRow) -> String {
    let columns: Vec<&str> = row.column_names().collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    // In-memory databases answer "memory" here; the mode is not checked.
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(())
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_row(actor: i64, number: &str) -> InsertRow {
        InsertRow::new()
            .with("card_number", ColumnValue::Text(number.to_string()))
            .with("blocked_at", ColumnValue::Text("2024-01-01".to_string()))
            .with("balance", ColumnValue::Real(10.5))
            .with("comment", ColumnValue::Null)
            .with("blocked_by", ColumnValue::Integer(actor))
    }

    #[test]
    fn insert_sql_numbers_placeholders() {
        let row = card_row(1, "8600");
        assert_eq!(
            insert_sql("drop_cards", &row),
            "INSERT INTO drop_cards (card_number, blocked_at, balance, comment, blocked_by) \
             VALUES (?1, ?2, ?3, ?4, ?5)"
        );
    }

    #[test]
    fn identifiers_are_checked() {
        assert!(is_identifier("applicant_name"));
        assert!(!is_identifier("name; DROP TABLE users"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn committed_rows_are_visible() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let actor = store.ensure_actor("importer").unwrap();

        let ids = store
            .run_in_transaction(|tx| {
                let a = tx.insert("drop_cards", &card_row(actor.get(), "1"))?;
                let b = tx.insert("drop_cards", &card_row(actor.get(), "2"))?;
                Ok(vec![a, b])
            })
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.count("drop_cards").unwrap(), 2);
    }

    #[test]
    fn error_in_work_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let actor = store.ensure_actor("importer").unwrap();

        let result: Result<()> = store.run_in_transaction(|tx| {
            tx.insert("drop_cards", &card_row(actor.get(), "1"))?;
            Err(StoreError::Rejected {
                table: "drop_cards".into(),
                reason: "simulated".into(),
            })
        });

        assert!(result.is_err());
        assert_eq!(store.count("drop_cards").unwrap(), 0);
    }

    #[test]
    fn unknown_actor_violates_foreign_key_and_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let actor = store.ensure_actor("importer").unwrap();

        let result = store.run_in_transaction(|tx| {
            tx.insert("drop_cards", &card_row(actor.get(), "1"))?;
            tx.insert("drop_cards", &card_row(9_999, "2"))
        });

        assert!(matches!(result, Err(StoreError::Insert { ref table, .. }) if table == "drop_cards"));
        assert_eq!(store.count("drop_cards").unwrap(), 0);
    }

    #[test]
    fn not_null_column_is_enforced() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let actor = store.ensure_actor("importer").unwrap();
        let row = InsertRow::new()
            .with("card_number", ColumnValue::Null)
            .with("blocked_at", ColumnValue::Text("2024-01-01".into()))
            .with("blocked_by", ColumnValue::Integer(actor.get()));

        let result = store.run_in_transaction(|tx| tx.insert("drop_cards", &row));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_table_is_refused() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let result = store.run_in_transaction(|tx| tx.insert("sqlite_master", &InsertRow::new()));
        assert!(matches!(result, Err(StoreError::UnknownTable(_))));
        assert!(matches!(
            store.count("nope"),
            Err(StoreError::UnknownTable(_))
        ));
    }

    #[test]
    fn ensure_actor_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.ensure_actor("operator").unwrap();
        let second = store.ensure_actor("operator").unwrap();
        let other = store.ensure_actor("auditor").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(store.actor_exists(first).unwrap());
        assert!(!store.actor_exists(ActorId::new(42)).unwrap());
        assert_eq!(store.count("users").unwrap(), 2);
    }
}

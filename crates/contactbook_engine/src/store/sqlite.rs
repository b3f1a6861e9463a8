/* 📖 # Why SQLite for contact persistence?

The address book has to survive restarts and fits comfortably in a single local file.
SQLite (bundled through rusqlite) needs no server process and gives unique keys and
stable row ordering for free. Paging is ordered by `rowid`, which grows with every
insert, so a page is always a slice of insertion order.

A rusqlite Connection is `Send` but not `Sync`. The store wraps it in a mutex so it can
sit behind the shared StoreHandle; concurrent reads therefore run one at a time.
*/

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, params};
use tracing::{debug, info, instrument};

use contactbook_base::{ContactbookError, ContactbookResult};

use crate::contact::{Contact, ContactId};
use crate::store::traits::ContactStore;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL
    );
"#;

/// Contact store backed by a SQLite database.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and ensure the schema exists.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> ContactbookResult<Self> {
        let connection = Connection::open(path).map_err(|e| {
            Box::new(ContactbookError::storage(
                format!("Failed to open database {}", path.display()),
                e,
            ))
        })?;
        let store = Self::from_connection(connection)?;
        info!("opened contact database");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> ContactbookResult<Self> {
        let connection = Connection::open_in_memory()
            .map_err(|e| storage_error("Failed to open in-memory database", e))?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> ContactbookResult<Self> {
        connection
            .execute_batch(SCHEMA)
            .map_err(|e| storage_error("Failed to create contacts table", e))?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl ContactStore for SqliteStore {
    fn count(&self) -> ContactbookResult<u64> {
        let connection = self.connection.lock();
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .map_err(|e| storage_error("Failed to count contacts", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self))]
    fn page(&self, limit: u64, offset: u64) -> ContactbookResult<Vec<Contact>> {
        let connection = self.connection.lock();
        let mut statement = connection
            .prepare_cached(
                "SELECT id, name, email, phone FROM contacts ORDER BY rowid LIMIT ?1 OFFSET ?2",
            )
            .map_err(|e| storage_error("Failed to prepare contact query", e))?;
        let rows = statement
            .query_map(params![to_sql_integer(limit), to_sql_integer(offset)], |row| {
                Ok(Contact {
                    id: ContactId::from_string(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                })
            })
            .map_err(|e| storage_error("Failed to query contacts", e))?;

        let contacts = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to read contact row", e))?;
        debug!(returned = contacts.len(), "read contact page");
        Ok(contacts)
    }

    fn insert(&mut self, contact: Contact) -> ContactbookResult<()> {
        let connection = self.connection.lock();
        let result = connection.execute(
            "INSERT INTO contacts (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)",
            params![
                contact.id.as_str(),
                contact.name,
                contact.email,
                contact.phone
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation
                    && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(Box::new(ContactbookError::duplicate_key(
                    contact.id.as_str(),
                )))
            }
            Err(e) => Err(storage_error("Failed to insert contact", e)),
        }
    }

    fn delete_by_id(&mut self, id: &ContactId) -> ContactbookResult<bool> {
        let connection = self.connection.lock();
        let removed = connection
            .execute("DELETE FROM contacts WHERE id = ?1", params![id.as_str()])
            .map_err(|e| storage_error("Failed to delete contact", e))?;
        Ok(removed > 0)
    }
}

fn storage_error(message: &str, source: rusqlite::Error) -> Box<ContactbookError> {
    Box::new(ContactbookError::storage(message, source))
}

/// SQLite integers are signed 64 bit; larger values clamp to the maximum.
fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::NewContact;
    use tempfile::TempDir;

    fn contact(id: &str) -> Contact {
        Contact::new(
            ContactId::from_string(id),
            NewContact {
                name: format!("Name {}", id),
                email: format!("{}@example.com", id),
                phone: "1234567890".to_string(),
            },
        )
    }

    #[test]
    fn test_contacts_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert(contact("a")).unwrap();
            store.insert(contact("b")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        let ids: Vec<String> = store
            .page(10, 0)
            .unwrap()
            .into_iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_open_fails_for_unwritable_location() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing-dir").join("contacts.db");
        let error = SqliteStore::open(&path).unwrap_err();
        assert!(
            matches!(error.kind(), contactbook_base::ErrorKind::Storage { .. }),
            "{:?}",
            error
        );
    }

    #[test]
    fn test_huge_paging_values_are_clamped() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(contact("a")).unwrap();
        assert_eq!(store.page(u64::MAX, 0).unwrap().len(), 1);
        assert!(store.page(10, u64::MAX).unwrap().is_empty());
    }
}

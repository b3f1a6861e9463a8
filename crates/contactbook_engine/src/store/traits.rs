/* 📖 # Why create a ContactStore trait?

The ContactStore trait abstracts how contacts are persisted. Production uses SQLite,
tests use a plain in-memory list, and both have to agree on the same observable
behavior: stable insertion order for paging, unique ids, and deletion that reports
whether anything was removed.

Reads take `&self` and writes take `&mut self`, so the StoreHandle read/write lock
decides who may run concurrently. Counting and paging are two separate calls; a write
landing between them is visible in one and not the other.
*/

use std::sync::Arc;

use parking_lot::RwLock;

use contactbook_base::ContactbookResult;

use crate::contact::{Contact, ContactId};

/// Trait for contact storage implementations.
pub trait ContactStore: std::fmt::Debug + Send + Sync + 'static {
    /// Total number of stored contacts.
    fn count(&self) -> ContactbookResult<u64>;

    /// Up to `limit` contacts in insertion order, skipping the first `offset`.
    ///
    /// An offset past the end yields an empty list.
    fn page(&self, limit: u64, offset: u64) -> ContactbookResult<Vec<Contact>>;

    /// Persist a new contact.
    ///
    /// Fails with `DuplicateKey` when a contact with the same id already exists.
    fn insert(&mut self, contact: Contact) -> ContactbookResult<()>;

    /// Remove the contact with the given id.
    ///
    /// Returns `false` when no such contact existed.
    fn delete_by_id(&mut self, id: &ContactId) -> ContactbookResult<bool>;
}

/// A thread-safe handle to a contact store.
///
/// Cloning is cheap (Arc), and the RwLock lets concurrent request threads share
/// one store. This follows the same pattern as `PalHandle` in contactbook_base.
#[derive(Debug, Clone)]
pub struct StoreHandle(Arc<RwLock<dyn ContactStore>>);

impl StoreHandle {
    pub fn new<S: ContactStore>(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// See [`ContactStore::count`].
    pub fn count(&self) -> ContactbookResult<u64> {
        self.0.read().count()
    }

    /// See [`ContactStore::page`].
    pub fn page(&self, limit: u64, offset: u64) -> ContactbookResult<Vec<Contact>> {
        self.0.read().page(limit, offset)
    }

    /// See [`ContactStore::insert`].
    pub fn insert(&self, contact: Contact) -> ContactbookResult<()> {
        self.0.write().insert(contact)
    }

    /// See [`ContactStore::delete_by_id`].
    pub fn delete_by_id(&self, id: &ContactId) -> ContactbookResult<bool> {
        self.0.write().delete_by_id(id)
    }
}

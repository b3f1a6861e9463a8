use contactbook_base::{ContactbookError, ContactbookResult};

use crate::contact::{Contact, ContactId};
use crate::store::traits::ContactStore;

/// An in-memory contact store backed by a Vec.
///
/// The Vec keeps insertion order, which is the paging order. Lookups by id are
/// linear; this store is meant for tests and throwaway runs.
///
/// # Example
///
/// ```
/// use contactbook_engine::{Contact, ContactId, ContactStore, NewContact};
/// use contactbook_engine::store::InMemoryStore;
///
/// let mut store = InMemoryStore::new();
/// let contact = Contact::new(
///     ContactId::from_string("c-1"),
///     NewContact {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         phone: "1234567890".to_string(),
///     },
/// );
/// store.insert(contact).unwrap();
///
/// assert_eq!(store.count().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    contacts: Vec<Contact>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactStore for InMemoryStore {
    fn count(&self) -> ContactbookResult<u64> {
        Ok(self.contacts.len() as u64)
    }

    fn page(&self, limit: u64, offset: u64) -> ContactbookResult<Vec<Contact>> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self.contacts.iter().skip(skip).take(take).cloned().collect())
    }

    fn insert(&mut self, contact: Contact) -> ContactbookResult<()> {
        if self.contacts.iter().any(|existing| existing.id == contact.id) {
            return Err(Box::new(ContactbookError::duplicate_key(
                contact.id.as_str(),
            )));
        }
        self.contacts.push(contact);
        Ok(())
    }

    fn delete_by_id(&mut self, id: &ContactId) -> ContactbookResult<bool> {
        let before = self.contacts.len();
        self.contacts.retain(|contact| &contact.id != id);
        Ok(self.contacts.len() != before)
    }
}

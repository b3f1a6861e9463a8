use tracing::{debug, info, instrument};

use contactbook_base::{ContactbookError, ContactbookResult, ResultExt};

use crate::contact::{Contact, ContactDraft, ContactId};
use crate::pagination::{ContactPage, PageRequest, Pagination};
use crate::store::StoreHandle;

/// Contact operations on top of a store: listing pages, creating and deleting.
#[derive(Debug, Clone)]
pub struct ContactService {
    store: StoreHandle,
}

impl ContactService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Fetch one page of contacts with its pagination metadata.
    ///
    /// The total and the page are read separately, not as one snapshot.
    #[instrument(skip(self), fields(page = request.page(), limit = request.limit()))]
    pub fn list_page(&self, request: PageRequest) -> ContactbookResult<ContactPage> {
        let total = self.store.count().context("counting contacts")?;
        let contacts = self
            .store
            .page(request.limit(), request.offset())
            .context("reading contact page")?;
        debug!(total, returned = contacts.len(), "listed contacts");
        Ok(ContactPage {
            contacts,
            pagination: Pagination::new(request, total),
        })
    }

    /// Validate a draft, assign a fresh id and persist it.
    #[instrument(skip_all)]
    pub fn create_contact(&self, draft: ContactDraft) -> ContactbookResult<Contact> {
        let fields = draft.validate()?;
        let contact = Contact::new(ContactId::generate(), fields);
        self.store
            .insert(contact.clone())
            .context("inserting contact")?;
        info!(id = %contact.id, "created contact");
        Ok(contact)
    }

    /// Delete a contact by id. Fails with `NotFound` when it does not exist.
    #[instrument(skip(self), fields(id = %id))]
    pub fn delete_contact(&self, id: &ContactId) -> ContactbookResult<()> {
        let removed = self
            .store
            .delete_by_id(id)
            .context("deleting contact")?;
        if !removed {
            return Err(Box::new(ContactbookError::not_found(format!(
                "contact {}",
                id
            ))));
        }
        info!("deleted contact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use contactbook_base::ErrorKind;

    fn service() -> ContactService {
        ContactService::new(StoreHandle::new(InMemoryStore::new()))
    }

    fn draft(name: &str) -> ContactDraft {
        ContactDraft {
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: Some("1234567890".to_string()),
        }
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let service = service();
        let a = service.create_contact(draft("Ada")).unwrap();
        let b = service.create_contact(draft("Ada")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Ada");
    }

    #[test]
    fn test_create_rejects_incomplete_draft_without_writing() {
        let service = service();
        let error = service
            .create_contact(ContactDraft {
                name: Some("Ada".to_string()),
                ..ContactDraft::default()
            })
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Validation { .. }));
        assert_eq!(
            service.list_page(PageRequest::default()).unwrap().pagination.total_contacts,
            0
        );
    }

    #[test]
    fn test_list_page_reports_metadata() {
        let service = service();
        for i in 0..15 {
            service.create_contact(draft(&format!("P{}", i))).unwrap();
        }

        let second = service.list_page(PageRequest::new(2, 10)).unwrap();
        assert_eq!(second.contacts.len(), 5);
        assert_eq!(second.contacts[0].name, "P10");
        assert_eq!(second.pagination.total_pages, 2);
        assert!(!second.pagination.has_next_page);
        assert!(second.pagination.has_prev_page);
    }

    #[test]
    fn test_delete_then_delete_again() {
        let service = service();
        let contact = service.create_contact(draft("Ada")).unwrap();

        service.delete_contact(&contact.id).unwrap();
        let error = service.delete_contact(&contact.id).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::NotFound { .. }));
    }
}

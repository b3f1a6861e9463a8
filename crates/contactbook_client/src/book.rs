/* 📖 # Why keep the view state in a plain struct?

ContactBook is everything a front end needs to render the address book: the current page
number, the contacts on it, the last pagination metadata, transient notices and form
errors. Each user action is one method that talks to the server through ContactApi and
then updates the state. The list is only ever replaced by what the server returns; there
are no optimistic updates, and a failed call leaves the previous list on screen.
*/

use tracing::warn;

use contactbook_engine::{Contact, ContactId, Pagination};

use crate::api::ContactApi;
use crate::validation::{ContactForm, FieldErrors};

pub const PAGE_SIZE: u64 = 10;

pub const LOAD_FAILED: &str = "Failed to load contacts";
pub const ADD_FAILED: &str = "Failed to add contact";
pub const DELETE_FAILED: &str = "Failed to delete contact";

/// Result of submitting the add-contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server stored the contact.
    Created(Contact),
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The server call failed; a notice was recorded.
    Failed,
}

#[derive(Debug)]
pub struct ContactBook<A: ContactApi> {
    api: A,
    current_page: u64,
    contacts: Vec<Contact>,
    pagination: Option<Pagination>,
    notices: Vec<String>,
    field_errors: FieldErrors,
}

impl<A: ContactApi> ContactBook<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            current_page: 1,
            contacts: Vec::new(),
            pagination: None,
            notices: Vec::new(),
            field_errors: FieldErrors::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Drain the pending notices.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the current page. Returns false when the fetch failed.
    pub fn refresh(&mut self) -> bool {
        match self.api.list(self.current_page, PAGE_SIZE) {
            Ok(page) => {
                self.contacts = page.contacts;
                self.pagination = Some(page.pagination);
                true
            }
            Err(e) => {
                warn!(error = %e, page = self.current_page, "failed to load contacts");
                self.notices.push(LOAD_FAILED.to_string());
                false
            }
        }
    }

    /// Advance one page and fetch it.
    ///
    /// `has_next_page` is not consulted; going past the last page shows an empty
    /// page. Use [`Self::can_go_next`] to disable the control instead.
    ///
    /// The page counter moves before the fetch and stays moved when the fetch
    /// fails, so a later [`Self::refresh`] retries the new page. The counter
    /// saturates at `u64::MAX`.
    pub fn next_page(&mut self) -> bool {
        self.current_page = self.current_page.saturating_add(1);
        self.refresh()
    }

    /// Go back one page and fetch it. Does nothing on page 1.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.current_page -= 1;
        self.refresh()
    }

    /// Jump straight to `page` (at least 1) and fetch it.
    pub fn go_to_page(&mut self, page: u64) -> bool {
        self.current_page = page.max(1);
        self.refresh()
    }

    pub fn can_go_next(&self) -> bool {
        self.pagination.is_some_and(|p| p.has_next_page)
    }

    pub fn can_go_prev(&self) -> bool {
        self.pagination.is_some_and(|p| p.has_prev_page)
    }

    /// Validate the form and, when it passes, create the contact and refetch the
    /// current page.
    pub fn submit(&mut self, form: &ContactForm) -> SubmitOutcome {
        let fields = match form.validate() {
            Ok(fields) => fields,
            Err(errors) => {
                self.field_errors = errors;
                return SubmitOutcome::Invalid;
            }
        };
        self.field_errors = FieldErrors::default();

        match self.api.create(&fields) {
            Ok(contact) => {
                self.refresh();
                SubmitOutcome::Created(contact)
            }
            Err(e) => {
                warn!(error = %e, "failed to add contact");
                self.notices.push(ADD_FAILED.to_string());
                SubmitOutcome::Failed
            }
        }
    }

    /// Delete a contact and refetch the current page. Returns false when the
    /// delete failed.
    pub fn delete(&mut self, id: &ContactId) -> bool {
        match self.api.delete(id) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(e) => {
                warn!(error = %e, id = %id, "failed to delete contact");
                self.notices.push(DELETE_FAILED.to_string());
                false
            }
        }
    }

    /// "Page X of Y (N contacts)", once a page has been loaded.
    pub fn status_line(&self) -> Option<String> {
        self.pagination.map(|p| {
            format!(
                "Page {} of {} ({} contacts)",
                p.current_page, p.total_pages, p.total_contacts
            )
        })
    }
}

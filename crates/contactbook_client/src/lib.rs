/* 📖 # Why a separate client crate?

contactbook_client is the consuming side of the contact API: a ContactApi trait with an
HTTP implementation, the form validation rules, and ContactBook, the view state a front
end drives. It shares the wire types with the server through contactbook_engine.
*/

pub mod api;
pub mod book;
mod loopback_tests;
pub mod validation;

pub use api::{ContactApi, DEFAULT_URL, HttpContactApi, URL_ENV};
pub use book::{ContactBook, PAGE_SIZE, SubmitOutcome};
pub use validation::{ContactForm, FieldErrors};

/* 📖 # Why a separate engine crate?

contactbook_engine holds everything the server knows about contacts: the data model,
pagination rules, the storage backends, the HTTP API and the server configuration.
It depends only on contactbook_base, so the client crate can reuse the wire types
without pulling in an HTTP server.
*/

pub mod api;
pub mod config;
pub mod contact;
pub mod contacts;
pub mod pagination;
pub mod store;

pub use api::ApiService;
pub use config::{CONFIG_FILE_NAME, Config, load_config};
pub use contact::{Contact, ContactDraft, ContactId, NewContact};
pub use contacts::ContactService;
pub use pagination::{ContactPage, PageRequest, Pagination};
pub use store::{ContactStore, InMemoryStore, SqliteStore, StoreHandle};

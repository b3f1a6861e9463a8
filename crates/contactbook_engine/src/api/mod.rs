/* 📖 # Why an API module in contactbook_engine?

The api module exposes the contact operations over HTTP. ApiService implements the
HttpService trait from contactbook_base, so the same service runs behind RealPal in
production and MockPal in tests.
*/

mod service;

pub(crate) use service::CORS_HEADERS;
pub use service::ApiService;

use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use contactbook_base::{ContactbookError, ContactbookResult, err};
use contactbook_engine::{Contact, ContactId, ContactPage, NewContact};

/// Environment variable naming the server the client talks to.
pub const URL_ENV: &str = "CONTACTBOOK_URL";
pub const DEFAULT_URL: &str = "http://localhost:3000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The operations the client needs from the contact server.
pub trait ContactApi {
    fn list(&self, page: u64, limit: u64) -> ContactbookResult<ContactPage>;
    fn create(&self, contact: &NewContact) -> ContactbookResult<Contact>;
    fn delete(&self, id: &ContactId) -> ContactbookResult<()>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// ContactApi over HTTP with a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpContactApi {
    base_url: String,
    client: Client,
}

impl HttpContactApi {
    pub fn new(base_url: impl Into<String>) -> ContactbookResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| err!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into an error carrying the server's message.
    fn check(response: Response) -> ContactbookResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        debug!(status = status.as_u16(), message = %message, "request rejected");
        let error = match status {
            StatusCode::BAD_REQUEST => ContactbookError::validation(message),
            StatusCode::NOT_FOUND => ContactbookError::not_found(message),
            _ => ContactbookError::message(message),
        };
        Err(Box::new(error.context(format!("server answered {}", status))))
    }

    fn read_json<T: DeserializeOwned>(response: Response) -> ContactbookResult<T> {
        response
            .json()
            .map_err(|e| err!("Unreadable response body: {}", e))
    }
}

impl ContactApi for HttpContactApi {
    #[instrument(skip(self))]
    fn list(&self, page: u64, limit: u64) -> ContactbookResult<ContactPage> {
        let url = self.url(&format!("/contacts?page={}&limit={}", page, limit));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| err!("Failed to reach {}: {}", url, e))?;
        Self::read_json(Self::check(response)?)
    }

    #[instrument(skip_all)]
    fn create(&self, contact: &NewContact) -> ContactbookResult<Contact> {
        let url = self.url("/contacts");
        let response = self
            .client
            .post(&url)
            .json(contact)
            .send()
            .map_err(|e| err!("Failed to reach {}: {}", url, e))?;
        Self::read_json(Self::check(response)?)
    }

    #[instrument(skip(self), fields(id = %id))]
    fn delete(&self, id: &ContactId) -> ContactbookResult<()> {
        let encoded = utf8_percent_encode(id.as_str(), NON_ALPHANUMERIC);
        let url = self.url(&format!("/contacts/{}", encoded));
        let response = self
            .client
            .delete(&url)
            .send()
            .map_err(|e| err!("Failed to reach {}: {}", url, e))?;
        Self::check(response)?;
        Ok(())
    }
}

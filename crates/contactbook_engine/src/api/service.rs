/* 📖 # Why a single unified API service?

ApiService is the one HttpService registered with the PAL. It routes every request
internally, so all endpoints share the same error mapping and CORS headers:

- `GET /contacts?page=&limit=` lists one page
- `POST /contacts` creates a contact from a JSON body
- `DELETE /contacts/{id}` removes a contact
- `GET /health` answers without touching the store
- `OPTIONS` on any path is a CORS preflight and answers 204
- everything else is 404

Failures never escape as `Err`: each handler turns its error into a JSON
`{"error": ...}` response with a status derived from the error kind. Storage faults
are logged with their full error tree and reported with a fixed message so internals
do not leak to clients.
*/

use serde::Serialize;
use tracing::{debug, error};

use contactbook_base::pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode,
};
use contactbook_base::{ContactbookError, ContactbookResult, ErrorKind};

use crate::contact::{ContactDraft, ContactId};
use crate::contacts::ContactService;
use crate::pagination::PageRequest;

pub(crate) const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, DELETE"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Unified HTTP service for the contact API.
#[derive(Debug, Clone)]
pub struct ApiService {
    contacts: ContactService,
}

impl ApiService {
    pub fn new(contacts: ContactService) -> Self {
        Self { contacts }
    }

    /// Serialize data to JSON and wrap it in a response with the given status.
    fn json_response<T: Serialize>(status: HttpStatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => HttpResponse::json(status, json),
            Err(e) => {
                error!(error = %e, "JSON serialization failed");
                Self::error_response(HttpStatusCode::InternalServerError, "Internal error")
            }
        }
    }

    fn error_response(status: HttpStatusCode, message: &str) -> HttpResponse {
        // ErrorBody always serializes
        let json = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from(r#"{"error":"Internal error"}"#));
        HttpResponse::json(status, json)
    }

    /// Map a failed operation to a response.
    ///
    /// `fault_message` is what clients see for storage and other internal faults.
    fn failure_response(error: &ContactbookError, fault_message: &str) -> HttpResponse {
        match error.kind() {
            ErrorKind::Validation { message } => {
                debug!(message = %message, "rejected invalid request");
                Self::error_response(HttpStatusCode::BadRequest, message)
            }
            ErrorKind::NotFound { .. } => {
                Self::error_response(HttpStatusCode::NotFound, "Contact not found")
            }
            _ => {
                error!(error = ?error, "{}", fault_message);
                Self::error_response(HttpStatusCode::InternalServerError, fault_message)
            }
        }
    }

    fn handle_list(&self, request: &HttpRequest) -> HttpResponse {
        let page = request.query_param("page");
        let limit = request.query_param("limit");
        let page_request = PageRequest::from_query(page.as_deref(), limit.as_deref());

        match self.contacts.list_page(page_request) {
            Ok(page) => Self::json_response(HttpStatusCode::Ok, &page),
            Err(e) => Self::failure_response(&e, "Failed to fetch contacts"),
        }
    }

    fn handle_create(&self, request: &HttpRequest) -> HttpResponse {
        let created = Self::parse_draft(request)
            .and_then(|draft| self.contacts.create_contact(draft));
        match created {
            Ok(contact) => Self::json_response(HttpStatusCode::Created, &contact),
            Err(e) => Self::failure_response(&e, "Failed to add contact"),
        }
    }

    fn handle_delete(&self, id: &str) -> HttpResponse {
        match self.contacts.delete_contact(&ContactId::from_string(id)) {
            Ok(()) => Self::json_response(HttpStatusCode::Ok, &SuccessBody { success: true }),
            Err(e) => Self::failure_response(&e, "Failed to delete contact"),
        }
    }

    /// An empty body counts as an empty object, so it fails the presence check
    /// rather than the JSON parse.
    fn parse_draft(request: &HttpRequest) -> ContactbookResult<ContactDraft> {
        let body = request.body();
        if body.as_bytes().iter().all(u8::is_ascii_whitespace) {
            return Ok(ContactDraft::default());
        }
        serde_json::from_slice(body.as_bytes()).map_err(|e| {
            debug!(error = %e, "unreadable request body");
            Box::new(ContactbookError::validation("Invalid JSON body"))
        })
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let segments = request.path_segments();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (request.method(), segments.as_slice()) {
            (HttpMethod::Options, _) => HttpResponse::no_content(),
            (HttpMethod::Get, ["health"]) => {
                Self::json_response(HttpStatusCode::Ok, &HealthBody { status: "ok" })
            }
            (HttpMethod::Get, ["contacts"]) => self.handle_list(request),
            (HttpMethod::Post, ["contacts"]) => self.handle_create(request),
            (HttpMethod::Delete, ["contacts", id]) => self.handle_delete(id),
            _ => Self::error_response(HttpStatusCode::NotFound, "Not found"),
        }
    }
}

impl HttpService for ApiService {
    fn handle_request(&self, request: HttpRequest) -> ContactbookResult<HttpResponse> {
        let mut response = self.route(&request);
        for (key, value) in CORS_HEADERS {
            response.headers_mut().insert(key, value);
        }
        Ok(response)
    }
}

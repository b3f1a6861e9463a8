/* 📖 # Why validate on the client at all?

The server only checks that fields are present. Format rules (a plausible email
address, a ten digit phone number) live here so the user gets per-field feedback
before anything is sent. Rules are checked against the raw input; the values that are
finally submitted are trimmed.
*/

use once_cell::sync::Lazy;
use regex::Regex;

use contactbook_engine::NewContact;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PHONE: &str = "Phone must be 10 digits";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid phone pattern"));

/// Raw input of the add-contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Per-field validation messages; `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub phone: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

pub fn validate_name(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(REQUIRED)
}

pub fn validate_email(value: &str) -> Option<&'static str> {
    check_pattern(value, &EMAIL_PATTERN, INVALID_EMAIL)
}

pub fn validate_phone(value: &str) -> Option<&'static str> {
    check_pattern(value, &PHONE_PATTERN, INVALID_PHONE)
}

fn check_pattern(value: &str, pattern: &Regex, message: &'static str) -> Option<&'static str> {
    if pattern.is_match(value) {
        None
    } else if value.is_empty() {
        Some(REQUIRED)
    } else {
        Some(message)
    }
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Check every field and return the trimmed values when all pass.
    pub fn validate(&self) -> Result<NewContact, FieldErrors> {
        let errors = FieldErrors {
            name: validate_name(&self.name),
            email: validate_email(&self.email),
            phone: validate_phone(&self.phone),
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewContact {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

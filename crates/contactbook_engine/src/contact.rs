/* 📖 # Why have a dedicated contact model?

Contact is the only entity in the system. Records are created or deleted, never modified,
so the model is a plain value type. The identifier is generated on the server at creation
time and is the only key used for lookup and deletion.
*/

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use contactbook_base::{ContactbookError, ContactbookResult};

/// Unique identifier for a contact.
///
/// Serialized as a bare string. Generated ids are random UUID v4 values; ids coming
/// from requests are taken as-is and simply fail to match when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Generate a fresh, globally unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn new(id: ContactId, fields: NewContact) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
        }
    }
}

/// The fields of a contact that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A creation request as received, before presence checks.
///
/// Absent and `null` fields both deserialize to `None`. Numbers and booleans are
/// accepted as their text, except `false` and zero which count as missing.
/// Arrays and objects are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactDraft {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub phone: Option<String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some("true".to_string())),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) if number.as_f64() == Some(0.0) => Ok(None),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string or scalar, got {}",
            other
        ))),
    }
}

impl ContactDraft {
    /// Require every field to be present and non-empty.
    ///
    /// Only presence is checked here; format checks belong to the client.
    pub fn validate(self) -> ContactbookResult<NewContact> {
        match (non_empty(self.name), non_empty(self.email), non_empty(self.phone)) {
            (Some(name), Some(email), Some(phone)) => Ok(NewContact { name, email, phone }),
            _ => Err(Box::new(ContactbookError::validation(
                "All fields are required",
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactbook_base::ErrorKind;

    fn draft(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> ContactDraft {
        ContactDraft {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ContactId::generate();
        let b = ContactId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_contact_serializes_with_wire_field_names() {
        let contact = Contact::new(
            ContactId::from_string("c-1"),
            NewContact {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "1234567890".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_string(&contact).unwrap(),
            r#"{"id":"c-1","name":"Ada","email":"ada@example.com","phone":"1234567890"}"#
        );
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        let fields = draft(Some("Ada"), Some("ada@example.com"), Some("1234567890"))
            .validate()
            .unwrap();
        assert_eq!(fields.name, "Ada");
    }

    #[test]
    fn test_validate_rejects_missing_or_empty_fields() {
        let cases = [
            draft(None, Some("a@b.co"), Some("1234567890")),
            draft(Some("Ada"), None, Some("1234567890")),
            draft(Some("Ada"), Some("a@b.co"), None),
            draft(Some(""), Some("a@b.co"), Some("1234567890")),
            draft(Some("Ada"), Some(""), Some("1234567890")),
            draft(Some("Ada"), Some("a@b.co"), Some("")),
        ];
        for case in cases {
            let error = case.clone().validate().unwrap_err();
            match error.kind() {
                ErrorKind::Validation { message } => {
                    assert_eq!(message, "All fields are required")
                }
                other => panic!("Expected Validation for {:?}, got {:?}", case, other),
            }
        }
    }

    #[test]
    fn test_validate_keeps_whitespace_values() {
        // presence only: formatting is the client's concern
        let fields = draft(Some(" "), Some(" "), Some(" ")).validate().unwrap();
        assert_eq!(fields.phone, " ");
    }

    #[test]
    fn test_draft_accepts_scalar_values_as_text() {
        let draft: ContactDraft =
            serde_json::from_str(r#"{"name":true,"email":"a@b.co","phone":1234567890}"#)
                .unwrap();
        assert_eq!(draft.name.as_deref(), Some("true"));
        assert_eq!(draft.phone.as_deref(), Some("1234567890"));
        assert_eq!(draft.validate().unwrap().phone, "1234567890");
    }

    #[test]
    fn test_draft_treats_false_and_zero_as_missing() {
        for body in [
            r#"{"name":false,"email":"a@b.co","phone":"1"}"#,
            r#"{"name":"Ada","email":"a@b.co","phone":0}"#,
            r#"{"name":"Ada","email":"a@b.co","phone":0.0}"#,
        ] {
            let draft: ContactDraft = serde_json::from_str(body).unwrap();
            assert!(draft.validate().is_err(), "{}", body);
        }
    }

    #[test]
    fn test_draft_rejects_structured_values() {
        for body in [
            r#"{"name":["Ada"],"email":"a@b.co","phone":"1"}"#,
            r#"{"name":"Ada","email":{"at":"b.co"},"phone":"1"}"#,
        ] {
            assert!(serde_json::from_str::<ContactDraft>(body).is_err(), "{}", body);
        }
    }

    #[test]
    fn test_draft_treats_null_as_missing() {
        let draft: ContactDraft =
            serde_json::from_str(r#"{"name":null,"email":"a@b.co","phone":"1"}"#).unwrap();
        assert_eq!(draft.name, None);
        assert!(draft.validate().is_err());
    }
}

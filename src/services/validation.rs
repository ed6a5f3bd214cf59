//! Field rules for beneficiary payloads, checked at the service boundary.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::database::models::BeneficiaryChanges;

pub type FieldErrors = HashMap<String, String>;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_URL: &str = "Enter a valid URL.";

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// One payload key: absent, explicitly `null`, or some JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldInput {
    #[default]
    Missing,
    Null,
    Value(Value),
}

impl<'de> Deserialize<'de> for FieldInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => FieldInput::Null,
            value => FieldInput::Value(value),
        })
    }
}

impl FieldInput {
    pub fn text(value: impl Into<String>) -> Self {
        FieldInput::Value(Value::String(value.into()))
    }
}

/// Client-writable beneficiary fields. Any other key in the body, including
/// `id`, `creator_email` and `creation_date`, is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeneficiaryPayload {
    #[serde(default)]
    pub name: FieldInput,
    #[serde(default)]
    pub avatar_url: FieldInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub max_chars: usize,
}

impl FieldRule {
    /// Normalize and check one value. Strings are trimmed; numbers are
    /// accepted and rendered as text.
    pub fn clean(&self, input: &FieldInput, required: bool) -> Result<Option<String>, String> {
        let raw = match input {
            FieldInput::Missing if required => return Err(REQUIRED.to_string()),
            FieldInput::Missing => return Ok(None),
            FieldInput::Null => return Err(NOT_NULL.to_string()),
            FieldInput::Value(Value::String(s)) => s.trim().to_string(),
            FieldInput::Value(Value::Number(n)) => n.to_string(),
            FieldInput::Value(_) => return Err(NOT_A_STRING.to_string()),
        };

        if raw.is_empty() {
            return Err(NOT_BLANK.to_string());
        }
        if raw.chars().count() > self.max_chars {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                self.max_chars
            ));
        }
        if self.kind == FieldKind::Url && !is_valid_url(&raw) {
            return Err(INVALID_URL.to_string());
        }
        Ok(Some(raw))
    }
}

/// Constraints for every client-writable beneficiary column.
#[derive(Debug, Clone, Copy)]
pub struct BeneficiarySchema {
    pub name: FieldRule,
    pub avatar_url: FieldRule,
}

impl Default for BeneficiarySchema {
    fn default() -> Self {
        Self {
            name: FieldRule { kind: FieldKind::Text, max_chars: 255 },
            avatar_url: FieldRule { kind: FieldKind::Url, max_chars: 200 },
        }
    }
}

impl BeneficiarySchema {
    /// `name` is required; `avatar_url` may be omitted, in which case the
    /// returned changes leave it unset for the caller to default.
    pub fn validate_create(&self, payload: &BeneficiaryPayload) -> Result<BeneficiaryChanges, FieldErrors> {
        self.validate(payload, true, false)
    }

    /// Full updates need every mutable field; partial updates check only
    /// what was sent.
    pub fn validate_update(
        &self,
        payload: &BeneficiaryPayload,
        partial: bool,
    ) -> Result<BeneficiaryChanges, FieldErrors> {
        self.validate(payload, !partial, !partial)
    }

    /// Check a server-chosen name against the same rule clients get.
    pub fn check_name(&self, name: &str) -> Result<String, String> {
        self.name
            .clean(&FieldInput::text(name), true)?
            .ok_or_else(|| REQUIRED.to_string())
    }

    fn validate(
        &self,
        payload: &BeneficiaryPayload,
        name_required: bool,
        avatar_required: bool,
    ) -> Result<BeneficiaryChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self
            .name
            .clean(&payload.name, name_required)
            .map_err(|e| errors.insert("name".to_string(), e))
            .ok()
            .flatten();
        let avatar_url = self
            .avatar_url
            .clean(&payload.avatar_url, avatar_required)
            .map_err(|e| errors.insert("avatar_url".to_string(), e))
            .ok()
            .flatten();

        if errors.is_empty() {
            Ok(BeneficiaryChanges { name, avatar_url })
        } else {
            Err(errors)
        }
    }
}

pub fn is_valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => {
            URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> BeneficiaryPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn distinguishes_missing_from_null() {
        let p = payload(json!({"name": null}));
        assert_eq!(p.name, FieldInput::Null);
        assert_eq!(p.avatar_url, FieldInput::Missing);
    }

    #[test]
    fn create_requires_name() {
        let errors = BeneficiarySchema::default()
            .validate_create(&payload(json!({"avatar_url": "https://example.com/a.jpg"})))
            .unwrap_err();
        assert_eq!(errors["name"], REQUIRED);
    }

    #[test]
    fn create_rejects_blank_name() {
        let schema = BeneficiarySchema::default();
        for name in ["", "   "] {
            let errors = schema.validate_create(&payload(json!({"name": name}))).unwrap_err();
            assert_eq!(errors["name"], NOT_BLANK);
        }
    }

    #[test]
    fn name_length_counts_characters() {
        let schema = BeneficiarySchema::default();
        let ok = "é".repeat(255);
        assert!(schema.validate_create(&payload(json!({"name": ok}))).is_ok());

        let too_long = "a".repeat(256);
        let errors = schema.validate_create(&payload(json!({"name": too_long}))).unwrap_err();
        assert_eq!(errors["name"], "Ensure this field has no more than 255 characters.");
    }

    #[test]
    fn name_is_trimmed_and_numbers_coerced() {
        let schema = BeneficiarySchema::default();
        let changes = schema.validate_create(&payload(json!({"name": "  Jane Doe "}))).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Jane Doe"));

        let changes = schema.validate_create(&payload(json!({"name": 42}))).unwrap();
        assert_eq!(changes.name.as_deref(), Some("42"));

        let errors = schema.validate_create(&payload(json!({"name": ["x"]}))).unwrap_err();
        assert_eq!(errors["name"], NOT_A_STRING);
    }

    #[test]
    fn avatar_optional_on_create_but_validated() {
        let schema = BeneficiarySchema::default();
        let changes = schema.validate_create(&payload(json!({"name": "A"}))).unwrap();
        assert_eq!(changes.avatar_url, None);

        let errors = schema
            .validate_create(&payload(json!({"name": "A", "avatar_url": "not a url"})))
            .unwrap_err();
        assert_eq!(errors["avatar_url"], INVALID_URL);

        let errors = schema
            .validate_create(&payload(json!({"name": "A", "avatar_url": null})))
            .unwrap_err();
        assert_eq!(errors["avatar_url"], NOT_NULL);
    }

    #[test]
    fn collects_every_field_error() {
        let errors = BeneficiarySchema::default()
            .validate_create(&payload(json!({"name": "", "avatar_url": "ssh://host"})))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn full_update_needs_all_fields() {
        let schema = BeneficiarySchema::default();
        let errors = schema.validate_update(&payload(json!({"name": "A"})), false).unwrap_err();
        assert_eq!(errors["avatar_url"], REQUIRED);
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn partial_update_checks_only_sent_fields() {
        let schema = BeneficiarySchema::default();
        let changes = schema.validate_update(&payload(json!({"avatar_url": "https://x.io/a.png"})), true).unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.avatar_url.as_deref(), Some("https://x.io/a.png"));

        let errors = schema.validate_update(&payload(json!({"name": ""})), true).unwrap_err();
        assert_eq!(errors["name"], NOT_BLANK);
    }

    #[test]
    fn ignores_read_only_keys() {
        let p = payload(json!({
            "name": "A",
            "id": 99,
            "creator_email": "ignored@x.com",
            "creation_date": "2020-01-01T00:00:00Z"
        }));
        let changes = BeneficiarySchema::default().validate_create(&p).unwrap();
        assert_eq!(changes.name.as_deref(), Some("A"));
    }

    #[test]
    fn url_rules() {
        assert!(is_valid_url("https://example.com/avatar.jpg"));
        assert!(is_valid_url("https://api.dicebear.com/8.x/avataaars/svg?seed=Emma"));
        assert!(is_valid_url("ftp://files.example.org/a.png"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("example.com/avatar.jpg"));
    }
}

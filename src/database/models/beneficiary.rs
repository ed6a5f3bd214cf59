use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Beneficiary {
    pub id: i64,
    pub name: String,
    pub avatar_url: String,
    pub creator_email: Option<String>,
    pub creation_date: DateTime<Utc>,
}

impl std::fmt::Display for Beneficiary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validated values for a new row. `id` and `creation_date` come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeneficiary {
    pub name: String,
    pub avatar_url: String,
    pub creator_email: Option<String>,
}

/// Validated client-mutable changes; `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeneficiaryChanges {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl BeneficiaryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none()
    }

    pub fn apply(&self, record: &mut Beneficiary) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(avatar_url) = &self.avatar_url {
            record.avatar_url = avatar_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_name() {
        let b = Beneficiary {
            id: 1,
            name: "John Doe".into(),
            avatar_url: "https://example.com/avatar.jpg".into(),
            creator_email: Some("test@test.fr".into()),
            creation_date: Utc::now(),
        };
        assert_eq!(b.to_string(), "John Doe");
    }

    #[test]
    fn serializes_expected_fields() {
        let b = Beneficiary {
            id: 7,
            name: "Jane Doe".into(),
            avatar_url: "https://example.com/avatar.jpg".into(),
            creator_email: None,
            creation_date: Utc::now(),
        };
        let value = serde_json::to_value(&b).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["avatar_url", "creation_date", "creator_email", "id", "name"]);
        assert!(value["creator_email"].is_null());
    }

    #[test]
    fn changes_touch_only_supplied_fields() {
        let mut b = Beneficiary {
            id: 1,
            name: "Old".into(),
            avatar_url: "https://example.com/a.png".into(),
            creator_email: Some("c@x.io".into()),
            creation_date: Utc::now(),
        };
        let before = b.clone();
        BeneficiaryChanges { name: Some("New".into()), avatar_url: None }.apply(&mut b);
        assert_eq!(b.name, "New");
        assert_eq!(b.avatar_url, before.avatar_url);
        assert_eq!(b.creator_email, before.creator_email);
        assert_eq!(b.creation_date, before.creation_date);
    }
}

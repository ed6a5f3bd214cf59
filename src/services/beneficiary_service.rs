use std::sync::Arc;

use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::Caller;
use crate::config::{BeneficiaryConfig, ConfigError};
use crate::database::models::{Beneficiary, NewBeneficiary};
use crate::database::{BeneficiaryStore, DatabaseError};
use crate::services::validation::{BeneficiaryPayload, BeneficiarySchema, FieldErrors, FieldInput};

#[derive(Debug, Error)]
pub enum BeneficiaryError {
    #[error("Invalid beneficiary data")]
    Validation(FieldErrors),

    #[error("Authentication credentials were not provided")]
    Unauthorized,

    #[error("Beneficiary {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Beneficiary lifecycle over a [`BeneficiaryStore`].
///
/// Reads are public. Creates are public and record the caller's email when
/// there is one. Updates and deletes need an authenticated caller.
pub struct BeneficiaryService {
    store: Arc<dyn BeneficiaryStore>,
    schema: BeneficiarySchema,
    config: BeneficiaryConfig,
}

impl BeneficiaryService {
    pub fn new(store: Arc<dyn BeneficiaryStore>, config: BeneficiaryConfig) -> Result<Self, ConfigError> {
        Self::with_schema(store, config, BeneficiarySchema::default())
    }

    pub fn with_schema(
        store: Arc<dyn BeneficiaryStore>,
        config: BeneficiaryConfig,
        schema: BeneficiarySchema,
    ) -> Result<Self, ConfigError> {
        if config.random_names.is_empty() {
            return Err(ConfigError::EmptyRandomNames);
        }
        check_avatar(&schema, &config.default_avatar_url)?;
        for name in &config.random_names {
            schema.check_name(name).map_err(|reason| ConfigError::InvalidRandomName {
                name: name.clone(),
                reason,
            })?;
            check_avatar(&schema, &seeded_avatar(&config.avatar_seed_url, name))?;
        }

        Ok(Self { store, schema, config })
    }

    pub fn random_names(&self) -> &[String] {
        &self.config.random_names
    }

    /// All beneficiaries, or those whose name contains every whitespace- or
    /// comma-separated term of `search`.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Beneficiary>, BeneficiaryError> {
        let terms = search.map(search_terms).unwrap_or_default();
        debug!(terms = ?terms, "listing beneficiaries");
        Ok(self.store.list(&terms).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Beneficiary, BeneficiaryError> {
        self.store.get(id).await?.ok_or(BeneficiaryError::NotFound(id))
    }

    pub async fn create(
        &self,
        caller: &Caller,
        payload: &BeneficiaryPayload,
    ) -> Result<Beneficiary, BeneficiaryError> {
        let fields = self
            .schema
            .validate_create(payload)
            .map_err(BeneficiaryError::Validation)?;

        let new = NewBeneficiary {
            name: fields.name.ok_or_else(|| {
                BeneficiaryError::Validation(FieldErrors::from([(
                    "name".to_string(),
                    crate::services::validation::REQUIRED.to_string(),
                )]))
            })?,
            avatar_url: fields
                .avatar_url
                .unwrap_or_else(|| self.config.default_avatar_url.clone()),
            creator_email: caller.email().map(str::to_string),
        };
        self.insert(new).await
    }

    /// Create a beneficiary named after a random entry of the configured
    /// list, with an avatar seeded by that name.
    pub async fn create_random(&self, caller: &Caller) -> Result<Beneficiary, BeneficiaryError> {
        let name = self
            .config
            .random_names
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                BeneficiaryError::Validation(FieldErrors::from([(
                    "name".to_string(),
                    "No random names configured.".to_string(),
                )]))
            })?;

        let new = NewBeneficiary {
            avatar_url: seeded_avatar(&self.config.avatar_seed_url, &name),
            name,
            creator_email: caller.email().map(str::to_string),
        };
        self.insert(new).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        payload: &BeneficiaryPayload,
        partial: bool,
    ) -> Result<Beneficiary, BeneficiaryError> {
        if !caller.is_authenticated() {
            return Err(BeneficiaryError::Unauthorized);
        }

        let changes = match self.schema.validate_update(payload, partial) {
            Ok(changes) => changes,
            Err(errors) => {
                // An unknown id wins over a bad payload
                self.get(id).await?;
                return Err(BeneficiaryError::Validation(errors));
            }
        };

        if changes.is_empty() {
            return self.get(id).await;
        }

        let updated = self
            .store
            .update(id, changes)
            .await?
            .ok_or(BeneficiaryError::NotFound(id))?;
        info!(id, partial, "beneficiary updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), BeneficiaryError> {
        if !caller.is_authenticated() {
            return Err(BeneficiaryError::Unauthorized);
        }

        if !self.store.delete(id).await? {
            return Err(BeneficiaryError::NotFound(id));
        }
        info!(id, "beneficiary deleted");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), BeneficiaryError> {
        Ok(self.store.health_check().await?)
    }

    async fn insert(&self, new: NewBeneficiary) -> Result<Beneficiary, BeneficiaryError> {
        let created = self.store.insert(new).await?;
        info!(
            id = created.id,
            attributed = created.creator_email.is_some(),
            "beneficiary created"
        );
        Ok(created)
    }
}

fn seeded_avatar(seed_url: &str, name: &str) -> String {
    let seed: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("{}{}", seed_url, seed)
}

/// Server-chosen avatars must pass the same rule as client-supplied ones.
fn check_avatar(schema: &BeneficiarySchema, url: &str) -> Result<(), ConfigError> {
    schema
        .avatar_url
        .clean(&FieldInput::text(url), true)
        .map(|_| ())
        .map_err(|reason| ConfigError::InvalidAvatarUrl {
            url: url.to_string(),
            reason,
        })
}

fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

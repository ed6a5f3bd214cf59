use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Beneficiary, BeneficiaryChanges, NewBeneficiary};

/// Durable keyed table of beneficiaries.
///
/// Every method is a single atomic statement against the backing table; the
/// store assigns `id` and `creation_date` on insert and never reuses an id.
#[async_trait]
pub trait BeneficiaryStore: Send + Sync {
    /// Rows in insertion order. With `terms`, only rows whose name contains
    /// every term, ignoring case.
    async fn list(&self, terms: &[String]) -> Result<Vec<Beneficiary>, DatabaseError>;

    async fn get(&self, id: i64) -> Result<Option<Beneficiary>, DatabaseError>;

    async fn insert(&self, new: NewBeneficiary) -> Result<Beneficiary, DatabaseError>;

    /// Apply `changes` to the row, returning it, or `None` if no such row.
    async fn update(
        &self,
        id: i64,
        changes: BeneficiaryChanges,
    ) -> Result<Option<Beneficiary>, DatabaseError>;

    /// `true` if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

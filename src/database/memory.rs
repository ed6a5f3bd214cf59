use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Beneficiary, BeneficiaryChanges, NewBeneficiary};
use crate::database::store::BeneficiaryStore;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Beneficiary>,
}

/// In-process beneficiary table. Ids keep increasing after deletes, same as
/// a sequence-backed column.
#[derive(Default)]
pub struct MemoryBeneficiaryStore {
    table: RwLock<Table>,
}

impl MemoryBeneficiaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BeneficiaryStore for MemoryBeneficiaryStore {
    async fn list(&self, terms: &[String]) -> Result<Vec<Beneficiary>, DatabaseError> {
        let needles: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|b| {
                let name = b.name.to_lowercase();
                needles.iter().all(|n| name.contains(n.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Beneficiary>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, new: NewBeneficiary) -> Result<Beneficiary, DatabaseError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let record = Beneficiary {
            id: table.last_id,
            name: new.name,
            avatar_url: new.avatar_url,
            creator_email: new.creator_email,
            creation_date: Utc::now(),
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        changes: BeneficiaryChanges,
    ) -> Result<Option<Beneficiary>, DatabaseError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|record| {
            changes.apply(record);
            record.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

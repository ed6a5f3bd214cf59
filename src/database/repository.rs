use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Beneficiary, BeneficiaryChanges, NewBeneficiary};
use crate::database::store::BeneficiaryStore;

const COLUMNS: &str = "id, name, avatar_url, creator_email, creation_date";

/// PostgreSQL-backed beneficiary table
#[derive(Clone)]
pub struct PgBeneficiaryStore {
    pool: PgPool,
}

impl PgBeneficiaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BeneficiaryStore for PgBeneficiaryStore {
    async fn list(&self, terms: &[String]) -> Result<Vec<Beneficiary>, DatabaseError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM beneficiaries", COLUMNS));
        for (i, term) in terms.iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            query.push("name ILIKE ");
            query.push_bind(format!("%{}%", escape_like(term)));
        }
        query.push(" ORDER BY id");

        query
            .build_query_as::<Beneficiary>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn get(&self, id: i64) -> Result<Option<Beneficiary>, DatabaseError> {
        let sql = format!("SELECT {} FROM beneficiaries WHERE id = $1", COLUMNS);
        sqlx::query_as::<_, Beneficiary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn insert(&self, new: NewBeneficiary) -> Result<Beneficiary, DatabaseError> {
        let sql = format!(
            "INSERT INTO beneficiaries (name, avatar_url, creator_email) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        );
        sqlx::query_as::<_, Beneficiary>(&sql)
            .bind(new.name)
            .bind(new.avatar_url)
            .bind(new.creator_email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn update(
        &self,
        id: i64,
        changes: BeneficiaryChanges,
    ) -> Result<Option<Beneficiary>, DatabaseError> {
        // creator_email and creation_date are never updated
        let sql = format!(
            "UPDATE beneficiaries \
             SET name = COALESCE($2, name), avatar_url = COALESCE($3, avatar_url) \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        sqlx::query_as::<_, Beneficiary>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.avatar_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM beneficiaries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// Escape LIKE metacharacters so search terms match literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

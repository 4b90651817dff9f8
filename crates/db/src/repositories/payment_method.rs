use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use cobranza_core::domain::customer::CustomerId;
use cobranza_core::domain::payment_method::{
    NewPaymentMethod, PaymentMethod, PaymentMethodId, PaymentMethodPatch,
};

use super::{PaymentMethodRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPaymentMethodRepository {
    pool: DbPool,
}

impl SqlPaymentMethodRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// The token column is deliberately absent here: stored instruments are
// written on create/update but never decoded back out of the database.
const METHOD_COLUMNS: &str = "id, customer_id, type, provider, last4, expiry_month, expiry_year,
                              is_default, created_at, metadata";

fn row_to_method(row: &sqlx::sqlite::SqliteRow) -> Result<PaymentMethod, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id: String =
        row.try_get("customer_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let kind: String = row.try_get("type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let provider: Option<String> =
        row.try_get("provider").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let last4: Option<String> =
        row.try_get("last4").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expiry_month: Option<i64> =
        row.try_get("expiry_month").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expiry_year: Option<i64> =
        row.try_get("expiry_year").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let is_default: i64 =
        row.try_get("is_default").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let metadata_str: Option<String> =
        row.try_get("metadata").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("created_at: {e}")))?;
    let metadata = metadata_str
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| RepositoryError::Decode(format!("metadata: {e}")))?;

    Ok(PaymentMethod {
        id: PaymentMethodId(id),
        customer_id: CustomerId(customer_id),
        kind,
        provider,
        last4,
        expiry_month,
        expiry_year,
        is_default: is_default != 0,
        created_at,
        metadata,
    })
}

fn metadata_to_text(metadata: &Option<serde_json::Value>) -> Option<String> {
    metadata.as_ref().map(|value| value.to_string())
}

#[async_trait::async_trait]
impl PaymentMethodRepository for SqlPaymentMethodRepository {
    async fn create(&self, method: NewPaymentMethod) -> Result<PaymentMethod, RepositoryError> {
        let created = PaymentMethod {
            id: PaymentMethodId(Uuid::new_v4().to_string()),
            customer_id: method.customer_id,
            kind: method.kind,
            provider: method.provider,
            last4: method.last4,
            expiry_month: method.expiry_month,
            expiry_year: method.expiry_year,
            is_default: method.is_default,
            created_at: Utc::now(),
            metadata: method.metadata,
        };

        sqlx::query(
            "INSERT INTO payment_methods (id, customer_id, type, provider, token, last4,
                                          expiry_month, expiry_year, is_default, created_at,
                                          metadata)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created.id.0)
        .bind(&created.customer_id.0)
        .bind(&created.kind)
        .bind(&created.provider)
        .bind(&method.token)
        .bind(&created.last4)
        .bind(created.expiry_month)
        .bind(created.expiry_year)
        .bind(created.is_default as i64)
        .bind(created.created_at.to_rfc3339())
        .bind(metadata_to_text(&created.metadata))
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: &PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_method(r)?)),
            None => Ok(None),
        }
    }

    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods
             WHERE customer_id = ?
             ORDER BY is_default DESC, created_at ASC"
        ))
        .bind(&customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_method).collect()
    }

    async fn update(
        &self,
        id: &PaymentMethodId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let Some(mut method) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(customer_id) = patch.customer_id {
            method.customer_id = customer_id;
        }
        if let Some(kind) = patch.kind {
            method.kind = kind;
        }
        if let Some(provider) = patch.provider {
            method.provider = Some(provider);
        }
        if let Some(last4) = patch.last4 {
            method.last4 = Some(last4);
        }
        if let Some(expiry_month) = patch.expiry_month {
            method.expiry_month = Some(expiry_month);
        }
        if let Some(expiry_year) = patch.expiry_year {
            method.expiry_year = Some(expiry_year);
        }
        if let Some(is_default) = patch.is_default {
            method.is_default = is_default;
        }
        if let Some(metadata) = patch.metadata {
            method.metadata = Some(metadata);
        }

        sqlx::query(
            "UPDATE payment_methods
             SET customer_id = ?, type = ?, provider = ?, last4 = ?, expiry_month = ?,
                 expiry_year = ?, is_default = ?, metadata = ?,
                 token = COALESCE(?, token)
             WHERE id = ?",
        )
        .bind(&method.customer_id.0)
        .bind(&method.kind)
        .bind(&method.provider)
        .bind(&method.last4)
        .bind(method.expiry_month)
        .bind(method.expiry_year)
        .bind(method.is_default as i64)
        .bind(metadata_to_text(&method.metadata))
        .bind(&patch.token)
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(Some(method))
    }

    async fn delete(&self, id: &PaymentMethodId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use cobranza_core::domain::customer::{Customer, CustomerId, CustomerPatch, NewCustomer};

use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String =
        row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let phone: Option<String> =
        row.try_get("phone").map_err(|e| RepositoryError::Decode(e.to_string()))?;
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

    Ok(Customer { id: CustomerId(id), name, email, phone, created_at, metadata })
}

fn metadata_to_text(metadata: &Option<serde_json::Value>) -> Option<String> {
    metadata.as_ref().map(|value| value.to_string())
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let created = Customer {
            id: CustomerId(Uuid::new_v4().to_string()),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            created_at: Utc::now(),
            metadata: customer.metadata,
        };

        sqlx::query(
            "INSERT INTO customers (id, name, email, phone, created_at, metadata)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&created.id.0)
        .bind(&created.name)
        .bind(&created.email)
        .bind(&created.phone)
        .bind(created.created_at.to_rfc3339())
        .bind(metadata_to_text(&created.metadata))
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, created_at, metadata
             FROM customers WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, created_at, metadata
             FROM customers ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn update(
        &self,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, RepositoryError> {
        let Some(mut customer) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            customer.name = name;
        }
        if let Some(email) = patch.email {
            customer.email = email;
        }
        if let Some(phone) = patch.phone {
            customer.phone = Some(phone);
        }
        if let Some(metadata) = patch.metadata {
            customer.metadata = Some(metadata);
        }

        sqlx::query(
            "UPDATE customers SET name = ?, email = ?, phone = ?, metadata = ? WHERE id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(metadata_to_text(&customer.metadata))
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(Some(customer))
    }

    async fn delete(&self, id: &CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

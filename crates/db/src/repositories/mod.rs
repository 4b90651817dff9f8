use async_trait::async_trait;
use thiserror::Error;

use cobranza_core::domain::customer::{Customer, CustomerId, CustomerPatch, NewCustomer};
use cobranza_core::domain::payment_method::{
    NewPaymentMethod, PaymentMethod, PaymentMethodId, PaymentMethodPatch,
};

pub mod customer;
pub mod payment_method;

pub use customer::SqlCustomerRepository;
pub use payment_method::SqlPaymentMethodRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn update(
        &self,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, RepositoryError>;
    async fn delete(&self, id: &CustomerId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    async fn create(&self, method: NewPaymentMethod) -> Result<PaymentMethod, RepositoryError>;
    async fn find_by_id(
        &self,
        id: &PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepositoryError>;

    /// Methods for a customer, best candidate first: defaults before
    /// non-defaults, oldest enrollment breaking ties.
    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<PaymentMethod>, RepositoryError>;

    async fn update(
        &self,
        id: &PaymentMethodId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>, RepositoryError>;
    async fn delete(&self, id: &PaymentMethodId) -> Result<bool, RepositoryError>;
}

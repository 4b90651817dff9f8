//! Customer CRUD:
//! - `GET    /customers`      — list customers
//! - `POST   /customers`      — create a customer
//! - `GET    /customers/{id}` — fetch one customer
//! - `PUT    /customers/{id}` — partial update
//! - `DELETE /customers/{id}` — delete (cascades to payment methods)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cobranza_core::domain::customer::{Customer, CustomerId, CustomerPatch, NewCustomer};
use cobranza_db::repositories::{CustomerRepository, SqlCustomerRepository};
use cobranza_db::DbPool;

use crate::envelope::ApiError;

#[derive(Clone)]
pub struct CustomersState {
    db_pool: DbPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(CustomersState { db_pool })
}

fn repository(state: &CustomersState) -> SqlCustomerRepository {
    SqlCustomerRepository::new(state.db_pool.clone())
}

pub async fn list_customers(
    State(state): State<CustomersState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = repository(&state).list().await?;
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<CustomersState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let mut missing = Vec::new();
    if request.name.is_none() {
        missing.push("name");
    }
    if request.email.is_none() {
        missing.push("email");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let created = repository(&state)
        .create(NewCustomer {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            phone: request.phone,
            metadata: request.metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_customer(
    State(state): State<CustomersState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let customer = repository(&state)
        .find_by_id(&CustomerId(id.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<CustomersState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    let patch = CustomerPatch {
        name: request.name,
        email: request.email,
        phone: request.phone,
        metadata: request.metadata,
    };
    if patch.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }

    let updated = repository(&state)
        .update(&CustomerId(id.clone()), patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;
    Ok(Json(updated))
}

pub async fn delete_customer(
    State(state): State<CustomersState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let removed = repository(&state).delete(&CustomerId(id.clone())).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("customer {id}")));
    }
    Ok(Json(DeletedResponse { message: "customer deleted" }))
}

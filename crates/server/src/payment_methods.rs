//! Payment-method CRUD:
//! - `GET    /payment_methods`      — list a customer's methods (query `customer_id`)
//! - `POST   /payment_methods`      — enroll a method
//! - `GET    /payment_methods/{id}` — fetch one method
//! - `PUT    /payment_methods/{id}` — partial update
//! - `DELETE /payment_methods/{id}` — delete
//!
//! The gateway token is accepted on create/update and never echoed back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cobranza_core::domain::customer::CustomerId;
use cobranza_core::domain::payment_method::{
    NewPaymentMethod, PaymentMethod, PaymentMethodId, PaymentMethodPatch,
};
use cobranza_db::repositories::{PaymentMethodRepository, SqlPaymentMethodRepository};
use cobranza_db::DbPool;

use crate::envelope::ApiError;

#[derive(Clone)]
pub struct PaymentMethodsState {
    db_pool: DbPool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub customer_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub token: Option<String>,
    pub provider: Option<String>,
    pub last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    #[serde(default)]
    pub is_default: bool,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentMethodRequest {
    pub customer_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub token: Option<String>,
    pub provider: Option<String>,
    pub last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub is_default: Option<bool>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/payment_methods", get(list_payment_methods).post(create_payment_method))
        .route(
            "/payment_methods/{id}",
            get(get_payment_method).put(update_payment_method).delete(delete_payment_method),
        )
        .with_state(PaymentMethodsState { db_pool })
}

fn repository(state: &PaymentMethodsState) -> SqlPaymentMethodRepository {
    SqlPaymentMethodRepository::new(state.db_pool.clone())
}

pub async fn list_payment_methods(
    State(state): State<PaymentMethodsState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let customer_id = query
        .customer_id
        .ok_or_else(|| ApiError::MissingFields(vec!["customer_id"]))?;

    let methods = repository(&state).list_for_customer(&CustomerId(customer_id)).await?;
    Ok(Json(methods))
}

pub async fn create_payment_method(
    State(state): State<PaymentMethodsState>,
    Json(request): Json<CreatePaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethod>), ApiError> {
    let mut missing = Vec::new();
    if request.customer_id.is_none() {
        missing.push("customer_id");
    }
    if request.kind.is_none() {
        missing.push("type");
    }
    if request.token.is_none() {
        missing.push("token");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let created = repository(&state)
        .create(NewPaymentMethod {
            customer_id: CustomerId(request.customer_id.unwrap_or_default()),
            kind: request.kind.unwrap_or_default(),
            provider: request.provider,
            token: request.token.unwrap_or_default(),
            last4: request.last4,
            expiry_month: request.expiry_month,
            expiry_year: request.expiry_year,
            is_default: request.is_default,
            metadata: request.metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_payment_method(
    State(state): State<PaymentMethodsState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentMethod>, ApiError> {
    let method = repository(&state)
        .find_by_id(&PaymentMethodId(id.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("payment method {id}")))?;
    Ok(Json(method))
}

pub async fn update_payment_method(
    State(state): State<PaymentMethodsState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePaymentMethodRequest>,
) -> Result<Json<PaymentMethod>, ApiError> {
    let patch = PaymentMethodPatch {
        customer_id: request.customer_id.map(CustomerId),
        kind: request.kind,
        provider: request.provider,
        token: request.token,
        last4: request.last4,
        expiry_month: request.expiry_month,
        expiry_year: request.expiry_year,
        is_default: request.is_default,
        metadata: request.metadata,
    };
    if patch.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }

    let updated = repository(&state)
        .update(&PaymentMethodId(id.clone()), patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("payment method {id}")))?;
    Ok(Json(updated))
}

pub async fn delete_payment_method(
    State(state): State<PaymentMethodsState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let removed = repository(&state).delete(&PaymentMethodId(id.clone())).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("payment method {id}")));
    }
    Ok(Json(DeletedResponse { message: "payment method deleted" }))
}

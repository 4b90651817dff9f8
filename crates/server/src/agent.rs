//! `POST /agent/decision` — the composite endpoint: one read of the
//! customer's stored payment methods, then pure decision logic.

use axum::{extract::State, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cobranza_core::decision::{decide, Decision, DecisionInput};
use cobranza_core::domain::customer::CustomerId;
use cobranza_core::errors::DomainError;
use cobranza_db::repositories::{PaymentMethodRepository, SqlPaymentMethodRepository};
use cobranza_db::DbPool;

use crate::envelope::ApiError;

#[derive(Clone)]
pub struct AgentState {
    db_pool: DbPool,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub customer_id: Option<String>,
    pub segmento: Option<String>,
    pub amount_due: Option<Decimal>,
    pub dpd: Option<u32>,
    pub propension_pago: Option<f64>,
    pub currency: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub status: &'static str,
    pub decision: Decision,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/agent/decision", post(agent_decision))
        .with_state(AgentState { db_pool })
}

pub async fn agent_decision(
    State(state): State<AgentState>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    // Validation happens before the store is touched.
    let mut missing = Vec::new();
    if request.customer_id.is_none() {
        missing.push("customer_id");
    }
    if request.segmento.is_none() {
        missing.push("segmento");
    }
    if request.amount_due.is_none() {
        missing.push("amount_due");
    }
    if request.dpd.is_none() {
        missing.push("dpd");
    }
    if request.propension_pago.is_none() {
        missing.push("propension_pago");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let input = DecisionInput {
        customer_id: CustomerId(request.customer_id.unwrap_or_default()),
        segment: request.segmento.unwrap_or_default(),
        amount_due: request.amount_due.unwrap_or_default(),
        days_past_due: request.dpd.unwrap_or_default(),
        propensity_score: request.propension_pago.unwrap_or_default(),
        currency: request.currency.unwrap_or_else(|| "MXN".to_string()),
        channel: request.channel,
    };

    let repository = SqlPaymentMethodRepository::new(state.db_pool.clone());
    let stored = repository.list_for_customer(&input.customer_id).await?;

    let decision = decide(&input, stored).map_err(|error| match error {
        DomainError::UnsupportedPaymentMethod(kind) => {
            ApiError::BadRequest(format!("unsupported payment method: {kind}"))
        }
    })?;

    Ok(Json(DecisionResponse { status: "ok", decision }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use cobranza_core::domain::customer::NewCustomer;
    use cobranza_core::domain::payment_method::NewPaymentMethod;
    use cobranza_db::migrations::run_pending;
    use cobranza_db::repositories::{
        CustomerRepository, PaymentMethodRepository, SqlCustomerRepository,
        SqlPaymentMethodRepository,
    };
    use cobranza_db::{connect_with_settings, DbPool};

    use super::router;

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        pool
    }

    async fn post_decision(pool: DbPool, body: Value) -> (StatusCode, Value) {
        let response = router(pool)
            .oneshot(
                Request::post("/agent/decision")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    async fn seed_customer_with_card(pool: &DbPool) -> String {
        let customers = SqlCustomerRepository::new(pool.clone());
        let methods = SqlPaymentMethodRepository::new(pool.clone());

        let customer = customers
            .create(NewCustomer {
                name: "maria".to_string(),
                email: "maria@example.com".to_string(),
                phone: None,
                metadata: None,
            })
            .await
            .expect("create customer");

        methods
            .create(NewPaymentMethod {
                customer_id: customer.id.clone(),
                kind: "card".to_string(),
                provider: Some("stripe".to_string()),
                token: "tok_test_1234".to_string(),
                last4: Some("4242".to_string()),
                expiry_month: Some(11),
                expiry_year: Some(2030),
                is_default: true,
                metadata: None,
            })
            .await
            .expect("create method");

        customer.id.0
    }

    #[tokio::test]
    async fn decision_uses_the_stored_default_method() {
        let pool = pool().await;
        let customer_id = seed_customer_with_card(&pool).await;

        let (status, body) = post_decision(
            pool,
            json!({
                "customer_id": customer_id,
                "segmento": "vip",
                "amount_due": 6000,
                "dpd": 45,
                "propension_pago": 0.6
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        let decision = &body["decision"];
        assert_eq!(decision["customer_id"], customer_id);
        assert_eq!(decision["best_payment_method"]["type"], "card");
        assert_eq!(decision["best_payment_method"]["last4"], "4242");
        assert!(decision["best_payment_method"].get("token").is_none());
        assert_eq!(decision["negotiation_proposal"]["tactic"], "installments");
        assert_eq!(decision["negotiation_proposal"]["installments"], 4);
        assert_eq!(decision["payment_route"]["routed_to"], "stripe");
        assert!(decision["speech"].as_str().expect("speech").ends_with("Shall we proceed?"));
    }

    #[tokio::test]
    async fn decision_falls_back_when_no_method_is_stored() {
        let pool = pool().await;

        let (status, body) = post_decision(
            pool,
            json!({
                "customer_id": "cus-unknown",
                "segmento": "consumo",
                "amount_due": 1000,
                "dpd": 90,
                "propension_pago": 0.3,
                "currency": "cop",
                "channel": "tienda fisica"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let decision = &body["decision"];
        // COP wins over the in-person channel.
        assert_eq!(
            decision["best_payment_method"],
            json!({"type": "pse", "provider": "pse_gateway"})
        );
        assert_eq!(decision["payment_route"]["currency"], "COP");
        assert_eq!(decision["negotiation_proposal"]["tactic"], "hybrid");
    }

    #[tokio::test]
    async fn stored_method_with_unknown_kind_maps_to_400() {
        let pool = pool().await;
        let customers = SqlCustomerRepository::new(pool.clone());
        let methods = SqlPaymentMethodRepository::new(pool.clone());

        let customer = customers
            .create(NewCustomer {
                name: "maria".to_string(),
                email: "maria@example.com".to_string(),
                phone: None,
                metadata: None,
            })
            .await
            .expect("create customer");
        methods
            .create(NewPaymentMethod {
                customer_id: customer.id.clone(),
                kind: "cheque".to_string(),
                provider: None,
                token: "tok_test_1234".to_string(),
                last4: None,
                expiry_month: None,
                expiry_year: None,
                is_default: true,
                metadata: None,
            })
            .await
            .expect("create method");

        let (status, body) = post_decision(
            pool,
            json!({
                "customer_id": customer.id.0,
                "segmento": "pyme",
                "amount_due": 500,
                "dpd": 10,
                "propension_pago": 0.5
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["codigo"], "ERROR_400");
        assert!(body["mensaje"].as_str().expect("mensaje").contains("cheque"));
    }

    #[tokio::test]
    async fn missing_fields_fail_before_any_store_access() {
        let pool = pool().await;
        // A closed pool proves the handler never reaches the store.
        pool.close().await;

        let (status, body) = post_decision(pool, json!({"segmento": "vip"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["codigo"], "ERROR_400");
        let mensaje = body["mensaje"].as_str().expect("mensaje");
        assert!(mensaje.contains("customer_id"));
        assert!(mensaje.contains("amount_due"));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_generic_500_envelope() {
        let pool = pool().await;
        pool.close().await;

        let (status, body) = post_decision(
            pool,
            json!({
                "customer_id": "cus-1",
                "segmento": "pyme",
                "amount_due": 500,
                "dpd": 10,
                "propension_pago": 0.5
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["codigo"], "ERROR_500");
        assert_eq!(body["mensaje"], "internal server error");
    }
}

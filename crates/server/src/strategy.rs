//! Stateless strategy endpoints:
//! - `POST /strategy/payment_route`     — pick and execute a payment route
//! - `POST /strategy/negotiation_offer` — pick a tactic and build an offer

use axum::{routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cobranza_core::strategy::negotiation::{propose, NegotiationContext, Proposal};
use cobranza_core::strategy::payment::{route_payment, PaymentMethodKind, RouteDescriptor, RoutePayload};

use crate::envelope::ApiError;

// All request fields are optional at the serde layer so absence surfaces
// as a 400 envelope instead of a body-rejection.
#[derive(Debug, Deserialize)]
pub struct PaymentRouteRequest {
    pub payment_method: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub provider: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PaymentRouteResponse {
    pub status: &'static str,
    pub route: RouteDescriptor,
}

#[derive(Debug, Deserialize)]
pub struct NegotiationOfferRequest {
    pub segmento: Option<String>,
    pub amount_due: Option<Decimal>,
    pub dpd: Option<u32>,
    pub propension_pago: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NegotiationOfferResponse {
    pub status: &'static str,
    pub proposal: Proposal,
}

pub fn router() -> Router {
    Router::new()
        .route("/strategy/payment_route", post(payment_route))
        .route("/strategy/negotiation_offer", post(negotiation_offer))
}

pub async fn payment_route(
    Json(request): Json<PaymentRouteRequest>,
) -> Result<Json<PaymentRouteResponse>, ApiError> {
    let mut missing = Vec::new();
    if request.payment_method.is_none() {
        missing.push("payment_method");
    }
    if request.amount.is_none() {
        missing.push("amount");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let raw_kind = request.payment_method.unwrap_or_default();
    let kind = PaymentMethodKind::parse(&raw_kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported payment method: {raw_kind}")))?;

    let payload = RoutePayload {
        amount: request.amount.unwrap_or_default(),
        currency: request.currency,
        provider: request.provider,
        metadata: request.metadata.unwrap_or_else(|| serde_json::json!({})),
    };
    let route = route_payment(kind, &payload);

    Ok(Json(PaymentRouteResponse { status: "ok", route }))
}

pub async fn negotiation_offer(
    Json(request): Json<NegotiationOfferRequest>,
) -> Result<Json<NegotiationOfferResponse>, ApiError> {
    let mut missing = Vec::new();
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

    let context = NegotiationContext {
        segment: request.segmento.unwrap_or_default(),
        amount_due: request.amount_due.unwrap_or_default(),
        days_past_due: request.dpd.unwrap_or_default(),
        propensity_score: request.propension_pago.unwrap_or_default(),
    };
    let proposal = propose(&context);

    Ok(Json(NegotiationOfferResponse { status: "ok", proposal }))
}

//! The agent decision path: pick the best stored payment method (or infer
//! one), derive a negotiation offer, execute the routing strategy, and
//! render the speech line the agent reads to the customer.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::domain::customer::CustomerId;
use crate::domain::payment_method::PaymentMethod;
use crate::errors::DomainError;
use crate::strategy::negotiation::{propose, NegotiationContext, Proposal, Tactic};
use crate::strategy::payment::{route_payment, PaymentMethodKind, RouteDescriptor, RoutePayload};

#[derive(Clone, Debug, PartialEq)]
pub struct DecisionInput {
    pub customer_id: CustomerId,
    pub segment: String,
    pub amount_due: Decimal,
    pub days_past_due: u32,
    pub propensity_score: f64,
    pub currency: String,
    pub channel: Option<String>,
}

/// Method inferred when the customer has nothing on file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FallbackMethod {
    #[serde(rename = "type")]
    pub kind: PaymentMethodKind,
    pub provider: String,
}

/// Either the customer's best stored method or an inferred fallback.
/// Serializes untagged so stored methods keep their full row shape and
/// fallbacks stay a bare {type, provider} pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectedMethod {
    Stored(PaymentMethod),
    Inferred(FallbackMethod),
}

impl SelectedMethod {
    pub fn kind_raw(&self) -> &str {
        match self {
            Self::Stored(method) => &method.kind,
            Self::Inferred(fallback) => fallback.kind.as_str(),
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Stored(method) => method.provider.as_deref(),
            Self::Inferred(fallback) => Some(&fallback.provider),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decision {
    pub customer_id: CustomerId,
    pub best_payment_method: SelectedMethod,
    pub payment_route: RouteDescriptor,
    pub negotiation_proposal: Proposal,
    pub speech: String,
}

/// Fallback precedence: Colombian pesos imply bank redirect; in-person
/// channels imply cash collection; everything else gets a card attempt.
pub fn infer_fallback_method(channel: Option<&str>, currency: &str) -> FallbackMethod {
    let channel = channel.unwrap_or("").to_lowercase();

    if currency.trim().eq_ignore_ascii_case("COP") {
        return FallbackMethod { kind: PaymentMethodKind::Pse, provider: "pse_gateway".to_string() };
    }
    if ["ivr", "tienda", "presencial"].iter().any(|needle| channel.contains(needle)) {
        return FallbackMethod {
            kind: PaymentMethodKind::Corresponsal,
            provider: "oxxo_pay".to_string(),
        };
    }

    FallbackMethod { kind: PaymentMethodKind::Card, provider: "stripe".to_string() }
}

/// Composes the full decision from validated input plus the customer's
/// stored methods, already ordered best-first by the repository.
pub fn decide(input: &DecisionInput, stored: Vec<PaymentMethod>) -> Result<Decision, DomainError> {
    let currency = input.currency.trim().to_uppercase();

    let best = match stored.into_iter().next() {
        Some(method) => SelectedMethod::Stored(method),
        None => SelectedMethod::Inferred(infer_fallback_method(input.channel.as_deref(), &currency)),
    };

    let context = NegotiationContext {
        segment: input.segment.clone(),
        amount_due: input.amount_due,
        days_past_due: input.days_past_due,
        propensity_score: input.propensity_score,
    };
    let proposal = propose(&context);

    let kind = PaymentMethodKind::parse(best.kind_raw())
        .ok_or_else(|| DomainError::UnsupportedPaymentMethod(best.kind_raw().to_string()))?;
    let payload = RoutePayload {
        amount: input.amount_due,
        currency: Some(currency),
        provider: best.provider().map(str::to_string),
        metadata: json!({
            "customer_id": input.customer_id.0,
            "channel": input.channel,
        }),
    };
    let route = route_payment(kind, &payload);

    let speech = render_speech(&route, &proposal);

    Ok(Decision {
        customer_id: input.customer_id.clone(),
        best_payment_method: best,
        payment_route: route,
        negotiation_proposal: proposal,
        speech,
    })
}

/// Tactic sentence first, then the routing summary, then the closing ask.
pub fn render_speech(route: &RouteDescriptor, proposal: &Proposal) -> String {
    let mut parts = Vec::with_capacity(3);

    match proposal.tactic {
        Tactic::Discount => {
            if let Some(pct) = proposal.discount_pct {
                parts.push(format!(
                    "I can offer you a discount of {}% if we settle within 10 days.",
                    display_percent(pct)
                ));
            }
        }
        Tactic::Installments => {
            if let Some(count) = proposal.installments {
                parts.push(format!(
                    "I can offer you {count} interest-free monthly installments."
                ));
            }
        }
        Tactic::Hybrid => {
            if let (Some(pct), Some(count)) = (proposal.discount_pct, proposal.installments) {
                parts.push(format!(
                    "I can offer you a discount of {}% and {} interest-free monthly installments.",
                    display_percent(pct),
                    count
                ));
            }
        }
    }

    parts.push(format!(
        "To collect {} {}, the best route is {} via {} ({}).",
        route.amount.normalize(),
        route.currency,
        route.method,
        route.routed_to,
        route.steps.join(" → ")
    ));
    parts.push("Shall we proceed?".to_string());

    parts.join(" ")
}

fn display_percent(pct: Decimal) -> i64 {
    (pct * Decimal::from(100)).round().to_i64().unwrap_or(0)
}

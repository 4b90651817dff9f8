use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of supported charge routes. Placeholder for a real
/// gateway call; selecting a kind is a pure table lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    Card,
    Pse,
    Wallet,
    Corresponsal,
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PaymentMethodKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "card" => Some(Self::Card),
            "pse" => Some(Self::Pse),
            "wallet" => Some(Self::Wallet),
            "corresponsal" => Some(Self::Corresponsal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Pse => "pse",
            Self::Wallet => "wallet",
            Self::Corresponsal => "corresponsal",
        }
    }

    fn defaults(self) -> RouteDefaults {
        match self {
            Self::Card => RouteDefaults {
                provider: "stripe",
                currency: "MXN",
                steps: &["token-verify", "3ds-check", "auth", "capture"],
                reference_expires_in_hours: None,
            },
            Self::Pse => RouteDefaults {
                provider: "pse_gateway",
                currency: "COP",
                steps: &["bank-redirect", "notify-webhook"],
                reference_expires_in_hours: None,
            },
            Self::Wallet => RouteDefaults {
                provider: "mercado_pago",
                currency: "MXN",
                steps: &["wallet-charge"],
                reference_expires_in_hours: None,
            },
            Self::Corresponsal => RouteDefaults {
                provider: "oxxo_pay",
                currency: "MXN",
                steps: &["generate-reference", "await-cash-payment", "reconcile"],
                reference_expires_in_hours: Some(48),
            },
        }
    }
}

struct RouteDefaults {
    provider: &'static str,
    currency: &'static str,
    steps: &'static [&'static str],
    reference_expires_in_hours: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePayload {
    pub amount: Decimal,
    pub currency: Option<String>,
    pub provider: Option<String>,
    pub metadata: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub method: PaymentMethodKind,
    pub routed_to: String,
    pub steps: Vec<String>,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_expires_in_hours: Option<u32>,
    pub metadata: Value,
}

/// Executes the routing strategy for `kind`. Payload provider and currency
/// override the table defaults; amount and metadata pass through unchanged.
pub fn route_payment(kind: PaymentMethodKind, payload: &RoutePayload) -> RouteDescriptor {
    let defaults = kind.defaults();

    let routed_to = payload
        .provider
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(defaults.provider)
        .to_string();
    let currency = payload
        .currency
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(defaults.currency)
        .to_string();

    RouteDescriptor {
        method: kind,
        routed_to,
        steps: defaults.steps.iter().map(|step| (*step).to_string()).collect(),
        amount: payload.amount,
        currency,
        reference_expires_in_hours: defaults.reference_expires_in_hours,
        metadata: payload.metadata.clone(),
    }
}

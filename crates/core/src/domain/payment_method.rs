use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::customer::CustomerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentMethodId(pub String);

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored way to charge a customer. The gateway token is persisted but
/// never read back into this type; responses must not echo instruments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub customer_id: CustomerId,
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: Option<String>,
    pub last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPaymentMethod {
    pub customer_id: CustomerId,
    pub kind: String,
    pub provider: Option<String>,
    pub token: String,
    pub last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub is_default: bool,
    pub metadata: Option<Value>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentMethodPatch {
    pub customer_id: Option<CustomerId>,
    pub kind: Option<String>,
    pub provider: Option<String>,
    pub token: Option<String>,
    pub last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub is_default: Option<bool>,
    pub metadata: Option<Value>,
}

impl PaymentMethodPatch {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.kind.is_none()
            && self.provider.is_none()
            && self.token.is_none()
            && self.last4.is_none()
            && self.expiry_month.is_none()
            && self.expiry_year.is_none()
            && self.is_default.is_none()
            && self.metadata.is_none()
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-request negotiation inputs; constructed once, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NegotiationContext {
    pub segment: String,
    pub amount_due: Decimal,
    pub days_past_due: u32,
    pub propensity_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tactic {
    Discount,
    Installments,
    Hybrid,
}

impl Tactic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::Installments => "installments",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Tactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub tactic: Tactic,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate_monthly: Option<Decimal>,
    pub conditions: Vec<String>,
}

/// Ordered selection rules; the first match wins, so every context maps to
/// exactly one tactic.
pub fn select_tactic(context: &NegotiationContext) -> Tactic {
    let segment = context.segment.trim().to_lowercase();

    if matches!(segment.as_str(), "vip" | "consumo_alto") {
        return Tactic::Installments;
    }
    if context.days_past_due >= 60 && context.propensity_score < 0.5 {
        return Tactic::Hybrid;
    }
    if matches!(segment.as_str(), "pyme" | "consumo") && context.days_past_due < 60 {
        return Tactic::Discount;
    }

    Tactic::Discount
}

pub fn propose(context: &NegotiationContext) -> Proposal {
    match select_tactic(context) {
        Tactic::Discount => discount_proposal(context),
        Tactic::Installments => installments_proposal(context),
        Tactic::Hybrid => hybrid_proposal(context),
    }
}

fn discount_proposal(context: &NegotiationContext) -> Proposal {
    Proposal {
        tactic: Tactic::Discount,
        discount_pct: Some(discount_pct(context.days_past_due, context.propensity_score)),
        installments: None,
        interest_rate_monthly: None,
        conditions: conditions(&["pay-in-full", "settle-within-10-days"]),
    }
}

fn installments_proposal(context: &NegotiationContext) -> Proposal {
    Proposal {
        tactic: Tactic::Installments,
        discount_pct: None,
        installments: Some(installment_count(context.amount_due, context.days_past_due)),
        interest_rate_monthly: Some(Decimal::ZERO),
        conditions: conditions(&["enroll-autopay", "first-payment-immediate"]),
    }
}

/// Hybrid re-derives both sub-offers independently from the same context.
/// It deliberately does not apply the installment plan to the discounted
/// amount; the offer economics depend on keeping the two legs separate.
fn hybrid_proposal(context: &NegotiationContext) -> Proposal {
    Proposal {
        tactic: Tactic::Hybrid,
        discount_pct: Some(discount_pct(context.days_past_due, context.propensity_score)),
        installments: Some(installment_count(context.amount_due, context.days_past_due)),
        interest_rate_monthly: Some(Decimal::ZERO),
        conditions: conditions(&["sign-digital-agreement", "enroll-autopay"]),
    }
}

/// Longer arrears earn a larger incentive; a customer already likely to pay
/// needs less of one. Result is always within [0.05, 0.30].
fn discount_pct(days_past_due: u32, propensity_score: f64) -> Decimal {
    let base = Decimal::new(10, 2);
    let extra = (Decimal::from(days_past_due / 30) * Decimal::new(5, 2)).min(Decimal::new(20, 2));
    let adjust = if propensity_score > 0.7 {
        Decimal::new(-5, 2)
    } else if propensity_score >= 0.4 {
        Decimal::ZERO
    } else {
        Decimal::new(5, 2)
    };

    (base + extra + adjust).clamp(Decimal::new(5, 2), Decimal::new(30, 2)).round_dp(3)
}

/// More arrears means more slots (capped at 12), but each installment must
/// stay at or above the minimum viable amount unless forced down to one.
fn installment_count(amount_due: Decimal, days_past_due: u32) -> u32 {
    let min_installment = Decimal::from(300);

    if amount_due <= Decimal::ZERO {
        return 1;
    }

    let mut count = ((days_past_due / 30) + 3).clamp(3, 12);
    while count > 1 && amount_due / Decimal::from(count) < min_installment {
        count -= 1;
    }
    count
}

fn conditions(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

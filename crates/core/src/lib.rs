pub mod config;
pub mod decision;
pub mod domain;
pub mod errors;
pub mod strategy;

pub use decision::{
    decide, infer_fallback_method, render_speech, Decision, DecisionInput, FallbackMethod,
    SelectedMethod,
};
pub use domain::customer::{Customer, CustomerId, CustomerPatch, NewCustomer};
pub use domain::payment_method::{
    NewPaymentMethod, PaymentMethod, PaymentMethodId, PaymentMethodPatch,
};
pub use errors::DomainError;
pub use strategy::negotiation::{propose, select_tactic, NegotiationContext, Proposal, Tactic};
pub use strategy::payment::{route_payment, PaymentMethodKind, RouteDescriptor, RoutePayload};

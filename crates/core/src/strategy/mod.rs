pub mod negotiation;
pub mod payment;

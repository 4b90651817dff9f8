use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn unsupported_method_names_the_offending_kind() {
        let error = DomainError::UnsupportedPaymentMethod("cheque".to_string());
        assert_eq!(error.to_string(), "unsupported payment method: cheque");
    }
}

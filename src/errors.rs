use thiserror::Error;

use crate::types::{CustomerId, LoanId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreditError {
    #[error("customer not found: {customer_id}")]
    CustomerNotFound {
        customer_id: CustomerId,
    },

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("concurrent update of customer {customer_id} loans, gave up after {attempts} attempts")]
    ConcurrencyConflict {
        customer_id: CustomerId,
        attempts: u32,
    },

    #[error("phone number already registered: {phone_number}")]
    DuplicatePhoneNumber {
        phone_number: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

impl CreditError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        CreditError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// true for unknown customers and loans
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CreditError::CustomerNotFound { .. } | CreditError::LoanNotFound { .. }
        )
    }

    /// true when the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, CreditError::ConcurrencyConflict { .. })
    }
}

impl From<serde_json::Error> for CreditError {
    fn from(e: serde_json::Error) -> Self {
        CreditError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CreditError>;

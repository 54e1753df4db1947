pub mod config;
pub mod decimal;
pub mod eligibility;
pub mod errors;
pub mod events;
pub mod origination;
pub mod payments;
pub mod repository;
pub mod scoring;
pub mod types;
pub mod views;

// re-export key types
pub use config::{DecisionConfig, EligibilityConfig, OriginationConfig, ScoringConfig};
pub use decimal::{Money, Rate};
pub use eligibility::{
    EligibilityDecision, EligibilityPolicy, EligibilityRequest, PricingTier, RejectionReason,
};
pub use errors::{CreditError, Result};
pub use events::{Event, EventStore};
pub use origination::{
    EligibilityQuote, LoanDetail, LoanOriginator, LoanRequest, LoanSummary, OriginationResult,
    OriginationStatus,
};
pub use payments::{compute_installment, total_interest, total_repayment, InstallmentQuote};
pub use repository::{CustomerSnapshot, InMemoryRepository, LoanRepository};
pub use scoring::{CreditScore, CreditScorer, ScoreBreakdown};
pub use types::{
    Customer, CustomerId, CustomerRegistration, LoanId, LoanRecord, NewCustomer, NewLoan,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

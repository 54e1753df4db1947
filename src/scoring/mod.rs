pub mod factors;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ScoringConfig;
use crate::decimal::Money;
use crate::types::{Customer, LoanRecord};

pub use factors::{FactorScores, LoanHistorySummary};

/// integer credit score in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreditScore(u8);

impl CreditScore {
    pub const MIN: CreditScore = CreditScore(0);
    pub const MAX: CreditScore = CreditScore(100);

    /// clamp into the valid range
    pub fn new(value: u8) -> Self {
        CreditScore(value.min(Self::MAX.0))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CreditScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// how a score was reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreBreakdown {
    /// no loans on record
    NoHistory { score: CreditScore },
    /// open principal above the approved limit
    OverExtended {
        open_principal: Money,
        approved_limit: Money,
    },
    /// weighted sum of the history factors
    Weighted {
        factors: FactorScores,
        score: CreditScore,
    },
}

impl ScoreBreakdown {
    pub fn score(&self) -> CreditScore {
        match self {
            ScoreBreakdown::NoHistory { score } => *score,
            ScoreBreakdown::OverExtended { .. } => CreditScore::MIN,
            ScoreBreakdown::Weighted { score, .. } => *score,
        }
    }
}

/// credit scoring engine
#[derive(Debug, Clone)]
pub struct CreditScorer {
    config: ScoringConfig,
}

impl CreditScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// score a customer's loan history as of a given date
    pub fn score(&self, customer: &Customer, history: &[LoanRecord], as_of: NaiveDate) -> CreditScore {
        self.breakdown(customer, history, as_of).score()
    }

    /// score with the per-factor contributions
    pub fn breakdown(
        &self,
        customer: &Customer,
        history: &[LoanRecord],
        as_of: NaiveDate,
    ) -> ScoreBreakdown {
        if history.is_empty() {
            return ScoreBreakdown::NoHistory {
                score: CreditScore::new(self.config.default_score),
            };
        }

        let summary = LoanHistorySummary::from_history(history, as_of, self.config.on_time_threshold);

        if summary.open_principal > customer.approved_limit {
            return ScoreBreakdown::OverExtended {
                open_principal: summary.open_principal,
                approved_limit: customer.approved_limit,
            };
        }

        let factors = FactorScores::evaluate(&summary, customer.approved_limit, &self.config);
        let score = truncate_score(factors.total());

        tracing::debug!(
            customer_id = customer.customer_id,
            total_loans = summary.total_loans,
            %score,
            "weighted credit score"
        );

        ScoreBreakdown::Weighted { factors, score }
    }
}

impl Default for CreditScorer {
    fn default() -> Self {
        Self::new(crate::config::DecisionConfig::standard().scoring)
    }
}

/// clamp to 0..=100 and truncate toward zero
fn truncate_score(raw: Decimal) -> CreditScore {
    let clamped = raw.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED).trunc();
    CreditScore::new(clamped.to_u8().unwrap_or(0))
}

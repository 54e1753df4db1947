use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EligibilityConfig;
use crate::decimal::{Money, Rate};
use crate::scoring::CreditScore;

/// inputs to a single eligibility decision
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRequest {
    pub score: CreditScore,
    pub requested_rate: Rate,
    pub requested_amount: Money,
    pub requested_tenure: u32,
    /// installments of loans the customer is still repaying
    pub open_installments: Money,
    pub monthly_income: Money,
}

/// score band a decision fell into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingTier {
    /// approved at any requested rate
    Unconditional,
    /// approved only at or above the tier minimum
    Conditional { score_above: u8, minimum_rate: Rate },
    /// below every tier
    Ineligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    RateBelowTierMinimum,
    CreditScoreTooLow,
    ObligationsExceedIncomeShare,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectionReason::RateBelowTierMinimum => "rate below minimum for tier",
            RejectionReason::CreditScoreTooLow => "credit score too low",
            RejectionReason::ObligationsExceedIncomeShare => "existing obligations exceed 50% of income",
        };
        f.write_str(message)
    }
}

/// outcome of the tiered policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub approved: bool,
    pub requested_rate: Rate,
    /// rate to price with; equals the requested rate unless a tier minimum was substituted
    pub corrected_rate: Rate,
    pub reason: Option<RejectionReason>,
    pub tier: PricingTier,
}

impl EligibilityDecision {
    pub fn rate_was_corrected(&self) -> bool {
        self.corrected_rate != self.requested_rate
    }
}

/// tiered approval policy shared by quotes and origination
#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    config: EligibilityConfig,
}

impl EligibilityPolicy {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn decide(&self, request: &EligibilityRequest) -> EligibilityDecision {
        let mut decision = self.tier_decision(request.score, request.requested_rate);

        // affordability is checked last and overrides any tier approval
        let ceiling = request.monthly_income.fraction(self.config.max_obligation_ratio);
        if request.open_installments.as_decimal() > ceiling {
            decision.approved = false;
            decision.reason = Some(RejectionReason::ObligationsExceedIncomeShare);
        }

        tracing::debug!(
            score = %request.score,
            approved = decision.approved,
            requested_rate = %decision.requested_rate,
            corrected_rate = %decision.corrected_rate,
            reason = ?decision.reason,
            "eligibility decided"
        );

        decision
    }

    fn tier_decision(&self, score: CreditScore, requested_rate: Rate) -> EligibilityDecision {
        let approve = |tier| EligibilityDecision {
            approved: true,
            requested_rate,
            corrected_rate: requested_rate,
            reason: None,
            tier,
        };

        if score.value() > self.config.unconditional_above {
            return approve(PricingTier::Unconditional);
        }

        // tiers are ordered highest floor first, the first match wins
        let matched = self
            .config
            .rate_tiers
            .iter()
            .find(|tier| score.value() > tier.score_above);

        match matched {
            Some(tier) => {
                let pricing = PricingTier::Conditional {
                    score_above: tier.score_above,
                    minimum_rate: tier.minimum_rate,
                };
                if requested_rate >= tier.minimum_rate {
                    approve(pricing)
                } else {
                    EligibilityDecision {
                        approved: false,
                        requested_rate,
                        corrected_rate: tier.minimum_rate,
                        reason: Some(RejectionReason::RateBelowTierMinimum),
                        tier: pricing,
                    }
                }
            }
            None => EligibilityDecision {
                approved: false,
                requested_rate,
                corrected_rate: requested_rate,
                reason: Some(RejectionReason::CreditScoreTooLow),
                tier: PricingTier::Ineligible,
            },
        }
    }
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(crate::config::DecisionConfig::standard().eligibility)
    }
}

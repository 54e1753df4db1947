use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CreditError, Result};

/// decision engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub scoring: ScoringConfig,
    pub eligibility: EligibilityConfig,
    pub origination: OriginationConfig,
}

/// credit score weights and bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// score for a customer with no loan history
    pub default_score: u8,
    /// share of tenure that must be paid on time
    pub on_time_threshold: Decimal,
    pub on_time_weight: Decimal,
    pub loan_count_bands: Vec<CountBand>,
    pub loan_count_floor: Decimal,
    pub current_year_bands: Vec<CountBand>,
    pub current_year_floor: Decimal,
    pub volume_bands: Vec<RatioBand>,
    pub volume_floor: Decimal,
}

/// awards `points` when a count is at most `max_count`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountBand {
    pub max_count: usize,
    pub points: Decimal,
}

/// awards `points` when a value is at most `max_ratio` of a reference amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub max_ratio: Decimal,
    pub points: Decimal,
}

/// tiered approval rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// scores strictly above this are approved at the requested rate
    pub unconditional_above: u8,
    /// conditional tiers, highest floor first
    pub rate_tiers: Vec<RateTier>,
    /// maximum share of monthly income already committed to installments
    pub max_obligation_ratio: Decimal,
}

/// scores strictly above `score_above` need at least `minimum_rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub score_above: u8,
    pub minimum_rate: Rate,
}

/// origination and registration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginationConfig {
    /// end date approximation, not calendar months
    pub days_per_month: u32,
    pub max_tenure_months: u32,
    pub max_conflict_retries: u32,
    pub approved_limit_multiplier: Decimal,
    pub approved_limit_rounding: Money,
    pub min_customer_age: u8,
    pub max_customer_age: u8,
    pub max_phone_length: usize,
}

impl DecisionConfig {
    /// standard retail lending policy
    pub fn standard() -> Self {
        Self {
            scoring: ScoringConfig {
                default_score: 50,
                on_time_threshold: dec!(0.9),
                on_time_weight: dec!(40),
                loan_count_bands: vec![
                    CountBand { max_count: 2, points: dec!(20) },
                    CountBand { max_count: 5, points: dec!(15) },
                ],
                loan_count_floor: dec!(10),
                current_year_bands: vec![
                    CountBand { max_count: 2, points: dec!(20) },
                    CountBand { max_count: 4, points: dec!(15) },
                ],
                current_year_floor: dec!(10),
                volume_bands: vec![
                    RatioBand { max_ratio: dec!(0.5), points: dec!(20) },
                    RatioBand { max_ratio: dec!(0.8), points: dec!(15) },
                ],
                volume_floor: dec!(10),
            },
            eligibility: EligibilityConfig {
                unconditional_above: 50,
                rate_tiers: vec![
                    RateTier { score_above: 30, minimum_rate: Rate::from_percentage(12) },
                    RateTier { score_above: 10, minimum_rate: Rate::from_percentage(16) },
                ],
                max_obligation_ratio: dec!(0.5),
            },
            origination: OriginationConfig {
                days_per_month: 30,
                max_tenure_months: 600,
                max_conflict_retries: 3,
                approved_limit_multiplier: dec!(36),
                approved_limit_rounding: Money::from_major(100_000),
                min_customer_age: 18,
                max_customer_age: 100,
                max_phone_length: 15,
            },
        }
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DecisionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.eligibility.validate()?;
        self.origination.validate()
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        if self.default_score > 100 {
            return Err(invalid("default score must be within 0..=100"));
        }
        if self.on_time_threshold <= Decimal::ZERO || self.on_time_threshold > Decimal::ONE {
            return Err(invalid("on-time threshold must be within (0, 1]"));
        }
        if !self.loan_count_bands.windows(2).all(|w| w[0].max_count < w[1].max_count)
            || !self.current_year_bands.windows(2).all(|w| w[0].max_count < w[1].max_count)
        {
            return Err(invalid("count bands must be in ascending order"));
        }
        if !self.volume_bands.windows(2).all(|w| w[0].max_ratio < w[1].max_ratio) {
            return Err(invalid("volume bands must be in ascending order"));
        }
        Ok(())
    }
}

impl EligibilityConfig {
    fn validate(&self) -> Result<()> {
        let mut ceiling = self.unconditional_above;
        for tier in &self.rate_tiers {
            if tier.score_above >= ceiling {
                return Err(invalid("rate tiers must descend below the unconditional score"));
            }
            if tier.minimum_rate.is_negative() {
                return Err(invalid("tier minimum rate cannot be negative"));
            }
            ceiling = tier.score_above;
        }
        if self.max_obligation_ratio <= Decimal::ZERO {
            return Err(invalid("obligation ratio must be positive"));
        }
        Ok(())
    }
}

impl OriginationConfig {
    fn validate(&self) -> Result<()> {
        if self.days_per_month == 0 || self.max_tenure_months == 0 {
            return Err(invalid("days per month and max tenure must be positive"));
        }
        if !self.approved_limit_rounding.is_positive() {
            return Err(invalid("approved limit rounding unit must be positive"));
        }
        if self.min_customer_age > self.max_customer_age {
            return Err(invalid("customer age range is empty"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> CreditError {
    CreditError::InvalidConfiguration {
        message: message.to_string(),
    }
}

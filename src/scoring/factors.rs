use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CountBand, RatioBand, ScoringConfig};
use crate::decimal::Money;
use crate::types::LoanRecord;

/// aggregates over a loan history that the score factors read
#[derive(Debug, Clone, PartialEq)]
pub struct LoanHistorySummary {
    pub total_loans: usize,
    pub paid_on_time_loans: usize,
    pub current_year_loans: usize,
    pub open_principal: Money,
    pub total_principal: Money,
}

impl LoanHistorySummary {
    pub fn from_history(history: &[LoanRecord], as_of: NaiveDate, on_time_threshold: Decimal) -> Self {
        let paid_on_time_loans = history
            .iter()
            .filter(|loan| {
                Decimal::from(loan.installments_paid_on_time)
                    >= on_time_threshold * Decimal::from(loan.tenure_months)
            })
            .count();

        let current_year_loans = history
            .iter()
            .filter(|loan| loan.start_date.year() == as_of.year())
            .count();

        Self {
            total_loans: history.len(),
            paid_on_time_loans,
            current_year_loans,
            open_principal: history
                .iter()
                .filter(|loan| loan.is_open())
                .map(|loan| loan.principal)
                .sum(),
            total_principal: history.iter().map(|loan| loan.principal).sum(),
        }
    }
}

/// contribution of each factor to the final score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub on_time: Decimal,
    pub loan_count: Decimal,
    pub current_year: Decimal,
    pub approved_volume: Decimal,
}

impl FactorScores {
    pub fn evaluate(summary: &LoanHistorySummary, approved_limit: Money, config: &ScoringConfig) -> Self {
        Self {
            on_time: on_time_points(summary, config.on_time_weight),
            loan_count: count_points(summary.total_loans, &config.loan_count_bands, config.loan_count_floor),
            current_year: count_points(
                summary.current_year_loans,
                &config.current_year_bands,
                config.current_year_floor,
            ),
            approved_volume: volume_points(
                summary.total_principal,
                approved_limit,
                &config.volume_bands,
                config.volume_floor,
            ),
        }
    }

    pub fn total(&self) -> Decimal {
        self.on_time.max(Decimal::ZERO)
            + self.loan_count.max(Decimal::ZERO)
            + self.current_year.max(Decimal::ZERO)
            + self.approved_volume.max(Decimal::ZERO)
    }
}

fn on_time_points(summary: &LoanHistorySummary, weight: Decimal) -> Decimal {
    if summary.total_loans == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(summary.paid_on_time_loans as u64) / Decimal::from(summary.total_loans as u64) * weight
}

/// first band whose ceiling covers the count, else the floor
fn count_points(count: usize, bands: &[CountBand], floor: Decimal) -> Decimal {
    bands
        .iter()
        .find(|band| count <= band.max_count)
        .map(|band| band.points)
        .unwrap_or(floor)
}

fn volume_points(total: Money, approved_limit: Money, bands: &[RatioBand], floor: Decimal) -> Decimal {
    bands
        .iter()
        .find(|band| total.as_decimal() <= approved_limit.fraction(band.max_ratio))
        .map(|band| band.points)
        .unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecisionConfig;
    use rust_decimal_macros::dec;

    fn summary(total: usize, current_year: usize, total_principal: i64) -> LoanHistorySummary {
        LoanHistorySummary {
            total_loans: total,
            paid_on_time_loans: total,
            current_year_loans: current_year,
            open_principal: Money::ZERO,
            total_principal: Money::from_major(total_principal),
        }
    }

    #[test]
    fn test_count_band_edges() {
        let config = DecisionConfig::standard().scoring;
        let points = |n| count_points(n, &config.loan_count_bands, config.loan_count_floor);

        assert_eq!(points(2), dec!(20));
        assert_eq!(points(3), dec!(15));
        assert_eq!(points(5), dec!(15));
        assert_eq!(points(6), dec!(10));

        let year = |n| count_points(n, &config.current_year_bands, config.current_year_floor);
        assert_eq!(year(0), dec!(20));
        assert_eq!(year(4), dec!(15));
        assert_eq!(year(5), dec!(10));
    }

    #[test]
    fn test_volume_band_edges() {
        let config = DecisionConfig::standard().scoring;
        let limit = Money::from_major(1_000_000);
        let points = |total: i64| {
            volume_points(Money::from_major(total), limit, &config.volume_bands, config.volume_floor)
        };

        assert_eq!(points(500_000), dec!(20));
        assert_eq!(points(500_001), dec!(15));
        assert_eq!(points(800_000), dec!(15));
        assert_eq!(points(800_001), dec!(10));
    }

    #[test]
    fn test_factor_total() {
        let config = DecisionConfig::standard().scoring;
        let factors = FactorScores::evaluate(&summary(4, 1, 600_000), Money::from_major(1_000_000), &config);

        assert_eq!(factors.on_time, dec!(40));
        assert_eq!(factors.loan_count, dec!(15));
        assert_eq!(factors.current_year, dec!(20));
        assert_eq!(factors.approved_volume, dec!(15));
        assert_eq!(factors.total(), dec!(90));
    }
}

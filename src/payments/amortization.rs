use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::errors::{CreditError, Result};

/// equal monthly installment for an amortizing loan, rounded to currency precision
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), with r the monthly rate.
/// A zero rate degrades to straight-line repayment of P / n.
pub fn compute_installment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    if !principal.is_positive() {
        return Err(CreditError::invalid_input("principal", "must be greater than zero"));
    }
    if annual_rate.is_negative() {
        return Err(CreditError::invalid_input("annual_rate", "cannot be negative"));
    }
    if tenure_months == 0 {
        return Err(CreditError::invalid_input("tenure_months", "must be greater than zero"));
    }

    let r = annual_rate.monthly_rate().as_decimal();
    let p = principal.as_decimal();

    if r.is_zero() {
        return Ok(Money::from_decimal_currency(p / Decimal::from(tenure_months)));
    }

    let compound = compound_factor(r, tenure_months)?;
    let numerator = p
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| overflow(principal, annual_rate, tenure_months))?;
    let denominator = compound - Decimal::ONE;

    let emi = numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(principal, annual_rate, tenure_months))?;

    Ok(Money::from_decimal_currency(emi))
}

/// total paid over the tenure at the rounded installment
pub fn total_repayment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    let emi = compute_installment(principal, annual_rate, tenure_months)?;
    Ok(emi * Decimal::from(tenure_months))
}

/// total interest paid over the tenure
pub fn total_interest(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    let total = total_repayment(principal, annual_rate, tenure_months)?;
    Ok((total - principal).max(Money::ZERO))
}

/// (1 + r)^n by exponentiation by squaring
fn compound_factor(monthly_rate: Decimal, months: u32) -> Result<Decimal> {
    (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| CreditError::CalculationError {
            message: format!("compound factor overflow at {} months", months),
        })
}

fn overflow(principal: Money, annual_rate: Rate, tenure_months: u32) -> CreditError {
    CreditError::CalculationError {
        message: format!(
            "installment overflow for principal {} at {} over {} months",
            principal, annual_rate, tenure_months
        ),
    }
}

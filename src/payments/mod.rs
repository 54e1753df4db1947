pub mod amortization;

use crate::decimal::{Money, Rate};
use crate::errors::Result;

pub use amortization::{compute_installment, total_interest, total_repayment};

/// priced terms of a loan at a given rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstallmentQuote {
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub monthly_installment: Money,
}

impl InstallmentQuote {
    pub fn price(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Self> {
        let monthly_installment = compute_installment(principal, annual_rate, tenure_months)?;
        Ok(Self {
            principal,
            annual_rate,
            tenure_months,
            monthly_installment,
        })
    }

    pub fn total_repayment(&self) -> Money {
        self.monthly_installment * rust_decimal::Decimal::from(self.tenure_months)
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::OriginationConfig;
use crate::decimal::{Money, Rate};
use crate::eligibility::{EligibilityDecision, EligibilityRequest, RejectionReason};
use crate::errors::{CreditError, Result};
use crate::scoring::CreditScore;
use crate::types::{Customer, CustomerId, LoanId, LoanRecord};

/// message returned with every persisted loan
pub const APPROVED_MESSAGE: &str = "Loan approved successfully";

/// requested terms for a quote or an origination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub rate: Rate,
    pub tenure_months: u32,
}

impl LoanRequest {
    pub fn new(customer_id: CustomerId, amount: Money, rate: Rate, tenure_months: u32) -> Self {
        Self {
            customer_id,
            amount,
            rate,
            tenure_months,
        }
    }

    pub fn validate(&self, config: &OriginationConfig) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CreditError::invalid_input("amount", "must be greater than zero"));
        }
        if self.rate.is_negative() {
            return Err(CreditError::invalid_input("rate", "cannot be negative"));
        }
        if self.tenure_months == 0 || self.tenure_months > config.max_tenure_months {
            return Err(CreditError::invalid_input(
                "tenure_months",
                format!("must be within 1..={}", config.max_tenure_months),
            ));
        }
        Ok(())
    }

    pub(crate) fn eligibility_request(
        &self,
        score: CreditScore,
        open_installments: Money,
        monthly_income: Money,
    ) -> EligibilityRequest {
        EligibilityRequest {
            score,
            requested_rate: self.rate,
            requested_amount: self.amount,
            requested_tenure: self.tenure_months,
            open_installments,
            monthly_income,
        }
    }
}

/// read-only eligibility answer; a rejection is still a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityQuote {
    pub customer_id: CustomerId,
    pub approved: bool,
    pub requested_rate: Rate,
    pub corrected_rate: Rate,
    pub tenure_months: u32,
    /// priced at the corrected rate
    pub monthly_installment: Money,
    pub score: CreditScore,
    pub reason: Option<RejectionReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginationStatus {
    /// approved and persisted
    Created,
    /// evaluated and declined, nothing written
    ProcessedNotApproved,
}

/// outcome of one origination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginationResult {
    pub request_id: Uuid,
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub approved: bool,
    pub message: String,
    /// persisted installment, or the quoted one for a declined request
    pub monthly_installment: Option<Money>,
    pub score: CreditScore,
    pub decision: EligibilityDecision,
}

impl OriginationResult {
    pub fn status(&self) -> OriginationStatus {
        match (self.approved, self.loan_id) {
            (true, Some(_)) => OriginationStatus::Created,
            _ => OriginationStatus::ProcessedNotApproved,
        }
    }
}

/// customer fields shown alongside a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub age: u8,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone_number: customer.phone_number.clone(),
            age: customer.age,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetail {
    pub loan: LoanRecord,
    pub customer: CustomerSummary,
    pub repayments_left: u32,
}

/// one row of a customer's loan list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub monthly_installment: Money,
    pub repayments_left: u32,
}

impl From<&LoanRecord> for LoanSummary {
    fn from(loan: &LoanRecord) -> Self {
        Self {
            loan_id: loan.loan_id,
            principal: loan.principal,
            annual_rate: loan.annual_rate,
            monthly_installment: loan.monthly_installment,
            repayments_left: loan.repayments_left(),
        }
    }
}

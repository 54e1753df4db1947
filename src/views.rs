//! serializable response shapes for a transport layer

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::origination::{EligibilityQuote, LoanDetail, LoanSummary, OriginationResult};
use crate::types::{Customer, CustomerId, LoanId};

/// rates are shown as percentages, e.g. 10.5
fn percent(rate: Rate) -> Decimal {
    rate.as_percentage()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationView {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: u8,
    pub monthly_income: Money,
    pub approved_limit: Money,
    pub phone_number: String,
}

impl RegistrationView {
    pub fn from_customer(customer: &Customer) -> Self {
        RegistrationView {
            customer_id: customer.customer_id,
            name: customer.full_name(),
            age: customer.age,
            monthly_income: customer.monthly_income,
            approved_limit: customer.approved_limit,
            phone_number: customer.phone_number.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityView {
    pub customer_id: CustomerId,
    pub approval: bool,
    pub interest_rate: Decimal,
    pub corrected_interest_rate: Decimal,
    pub tenure: u32,
    pub monthly_installment: Money,
}

impl EligibilityView {
    pub fn from_quote(quote: &EligibilityQuote) -> Self {
        EligibilityView {
            customer_id: quote.customer_id,
            approval: quote.approved,
            interest_rate: percent(quote.requested_rate),
            corrected_interest_rate: percent(quote.corrected_rate),
            tenure: quote.tenure_months,
            monthly_installment: quote.monthly_installment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLoanView {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    pub message: String,
    pub monthly_installment: Option<Money>,
}

impl CreateLoanView {
    pub fn from_result(result: &OriginationResult) -> Self {
        CreateLoanView {
            loan_id: result.loan_id,
            customer_id: result.customer_id,
            loan_approved: result.approved,
            message: result.message.clone(),
            monthly_installment: result.monthly_installment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub age: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanDetailView {
    pub loan_id: LoanId,
    pub customer: CustomerView,
    pub loan_amount: Money,
    pub interest_rate: Decimal,
    pub monthly_installment: Money,
    pub tenure: u32,
    pub repayments_left: u32,
}

impl LoanDetailView {
    pub fn from_detail(detail: &LoanDetail) -> Self {
        LoanDetailView {
            loan_id: detail.loan.loan_id,
            customer: CustomerView {
                id: detail.customer.customer_id,
                first_name: detail.customer.first_name.clone(),
                last_name: detail.customer.last_name.clone(),
                phone_number: detail.customer.phone_number.clone(),
                age: detail.customer.age,
            },
            loan_amount: detail.loan.principal,
            interest_rate: percent(detail.loan.annual_rate),
            monthly_installment: detail.loan.monthly_installment,
            tenure: detail.loan.tenure_months,
            repayments_left: detail.repayments_left,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanSummaryView {
    pub loan_id: LoanId,
    pub loan_amount: Money,
    pub interest_rate: Decimal,
    pub monthly_installment: Money,
    pub repayments_left: u32,
}

impl LoanSummaryView {
    pub fn from_summary(summary: &LoanSummary) -> Self {
        LoanSummaryView {
            loan_id: summary.loan_id,
            loan_amount: summary.principal,
            interest_rate: percent(summary.annual_rate),
            monthly_installment: summary.monthly_installment,
            repayments_left: summary.repayments_left,
        }
    }
}

/// render any view as json
pub fn to_json<T: Serialize>(view: &T) -> Result<String> {
    Ok(serde_json::to_string(view)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::RejectionReason;
    use crate::scoring::CreditScore;
    use rust_decimal_macros::dec;

    #[test]
    fn test_eligibility_view_shows_percentages() {
        let quote = EligibilityQuote {
            customer_id: 4,
            approved: false,
            requested_rate: Rate::from_percent(dec!(10.5)),
            corrected_rate: Rate::from_percentage(12),
            tenure_months: 12,
            monthly_installment: Money::from_decimal(dec!(44424.39)),
            score: CreditScore::new(50),
            reason: Some(RejectionReason::RateBelowTierMinimum),
        };

        let json: serde_json::Value = serde_json::from_str(&to_json(&EligibilityView::from_quote(&quote)).unwrap()).unwrap();
        assert_eq!(json["approval"], false);
        assert_eq!(json["interest_rate"], "10.5");
        assert_eq!(json["corrected_interest_rate"], "12");
        assert_eq!(json["monthly_installment"], "44424.39");
    }
}

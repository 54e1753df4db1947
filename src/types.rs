use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// storage-assigned customer identifier
pub type CustomerId = u64;

/// storage-assigned loan identifier
pub type LoanId = u64;

/// customer record, owned by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub phone_number: String,
    pub monthly_income: Money,
    /// ceiling on aggregate open principal
    pub approved_limit: Money,
    /// stored for reporting, not read by scoring or eligibility
    pub current_debt: Money,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// historical or active loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub principal: Money,
    pub tenure_months: u32,
    pub annual_rate: Rate,
    pub monthly_installment: Money,
    pub installments_paid_on_time: u32,
    pub start_date: NaiveDate,
    /// none while the loan is still open
    pub end_date: Option<NaiveDate>,
}

impl LoanRecord {
    pub fn from_new(loan_id: LoanId, loan: NewLoan) -> Self {
        Self {
            loan_id,
            customer_id: loan.customer_id,
            principal: loan.principal,
            tenure_months: loan.tenure_months,
            annual_rate: loan.annual_rate,
            monthly_installment: loan.monthly_installment,
            installments_paid_on_time: loan.installments_paid_on_time,
            start_date: loan.start_date,
            end_date: loan.end_date,
        }
    }

    /// no recorded end date
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// installments still to be paid
    pub fn repayments_left(&self) -> u32 {
        self.tenure_months.saturating_sub(self.installments_paid_on_time)
    }

    /// still an obligation on `as_of`: open, or installments remain and the end date has not passed
    pub fn is_repaying(&self, as_of: NaiveDate) -> bool {
        match self.end_date {
            None => true,
            Some(end) => self.repayments_left() > 0 && end >= as_of,
        }
    }
}

/// insert payload for a loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub principal: Money,
    pub tenure_months: u32,
    pub annual_rate: Rate,
    pub monthly_installment: Money,
    pub installments_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// registration payload for a new customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub monthly_income: Money,
    pub phone_number: String,
}

/// insert payload for a customer, approved limit already computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub phone_number: String,
    pub monthly_income: Money,
    pub approved_limit: Money,
    pub created_at: DateTime<Utc>,
}

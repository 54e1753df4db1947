pub mod memory;

use chrono::NaiveDate;

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{Customer, CustomerId, LoanId, LoanRecord, NewCustomer, NewLoan};

pub use memory::InMemoryRepository;

/// consistent view of one customer taken at the start of a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSnapshot {
    pub customer: Customer,
    pub loans: Vec<LoanRecord>,
    /// installments of loans still being repaid on the snapshot date
    pub open_installments: Money,
    /// bumped on every write to this customer or their loans
    pub version: u64,
}

/// decides what, if anything, to write for a snapshot
pub type OriginationPlan<'a> = dyn FnMut(&CustomerSnapshot) -> Result<Option<NewLoan>> + 'a;

/// storage contract consumed by the origination workflow
pub trait LoanRepository: Send + Sync {
    fn get_customer(&self, customer_id: CustomerId) -> Result<Customer>;

    /// every loan on record for the customer, oldest first
    fn list_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanRecord>>;

    /// sum of installments the customer is still repaying on `as_of`
    fn sum_open_installments(&self, customer_id: CustomerId, as_of: NaiveDate) -> Result<Money>;

    fn get_loan(&self, loan_id: LoanId) -> Result<LoanRecord>;

    fn insert_customer(&self, customer: NewCustomer) -> Result<Customer>;

    /// read a snapshot, run `plan` on it, and write the planned loan atomically
    ///
    /// fails with `ConcurrencyConflict` when the customer's records changed
    /// between the snapshot and the write. Nothing is written when `plan`
    /// returns `Ok(None)` or an error.
    fn originate(
        &self,
        customer_id: CustomerId,
        as_of: NaiveDate,
        plan: &mut OriginationPlan<'_>,
    ) -> Result<Option<LoanRecord>>;
}

use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::{CustomerSnapshot, LoanRepository, OriginationPlan};
use crate::decimal::Money;
use crate::errors::{CreditError, Result};
use crate::types::{Customer, CustomerId, LoanId, LoanRecord, NewCustomer};

/// in-process repository with optimistic versioning per customer
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    customers: BTreeMap<CustomerId, Customer>,
    loans: BTreeMap<LoanId, LoanRecord>,
    versions: HashMap<CustomerId, u64>,
}

impl State {
    fn customer(&self, customer_id: CustomerId) -> Result<&Customer> {
        self.customers
            .get(&customer_id)
            .ok_or(CreditError::CustomerNotFound { customer_id })
    }

    fn loans_of(&self, customer_id: CustomerId) -> impl Iterator<Item = &LoanRecord> {
        self.loans.values().filter(move |loan| loan.customer_id == customer_id)
    }

    fn version(&self, customer_id: CustomerId) -> u64 {
        self.versions.get(&customer_id).copied().unwrap_or(0)
    }

    fn bump(&mut self, customer_id: CustomerId) {
        *self.versions.entry(customer_id).or_insert(0) += 1;
    }

    fn next_customer_id(&self) -> CustomerId {
        self.customers.keys().next_back().map_or(1, |id| id + 1)
    }

    fn next_loan_id(&self) -> LoanId {
        self.loans.keys().next_back().map_or(1, |id| id + 1)
    }

    fn phone_taken(&self, phone_number: &str, except: Option<CustomerId>) -> bool {
        self.customers
            .values()
            .any(|c| c.phone_number == phone_number && Some(c.customer_id) != except)
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// insert or replace a customer by id
    pub fn upsert_customer(&self, customer: Customer) -> Result<()> {
        if !customer.monthly_income.is_positive() {
            return Err(CreditError::invalid_input("monthly_income", "must be greater than zero"));
        }
        if customer.approved_limit.is_negative() {
            return Err(CreditError::invalid_input("approved_limit", "cannot be negative"));
        }
        let mut state = self.state.write();
        if state.phone_taken(&customer.phone_number, Some(customer.customer_id)) {
            return Err(CreditError::DuplicatePhoneNumber {
                phone_number: customer.phone_number,
            });
        }
        let customer_id = customer.customer_id;
        state.customers.insert(customer_id, customer);
        state.bump(customer_id);
        Ok(())
    }

    /// insert or replace a loan by id; the owning customer must exist
    pub fn upsert_loan(&self, loan: LoanRecord) -> Result<()> {
        let mut state = self.state.write();
        state.customer(loan.customer_id)?;
        let customer_id = loan.customer_id;
        if let Some(previous) = state.loans.insert(loan.loan_id, loan) {
            if previous.customer_id != customer_id {
                state.bump(previous.customer_id);
            }
        }
        state.bump(customer_id);
        Ok(())
    }

    pub fn snapshot(&self, customer_id: CustomerId, as_of: NaiveDate) -> Result<CustomerSnapshot> {
        let state = self.state.read();
        let customer = state.customer(customer_id)?.clone();
        let loans: Vec<LoanRecord> = state.loans_of(customer_id).cloned().collect();
        let open_installments = open_installments(&loans, as_of);

        Ok(CustomerSnapshot {
            customer,
            loans,
            open_installments,
            version: state.version(customer_id),
        })
    }

    pub fn customer_count(&self) -> usize {
        self.state.read().customers.len()
    }
}

fn open_installments<'a>(loans: impl IntoIterator<Item = &'a LoanRecord>, as_of: NaiveDate) -> Money {
    loans
        .into_iter()
        .filter(|loan| loan.is_repaying(as_of))
        .map(|loan| loan.monthly_installment)
        .sum()
}

impl LoanRepository for InMemoryRepository {
    fn get_customer(&self, customer_id: CustomerId) -> Result<Customer> {
        self.state.read().customer(customer_id).cloned()
    }

    fn list_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanRecord>> {
        let state = self.state.read();
        state.customer(customer_id)?;
        Ok(state.loans_of(customer_id).cloned().collect())
    }

    fn sum_open_installments(&self, customer_id: CustomerId, as_of: NaiveDate) -> Result<Money> {
        let state = self.state.read();
        state.customer(customer_id)?;
        Ok(open_installments(state.loans_of(customer_id), as_of))
    }

    fn get_loan(&self, loan_id: LoanId) -> Result<LoanRecord> {
        self.state
            .read()
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or(CreditError::LoanNotFound { loan_id })
    }

    fn insert_customer(&self, new: NewCustomer) -> Result<Customer> {
        let mut state = self.state.write();
        if state.phone_taken(&new.phone_number, None) {
            return Err(CreditError::DuplicatePhoneNumber {
                phone_number: new.phone_number,
            });
        }

        let customer = Customer {
            customer_id: state.next_customer_id(),
            first_name: new.first_name,
            last_name: new.last_name,
            age: new.age,
            phone_number: new.phone_number,
            monthly_income: new.monthly_income,
            approved_limit: new.approved_limit,
            current_debt: Money::ZERO,
            created_at: new.created_at,
        };
        state.customers.insert(customer.customer_id, customer.clone());
        state.bump(customer.customer_id);
        Ok(customer)
    }

    fn originate(
        &self,
        customer_id: CustomerId,
        as_of: NaiveDate,
        plan: &mut OriginationPlan<'_>,
    ) -> Result<Option<LoanRecord>> {
        let snapshot = self.snapshot(customer_id, as_of)?;

        // the plan runs without holding the lock
        let Some(new_loan) = plan(&snapshot)? else {
            return Ok(None);
        };
        if new_loan.customer_id != customer_id {
            return Err(CreditError::invalid_input(
                "customer_id",
                format!("planned loan belongs to {} not {}", new_loan.customer_id, customer_id),
            ));
        }

        let mut state = self.state.write();
        let current = state.version(customer_id);
        if current != snapshot.version {
            tracing::debug!(
                customer_id,
                read_version = snapshot.version,
                current_version = current,
                "customer changed during origination"
            );
            return Err(CreditError::ConcurrencyConflict {
                customer_id,
                attempts: 1,
            });
        }

        let record = LoanRecord::from_new(state.next_loan_id(), new_loan);
        state.loans.insert(record.loan_id, record.clone());
        state.bump(customer_id);
        Ok(Some(record))
    }
}

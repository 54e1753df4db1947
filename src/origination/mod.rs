pub mod registration;
pub mod request;

use chrono::{Duration, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DecisionConfig;
use crate::decimal::Money;
use crate::eligibility::{EligibilityDecision, EligibilityPolicy};
use crate::errors::{CreditError, Result};
use crate::events::{Event, EventStore};
use crate::payments::InstallmentQuote;
use crate::repository::LoanRepository;
use crate::scoring::{CreditScore, CreditScorer};
use crate::types::{Customer, CustomerId, CustomerRegistration, LoanId, NewLoan};

pub use registration::{approved_limit_for, prepare_customer};
pub use request::{
    CustomerSummary, EligibilityQuote, LoanDetail, LoanRequest, LoanSummary, OriginationResult,
    OriginationStatus, APPROVED_MESSAGE,
};

/// decision engine bound to a repository
pub struct LoanOriginator<R> {
    repository: Arc<R>,
    config: DecisionConfig,
    scorer: CreditScorer,
    policy: EligibilityPolicy,
    events: Mutex<EventStore>,
}

/// what the plan decided on the last snapshot it saw
struct Evaluation {
    score: CreditScore,
    decision: EligibilityDecision,
    monthly_installment: Option<Money>,
}

impl<R: LoanRepository> LoanOriginator<R> {
    pub fn new(repository: Arc<R>, config: DecisionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(repository, config))
    }

    pub fn with_standard_policy(repository: Arc<R>) -> Self {
        Self::build(repository, DecisionConfig::standard())
    }

    fn build(repository: Arc<R>, config: DecisionConfig) -> Self {
        Self {
            repository,
            scorer: CreditScorer::new(config.scoring.clone()),
            policy: EligibilityPolicy::new(config.eligibility.clone()),
            config,
            events: Mutex::new(EventStore::new()),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// current credit score, read only
    pub fn score(&self, customer_id: CustomerId, time_provider: &SafeTimeProvider) -> Result<CreditScore> {
        let customer = self.repository.get_customer(customer_id)?;
        let history = self.repository.list_loans(customer_id)?;
        let score = self.scorer.score(&customer, &history, today(time_provider));

        self.emit(Event::CreditScored {
            customer_id,
            score,
            loans_considered: history.len(),
            timestamp: time_provider.now(),
        });
        Ok(score)
    }

    /// quote a request without writing anything
    pub fn check_eligibility(
        &self,
        request: &LoanRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<EligibilityQuote> {
        request.validate(&self.config.origination)?;
        let as_of = today(time_provider);

        let customer = self.repository.get_customer(request.customer_id)?;
        let history = self.repository.list_loans(request.customer_id)?;
        let open_installments = self.repository.sum_open_installments(request.customer_id, as_of)?;

        let score = self.scorer.score(&customer, &history, as_of);
        let decision = self.policy.decide(&request.eligibility_request(
            score,
            open_installments,
            customer.monthly_income,
        ));
        let quote = InstallmentQuote::price(request.amount, decision.corrected_rate, request.tenure_months)?;

        self.emit(Event::EligibilityEvaluated {
            customer_id: request.customer_id,
            score,
            approved: decision.approved,
            requested_rate: decision.requested_rate,
            corrected_rate: decision.corrected_rate,
            reason: decision.reason,
            timestamp: time_provider.now(),
        });

        Ok(EligibilityQuote {
            customer_id: request.customer_id,
            approved: decision.approved,
            requested_rate: decision.requested_rate,
            corrected_rate: decision.corrected_rate,
            tenure_months: request.tenure_months,
            monthly_installment: quote.monthly_installment,
            score,
            reason: decision.reason,
        })
    }

    /// same as [`LoanOriginator::originate`]
    pub fn create_loan(
        &self,
        request: &LoanRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<OriginationResult> {
        self.originate(request, time_provider)
    }

    /// score, decide and persist an approved loan in one repository transaction
    ///
    /// the whole read-decide-write sequence is re-run when the customer's
    /// records change underneath it, up to `max_conflict_retries` times.
    pub fn originate(
        &self,
        request: &LoanRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<OriginationResult> {
        request.validate(&self.config.origination)?;
        let request_id = Uuid::new_v4();
        let retries = self.config.origination.max_conflict_retries;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt_origination(request, request_id, time_provider) {
                Err(CreditError::ConcurrencyConflict { customer_id, .. }) => {
                    self.emit(Event::OriginationConflict {
                        request_id,
                        customer_id,
                        attempt,
                        timestamp: time_provider.now(),
                    });
                    if attempt > retries {
                        tracing::warn!(%request_id, customer_id, attempt, "origination conflicts exhausted retries");
                        return Err(CreditError::ConcurrencyConflict {
                            customer_id,
                            attempts: attempt,
                        });
                    }
                    tracing::debug!(%request_id, customer_id, attempt, "origination conflict, retrying");
                }
                other => return other,
            }
        }
    }

    fn attempt_origination(
        &self,
        request: &LoanRequest,
        request_id: Uuid,
        time_provider: &SafeTimeProvider,
    ) -> Result<OriginationResult> {
        let as_of = today(time_provider);
        let end_date = self.end_date(as_of, request.tenure_months)?;
        let mut evaluation: Option<Evaluation> = None;

        let written = self.repository.originate(request.customer_id, as_of, &mut |snapshot| {
            let score = self.scorer.score(&snapshot.customer, &snapshot.loans, as_of);
            let decision = self.policy.decide(&request.eligibility_request(
                score,
                snapshot.open_installments,
                snapshot.customer.monthly_income,
            ));
            let priced = InstallmentQuote::price(request.amount, decision.corrected_rate, request.tenure_months);

            let new_loan = if decision.approved {
                let quote = priced?;
                evaluation = Some(Evaluation {
                    score,
                    decision: decision.clone(),
                    monthly_installment: Some(quote.monthly_installment),
                });
                Some(NewLoan {
                    customer_id: request.customer_id,
                    principal: request.amount,
                    tenure_months: request.tenure_months,
                    annual_rate: decision.corrected_rate,
                    monthly_installment: quote.monthly_installment,
                    installments_paid_on_time: 0,
                    start_date: as_of,
                    end_date: Some(end_date),
                })
            } else {
                evaluation = Some(Evaluation {
                    score,
                    decision,
                    monthly_installment: priced.ok().map(|quote| quote.monthly_installment),
                });
                None
            };
            Ok(new_loan)
        })?;

        let Evaluation {
            score,
            decision,
            monthly_installment,
        } = evaluation.ok_or_else(|| CreditError::CalculationError {
            message: "repository returned without evaluating the origination".to_string(),
        })?;

        let result = match written {
            Some(record) => {
                tracing::info!(
                    %request_id,
                    customer_id = record.customer_id,
                    loan_id = record.loan_id,
                    principal = %record.principal,
                    rate = %record.annual_rate,
                    installment = %record.monthly_installment,
                    "loan originated"
                );
                self.emit(Event::LoanOriginated {
                    request_id,
                    loan_id: record.loan_id,
                    customer_id: record.customer_id,
                    principal: record.principal,
                    annual_rate: record.annual_rate,
                    monthly_installment: record.monthly_installment,
                    tenure_months: record.tenure_months,
                    timestamp: time_provider.now(),
                });
                OriginationResult {
                    request_id,
                    loan_id: Some(record.loan_id),
                    customer_id: record.customer_id,
                    approved: true,
                    message: APPROVED_MESSAGE.to_string(),
                    monthly_installment: Some(record.monthly_installment),
                    score,
                    decision,
                }
            }
            None => {
                let message = decision.reason.map(|reason| reason.to_string()).unwrap_or_default();
                tracing::info!(%request_id, customer_id = request.customer_id, %score, reason = %message, "origination declined");
                if let Some(reason) = decision.reason {
                    self.emit(Event::OriginationDeclined {
                        request_id,
                        customer_id: request.customer_id,
                        reason,
                        quoted_installment: monthly_installment,
                        timestamp: time_provider.now(),
                    });
                }
                OriginationResult {
                    request_id,
                    loan_id: None,
                    customer_id: request.customer_id,
                    approved: false,
                    message,
                    monthly_installment,
                    score,
                    decision,
                }
            }
        };

        Ok(result)
    }

    /// fixed days-per-month approximation, not calendar months
    fn end_date(&self, start: NaiveDate, tenure_months: u32) -> Result<NaiveDate> {
        let days = i64::from(tenure_months) * i64::from(self.config.origination.days_per_month);
        start
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| CreditError::CalculationError {
                message: format!("end date overflow for {} months from {}", tenure_months, start),
            })
    }

    pub fn register_customer(
        &self,
        registration: CustomerRegistration,
        time_provider: &SafeTimeProvider,
    ) -> Result<Customer> {
        let new = prepare_customer(registration, &self.config.origination, time_provider.now())?;
        let customer = self.repository.insert_customer(new)?;

        tracing::info!(
            customer_id = customer.customer_id,
            approved_limit = %customer.approved_limit,
            "customer registered"
        );
        self.emit(Event::CustomerRegistered {
            customer_id: customer.customer_id,
            monthly_income: customer.monthly_income,
            approved_limit: customer.approved_limit,
            timestamp: customer.created_at,
        });
        Ok(customer)
    }

    pub fn view_loan(&self, loan_id: LoanId) -> Result<LoanDetail> {
        let loan = self.repository.get_loan(loan_id)?;
        let customer = self.repository.get_customer(loan.customer_id)?;
        Ok(LoanDetail {
            customer: CustomerSummary::from(&customer),
            repayments_left: loan.repayments_left(),
            loan,
        })
    }

    pub fn view_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanSummary>> {
        let loans = self.repository.list_loans(customer_id)?;
        Ok(loans.iter().map(LoanSummary::from).collect())
    }

    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().take_events()
    }

    fn emit(&self, event: Event) {
        self.events.lock().emit(event);
    }
}

fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

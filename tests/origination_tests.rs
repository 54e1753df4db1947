use chrono::{Duration, NaiveDate, TimeZone, Utc};
use credit_decision_rs::views::{self, CreateLoanView, LoanDetailView, LoanSummaryView};
use credit_decision_rs::{
    CreditError, CustomerId, CustomerRegistration, InMemoryRepository, LoanOriginator, LoanRecord,
    LoanRepository, LoanRequest, Money, OriginationResult, OriginationStatus, Rate, RejectionReason,
    SafeTimeProvider, TimeSource,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::sync::{Arc, Barrier};

// ---------------------------------------------------------------------------
// fixtures
// ---------------------------------------------------------------------------

fn time() -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine() -> (LoanOriginator<InMemoryRepository>, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    (LoanOriginator::with_standard_policy(repo.clone()), repo)
}

fn register(originator: &LoanOriginator<InMemoryRepository>, phone: &str, income: i64) -> CustomerId {
    originator
        .register_customer(
            CustomerRegistration {
                first_name: "Priya".to_string(),
                last_name: "Nair".to_string(),
                age: 29,
                monthly_income: Money::from_major(income),
                phone_number: phone.to_string(),
            },
            &time(),
        )
        .unwrap()
        .customer_id
}

#[allow(clippy::too_many_arguments)]
fn seed_loan(
    repo: &InMemoryRepository,
    loan_id: u64,
    customer_id: CustomerId,
    principal: i64,
    installment: i64,
    paid: u32,
    start: NaiveDate,
    end: Option<NaiveDate>,
) {
    repo.upsert_loan(LoanRecord {
        loan_id,
        customer_id,
        principal: Money::from_major(principal),
        tenure_months: 12,
        annual_rate: Rate::from_percentage(12),
        monthly_installment: Money::from_major(installment),
        installments_paid_on_time: paid,
        start_date: start,
        end_date: end,
    })
    .unwrap();
}

/// six finished loans that missed every installment; `principal` sets the volume band
fn seed_poor_history(repo: &InMemoryRepository, customer_id: CustomerId, principal: i64) {
    for i in 0..6 {
        seed_loan(repo, 100 + i, customer_id, principal, 1_000, 0, date(2024, 1, 5), Some(date(2024, 5, 1)));
    }
}

fn request(customer_id: CustomerId, amount: i64, rate: Rate, tenure: u32) -> LoanRequest {
    LoanRequest::new(customer_id, Money::from_major(amount), rate, tenure)
}

// ---------------------------------------------------------------------------
// new customers
// ---------------------------------------------------------------------------

#[test]
fn test_registration_sets_approved_limit() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000001", 50_000);

    let customer = repo.get_customer(id).unwrap();
    assert_eq!(customer.approved_limit, Money::from_major(1_800_000));
    assert_eq!(customer.current_debt, Money::ZERO);
    assert_eq!(originator.score(id, &time()).unwrap().value(), 50);
}

#[test]
fn test_new_customer_at_ten_and_a_half_percent_is_corrected() {
    let (originator, _) = engine();
    let id = register(&originator, "9100000002", 50_000);

    // no history scores 50, which sits in the 12% tier
    let quote = originator
        .check_eligibility(&request(id, 500_000, Rate::from_percent(dec!(10.5)), 12), &time())
        .unwrap();

    assert_eq!(quote.score.value(), 50);
    assert_eq!(quote.approved, false);
    assert_eq!(quote.requested_rate, Rate::from_percent(dec!(10.5)));
    assert_eq!(quote.corrected_rate, Rate::from_percentage(12));
    assert_eq!(quote.monthly_installment, Money::from_decimal(dec!(44424.39)));
    assert_eq!(quote.reason, Some(RejectionReason::RateBelowTierMinimum));
}

#[test]
fn test_new_customer_at_fifteen_percent_is_created() {
    let (originator, _) = engine();
    let id = register(&originator, "9100000003", 50_000);

    let result = originator
        .create_loan(&request(id, 500_000, Rate::from_percentage(15), 12), &time())
        .unwrap();

    assert_eq!(result.status(), OriginationStatus::Created);
    assert_eq!(result.monthly_installment, Some(Money::from_decimal(dec!(45129.16))));

    let view = CreateLoanView::from_result(&result);
    assert_eq!(view.loan_approved, true);
    assert_eq!(view.message, "Loan approved successfully");
}

// ---------------------------------------------------------------------------
// history driven decisions
// ---------------------------------------------------------------------------

#[test]
fn test_good_history_approves_requested_rate() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000004", 50_000);
    seed_loan(&repo, 100, id, 200_000, 17_770, 12, date(2023, 1, 1), Some(date(2023, 12, 27)));

    let score = originator.score(id, &time()).unwrap();
    assert!(score.value() > 50);
    assert_eq!(score.value(), 100);

    let result = originator
        .originate(&request(id, 500_000, Rate::from_percent(dec!(10.5)), 12), &time())
        .unwrap();
    assert_eq!(result.approved, true);
    assert_eq!(result.decision.corrected_rate, Rate::from_percent(dec!(10.5)));
    assert_eq!(result.monthly_installment, Some(Money::from_decimal(dec!(44074.30))));

    let loan = repo.get_loan(result.loan_id.unwrap()).unwrap();
    assert_eq!(loan.annual_rate, Rate::from_percent(dec!(10.5)));
    assert_eq!(loan.monthly_installment, Money::from_decimal(dec!(44074.30)));
}

#[test]
fn test_middle_tier_corrects_to_twelve_percent() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000005", 50_000);
    seed_poor_history(&repo, id, 50_000);
    assert_eq!(originator.score(id, &time()).unwrap().value(), 40);

    let declined = originator
        .originate(&request(id, 100_000, Rate::from_percentage(11), 12), &time())
        .unwrap();
    assert_eq!(declined.status(), OriginationStatus::ProcessedNotApproved);
    assert_eq!(declined.decision.corrected_rate, Rate::from_percentage(12));
    assert_eq!(declined.message, "rate below minimum for tier");
    // quoted at the corrected rate but not persisted
    assert_eq!(declined.monthly_installment, Some(Money::from_decimal(dec!(8884.88))));
    assert_eq!(repo.list_loans(id).unwrap().len(), 6);

    let accepted = originator
        .originate(&request(id, 100_000, Rate::from_percentage(12), 12), &time())
        .unwrap();
    assert_eq!(accepted.status(), OriginationStatus::Created);
    assert_eq!(repo.list_loans(id).unwrap().len(), 7);
}

#[test]
fn test_low_tier_corrects_to_sixteen_percent() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000006", 50_000);
    seed_poor_history(&repo, id, 300_000);
    assert_eq!(originator.score(id, &time()).unwrap().value(), 30);

    let quote = originator
        .check_eligibility(&request(id, 100_000, Rate::from_percentage(15), 12), &time())
        .unwrap();
    assert_eq!(quote.approved, false);
    assert_eq!(quote.corrected_rate, Rate::from_percentage(16));

    let quote = originator
        .check_eligibility(&request(id, 100_000, Rate::from_percentage(16), 12), &time())
        .unwrap();
    assert_eq!(quote.approved, true);
}

#[test]
fn test_over_extended_customer_scores_zero() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000007", 50_000);
    // open loan above the 1.8M limit
    seed_loan(&repo, 100, id, 2_000_000, 1_000, 0, date(2024, 2, 1), None);

    assert_eq!(originator.score(id, &time()).unwrap().value(), 0);
    let result = originator
        .originate(&request(id, 10_000, Rate::from_percentage(30), 6), &time())
        .unwrap();
    assert_eq!(result.message, "credit score too low");
    assert_eq!(result.loan_id, None);
}

// ---------------------------------------------------------------------------
// affordability
// ---------------------------------------------------------------------------

#[test]
fn test_affordability_override_rejects_and_writes_nothing() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000008", 50_000);
    seed_loan(&repo, 100, id, 300_000, 30_000, 0, date(2024, 1, 1), Some(date(2025, 1, 1)));

    let result = originator
        .originate(&request(id, 100_000, Rate::from_percentage(20), 12), &time())
        .unwrap();

    assert_eq!(result.approved, false);
    assert_eq!(result.decision.reason, Some(RejectionReason::ObligationsExceedIncomeShare));
    assert_eq!(result.message, "existing obligations exceed 50% of income");
    assert_eq!(repo.list_loans(id).unwrap().len(), 1);
}

#[test]
fn test_fully_paid_open_loan_triggers_override() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000012", 50_000);
    // no end date, every instalment paid
    seed_loan(&repo, 100, id, 300_000, 30_000, 12, date(2023, 1, 1), None);

    let quote = originator
        .check_eligibility(&request(id, 100_000, Rate::from_percentage(20), 12), &time())
        .unwrap();

    assert_eq!(quote.approved, false);
    assert_eq!(quote.reason, Some(RejectionReason::ObligationsExceedIncomeShare));
}

#[test]
fn test_finished_obligation_stops_counting() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000009", 50_000);
    seed_loan(&repo, 100, id, 300_000, 30_000, 0, date(2024, 1, 1), Some(date(2025, 1, 1)));

    let time = time();
    let control = time.test_control().unwrap();
    let loan = request(id, 100_000, Rate::from_percentage(20), 12);
    assert_eq!(originator.check_eligibility(&loan, &time).unwrap().approved, false);

    control.advance(Duration::days(240));
    assert_eq!(originator.check_eligibility(&loan, &time).unwrap().approved, true);
}

// ---------------------------------------------------------------------------
// concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_originations_approve_exactly_one() {
    const THREADS: usize = 8;

    let (originator, repo) = engine();
    let id = register(&originator, "9100000010", 100_000);
    // 45k of a 50k ceiling already committed; one more ~9k installment breaches it
    seed_loan(&repo, 100, id, 400_000, 45_000, 0, date(2024, 3, 1), Some(date(2025, 2, 24)));

    let barrier = Barrier::new(THREADS);
    let results: Vec<OriginationResult> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let time = time();
                    barrier.wait();
                    originator.originate(&request(id, 100_000, Rate::from_percentage(14), 12), &time)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    let approved = results.iter().filter(|r| r.approved).count();
    assert_eq!(approved, 1);
    assert_eq!(repo.list_loans(id).unwrap().len(), 2);
    assert!(results
        .iter()
        .filter(|r| !r.approved)
        .all(|r| r.decision.reason == Some(RejectionReason::ObligationsExceedIncomeShare)));
}

// ---------------------------------------------------------------------------
// views
// ---------------------------------------------------------------------------

#[test]
fn test_view_loan_and_list() {
    let (originator, repo) = engine();
    let id = register(&originator, "9100000011", 50_000);
    seed_loan(&repo, 100, id, 200_000, 17_770, 5, date(2024, 1, 1), Some(date(2024, 12, 26)));

    let detail = originator.view_loan(100).unwrap();
    assert_eq!(detail.repayments_left, 7);
    let view = LoanDetailView::from_detail(&detail);
    assert_eq!(view.customer.id, id);
    assert_eq!(view.interest_rate, dec!(12));

    let list = originator.view_loans(id).unwrap();
    assert_eq!(list.len(), 1);
    let json = views::to_json(&LoanSummaryView::from_summary(&list[0])).unwrap();
    assert!(json.contains("\"repayments_left\":7"));

    assert!(matches!(originator.view_loans(999), Err(CreditError::CustomerNotFound { customer_id: 999 })));
}

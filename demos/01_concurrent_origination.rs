/// concurrent origination - several requests race for the same obligation headroom
use chrono::{NaiveDate, TimeZone, Utc};
use credit_decision_rs::{
    CustomerRegistration, InMemoryRepository, LoanOriginator, LoanRecord, LoanRequest, Money, Rate,
    SafeTimeProvider, TimeSource,
};
use std::sync::{Arc, Barrier};
use tracing_subscriber::EnvFilter;

const REQUESTS: usize = 6;

fn start_of_day() -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_ids(true)
        .init();

    let repo = Arc::new(InMemoryRepository::new());
    let originator = LoanOriginator::with_standard_policy(repo.clone());

    let customer = originator.register_customer(
        CustomerRegistration {
            first_name: "Sara".to_string(),
            last_name: "Khan".to_string(),
            age: 44,
            monthly_income: Money::from_major(100_000),
            phone_number: "9988776655".to_string(),
        },
        &start_of_day(),
    )?;

    // existing loan already committing 45k of a 50k ceiling
    repo.upsert_loan(LoanRecord {
        loan_id: 1,
        customer_id: customer.customer_id,
        principal: Money::from_major(400_000),
        tenure_months: 12,
        annual_rate: Rate::from_percentage(12),
        monthly_installment: Money::from_major(45_000),
        installments_paid_on_time: 0,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("bad date")?,
        end_date: NaiveDate::from_ymd_opt(2025, 2, 24),
    })?;

    let barrier = Barrier::new(REQUESTS);
    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..REQUESTS)
            .map(|_| {
                scope.spawn(|| {
                    let time = start_of_day();
                    let request = LoanRequest::new(
                        customer.customer_id,
                        Money::from_major(100_000),
                        Rate::from_percentage(14),
                        12,
                    );
                    barrier.wait();
                    originator.originate(&request, &time)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    });

    for outcome in outcomes {
        match outcome {
            Ok(Ok(result)) => println!(
                "{} approved={} loan={:?} message={}",
                result.request_id, result.approved, result.loan_id, result.message
            ),
            Ok(Err(e)) => println!("error: {}", e),
            Err(_) => println!("worker panicked"),
        }
    }

    println!("loans on record: {}", originator.view_loans(customer.customer_id)?.len());
    Ok(())
}

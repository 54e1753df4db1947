/// quick start - register a customer, quote a loan and originate it
use chrono::{TimeZone, Utc};
use credit_decision_rs::views::{self, CreateLoanView, EligibilityView, RegistrationView};
use credit_decision_rs::{
    CustomerRegistration, InMemoryRepository, LoanOriginator, LoanRequest, Money, Rate,
    SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    ));
    let originator = LoanOriginator::with_standard_policy(Arc::new(InMemoryRepository::new()));

    let customer = originator.register_customer(
        CustomerRegistration {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            age: 30,
            monthly_income: Money::from_major(50_000),
            phone_number: "1234567890".to_string(),
        },
        &time,
    )?;
    println!("{}", views::to_json(&RegistrationView::from_customer(&customer))?);

    // a new customer scores 50, so 10.5% is below the tier minimum
    let low = LoanRequest::new(customer.customer_id, Money::from_major(500_000), Rate::from_percent(dec!(10.5)), 12);
    let quote = originator.check_eligibility(&low, &time)?;
    println!("{}", views::to_json(&EligibilityView::from_quote(&quote))?);

    // retry at the corrected rate
    let corrected = LoanRequest { rate: quote.corrected_rate, ..low };
    let result = originator.create_loan(&corrected, &time)?;
    println!("{}", views::to_json(&CreateLoanView::from_result(&result))?);
    println!("status: {:?}", result.status());

    for event in originator.take_events() {
        println!("event: {:?}", event);
    }

    Ok(())
}

use chrono::{DateTime, Utc};
use rust_decimal::RoundingStrategy;

use crate::config::OriginationConfig;
use crate::decimal::Money;
use crate::errors::{CreditError, Result};
use crate::types::{CustomerRegistration, NewCustomer};

/// credit ceiling for a new customer
///
/// `multiplier * income`, rounded to the nearest rounding unit with ties to even.
pub fn approved_limit_for(monthly_income: Money, config: &OriginationConfig) -> Money {
    let unit = config.approved_limit_rounding.as_decimal();
    let units = (monthly_income.as_decimal() * config.approved_limit_multiplier / unit)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    Money::from_decimal(units * unit)
}

/// check a registration and build the insert payload
pub fn prepare_customer(
    registration: CustomerRegistration,
    config: &OriginationConfig,
    created_at: DateTime<Utc>,
) -> Result<NewCustomer> {
    let first_name = registration.first_name.trim().to_string();
    let last_name = registration.last_name.trim().to_string();
    let phone_number = registration.phone_number.trim().to_string();

    if first_name.is_empty() {
        return Err(CreditError::invalid_input("first_name", "cannot be empty"));
    }
    if last_name.is_empty() {
        return Err(CreditError::invalid_input("last_name", "cannot be empty"));
    }
    if registration.age < config.min_customer_age || registration.age > config.max_customer_age {
        return Err(CreditError::invalid_input(
            "age",
            format!(
                "must be within {}..={}",
                config.min_customer_age, config.max_customer_age
            ),
        ));
    }
    if registration.monthly_income.is_negative() {
        return Err(CreditError::invalid_input("monthly_income", "cannot be negative"));
    }
    if phone_number.is_empty() || phone_number.chars().count() > config.max_phone_length {
        return Err(CreditError::invalid_input(
            "phone_number",
            format!("must be 1 to {} characters", config.max_phone_length),
        ));
    }

    Ok(NewCustomer {
        first_name,
        last_name,
        age: registration.age,
        phone_number,
        monthly_income: registration.monthly_income,
        approved_limit: approved_limit_for(registration.monthly_income, config),
        created_at,
    })
}

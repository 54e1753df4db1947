use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::eligibility::RejectionReason;
use crate::scoring::CreditScore;
use crate::types::{CustomerId, LoanId};

/// all events that can be emitted by the decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // decision events
    CreditScored {
        customer_id: CustomerId,
        score: CreditScore,
        loans_considered: usize,
        timestamp: DateTime<Utc>,
    },
    EligibilityEvaluated {
        customer_id: CustomerId,
        score: CreditScore,
        approved: bool,
        requested_rate: Rate,
        corrected_rate: Rate,
        reason: Option<RejectionReason>,
        timestamp: DateTime<Utc>,
    },

    // origination events
    LoanOriginated {
        request_id: Uuid,
        loan_id: LoanId,
        customer_id: CustomerId,
        principal: Money,
        annual_rate: Rate,
        monthly_installment: Money,
        tenure_months: u32,
        timestamp: DateTime<Utc>,
    },
    OriginationDeclined {
        request_id: Uuid,
        customer_id: CustomerId,
        reason: RejectionReason,
        quoted_installment: Option<Money>,
        timestamp: DateTime<Utc>,
    },
    OriginationConflict {
        request_id: Uuid,
        customer_id: CustomerId,
        attempt: u32,
        timestamp: DateTime<Utc>,
    },

    // customer events
    CustomerRegistered {
        customer_id: CustomerId,
        monthly_income: Money,
        approved_limit: Money,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn customer_id(&self) -> CustomerId {
        match self {
            Event::CreditScored { customer_id, .. }
            | Event::EligibilityEvaluated { customer_id, .. }
            | Event::LoanOriginated { customer_id, .. }
            | Event::OriginationDeclined { customer_id, .. }
            | Event::OriginationConflict { customer_id, .. }
            | Event::CustomerRegistered { customer_id, .. } => *customer_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_take_events_drains_store() {
        let mut store = EventStore::new();
        store.emit(Event::CustomerRegistered {
            customer_id: 3,
            monthly_income: Money::from_major(40_000),
            approved_limit: Money::from_major(1_400_000),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        });
        assert_eq!(store.len(), 1);

        let events = store.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].customer_id(), 3);
        assert!(store.is_empty());
    }
}

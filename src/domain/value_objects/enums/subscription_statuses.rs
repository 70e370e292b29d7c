use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Pending,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Pending => "Pending",
            SubscriptionStatus::Cancelled => "Cancelled",
            SubscriptionStatus::Expired => "Expired",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(SubscriptionStatus::Active),
            "Pending" => Some(SubscriptionStatus::Pending),
            "Cancelled" => Some(SubscriptionStatus::Cancelled),
            "Expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    /// Time-based view of a stored status. Cancellation is sticky; every other
    /// status is derived from where `now` falls relative to the service period.
    pub fn classify(
        self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if self == SubscriptionStatus::Cancelled {
            return self;
        }

        if now < start_date {
            SubscriptionStatus::Pending
        } else if end_date < now {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

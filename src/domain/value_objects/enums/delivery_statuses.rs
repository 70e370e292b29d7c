use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Status given to freshly generated deliveries.
    #[default]
    Active,
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl DeliveryStatus {
    /// Statuses a delivery can still leave. Everything else is terminal.
    pub const OPEN: [DeliveryStatus; 2] = [DeliveryStatus::Active, DeliveryStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Active => "Active",
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Completed => "Completed",
            DeliveryStatus::Failed => "Failed",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(DeliveryStatus::Active),
            "Pending" => Some(DeliveryStatus::Pending),
            "Completed" => Some(DeliveryStatus::Completed),
            "Failed" => Some(DeliveryStatus::Failed),
            "Cancelled" => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !Self::OPEN.contains(self)
    }

    pub fn open_values() -> Vec<String> {
        Self::OPEN.iter().map(ToString::to_string).collect()
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_and_pending_are_open() {
        assert!(!DeliveryStatus::Active.is_terminal());
        assert!(!DeliveryStatus::Pending.is_terminal());
        assert!(DeliveryStatus::Completed.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::Cancelled.is_terminal());
        assert_eq!(DeliveryStatus::open_values(), vec!["Active", "Pending"]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(DeliveryStatus::from_str("Cancelled"), Some(DeliveryStatus::Cancelled));
        assert_eq!(DeliveryStatus::from_str("cancelled"), None);
    }
}

pub mod delivery_statuses;
pub mod frequencies;
pub mod subscription_statuses;

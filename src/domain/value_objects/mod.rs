pub mod delivery_schedule;
pub mod enums;
pub mod identifiers;
pub mod mail;
pub mod subscriptions;

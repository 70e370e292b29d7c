pub mod dish_deliveries;
pub mod subscriptions;

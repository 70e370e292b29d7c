pub mod dish_deliveries;
pub mod subscription_dishes;
pub mod subscriptions;

use uuid::Uuid;

pub const SUBSCRIPTION_PREFIX: &str = "Sub";
pub const SUBSCRIPTION_DISH_PREFIX: &str = "SDish";
pub const DISH_DELIVERY_PREFIX: &str = "DD";

fn prefixed(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

pub fn new_subscription_id() -> String {
    prefixed(SUBSCRIPTION_PREFIX)
}

pub fn new_subscription_dish_id() -> String {
    prefixed(SUBSCRIPTION_DISH_PREFIX)
}

pub fn new_dish_delivery_id() -> String {
    prefixed(DISH_DELIVERY_PREFIX)
}

use anyhow::Result;
use mockall::automock;

use crate::domain::entities::{
    dish_deliveries::DishDeliveryEntity, subscription_dishes::SubscriptionDishEntity,
    subscriptions::SubscriptionEntity,
};
use crate::domain::value_objects::enums::{
    delivery_statuses::DeliveryStatus, subscription_statuses::SubscriptionStatus,
};

/// Row-level access to the subscription tables. Implementations are bound to
/// a single open transaction handed out by a [`UnitOfWork`].
///
/// [`UnitOfWork`]: crate::domain::repositories::unit_of_work::UnitOfWork
#[automock]
pub trait SubscriptionStore {
    fn insert_subscription(
        &mut self,
        subscription_entity: &SubscriptionEntity,
    ) -> Result<SubscriptionEntity>;

    fn insert_subscription_dish(
        &mut self,
        subscription_dish_entity: &SubscriptionDishEntity,
    ) -> Result<SubscriptionDishEntity>;

    fn insert_dish_delivery(
        &mut self,
        dish_delivery_entity: &DishDeliveryEntity,
    ) -> Result<DishDeliveryEntity>;

    fn find_subscription(&mut self, subscription_id: &str) -> Result<Option<SubscriptionEntity>>;

    fn list_subscriptions_by_user(&mut self, user_id: &str) -> Result<Vec<SubscriptionEntity>>;

    fn list_subscription_dishes(
        &mut self,
        subscription_id: &str,
    ) -> Result<Vec<SubscriptionDishEntity>>;

    fn find_subscription_dish(
        &mut self,
        subscription_dish_id: &str,
    ) -> Result<Option<SubscriptionDishEntity>>;

    fn list_dish_deliveries(&mut self, subscription_dish_id: &str)
    -> Result<Vec<DishDeliveryEntity>>;

    /// Returns the updated row, or `None` when no subscription has this id.
    fn update_subscription_status(
        &mut self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Moves every open delivery of the dish (no delivery time, non-terminal
    /// status) to `status` and returns exactly the rows it changed.
    fn update_open_delivery_status(
        &mut self,
        subscription_dish_id: &str,
        status: DeliveryStatus,
    ) -> Result<Vec<DishDeliveryEntity>>;
}

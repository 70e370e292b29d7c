use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::{
            dish_deliveries::DishDeliveryEntity, subscription_dishes::SubscriptionDishEntity,
            subscriptions::SubscriptionEntity,
        },
        repositories::{subscription_store::SubscriptionStore, unit_of_work::UnitOfWork},
        value_objects::enums::{
            delivery_statuses::DeliveryStatus, subscription_statuses::SubscriptionStatus,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{dish_deliveries, subscription_dishes, subscriptions},
    },
};

pub struct PgUnitOfWork {
    db_pool: Arc<PgPoolSquad>,
}

impl PgUnitOfWork {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn execute<R, F>(&self, work: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn SubscriptionStore) -> Result<R> + Send + 'static,
    {
        // Diesel is synchronous; the whole transaction runs on the blocking pool.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<R> {
            let mut pooled = db_pool.get()?;
            let conn: &mut PgConnection = &mut pooled;

            conn.transaction::<R, anyhow::Error, _>(|tx| {
                let mut store = PgSubscriptionStore::new(tx);
                work(&mut store)
            })
        })
        .await??)
    }
}

/// Store bound to one open transaction.
pub struct PgSubscriptionStore<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgSubscriptionStore<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl SubscriptionStore for PgSubscriptionStore<'_> {
    fn insert_subscription(
        &mut self,
        subscription_entity: &SubscriptionEntity,
    ) -> Result<SubscriptionEntity> {
        let result = insert_into(subscriptions::table)
            .values(subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn insert_subscription_dish(
        &mut self,
        subscription_dish_entity: &SubscriptionDishEntity,
    ) -> Result<SubscriptionDishEntity> {
        let result = insert_into(subscription_dishes::table)
            .values(subscription_dish_entity)
            .returning(SubscriptionDishEntity::as_returning())
            .get_result::<SubscriptionDishEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn insert_dish_delivery(
        &mut self,
        dish_delivery_entity: &DishDeliveryEntity,
    ) -> Result<DishDeliveryEntity> {
        let result = insert_into(dish_deliveries::table)
            .values(dish_delivery_entity)
            .returning(DishDeliveryEntity::as_returning())
            .get_result::<DishDeliveryEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn find_subscription(&mut self, subscription_id: &str) -> Result<Option<SubscriptionEntity>> {
        let result = subscriptions::table
            .find(subscription_id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut *self.conn)
            .optional()?;

        Ok(result)
    }

    fn list_subscriptions_by_user(&mut self, user_id: &str) -> Result<Vec<SubscriptionEntity>> {
        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .select(SubscriptionEntity::as_select())
            .order(subscriptions::start_date.desc())
            .load::<SubscriptionEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn list_subscription_dishes(
        &mut self,
        subscription_id: &str,
    ) -> Result<Vec<SubscriptionDishEntity>> {
        let result = subscription_dishes::table
            .filter(subscription_dishes::subscription_id.eq(subscription_id))
            .select(SubscriptionDishEntity::as_select())
            .order(subscription_dishes::schedule_time.asc())
            .load::<SubscriptionDishEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn find_subscription_dish(
        &mut self,
        subscription_dish_id: &str,
    ) -> Result<Option<SubscriptionDishEntity>> {
        let result = subscription_dishes::table
            .find(subscription_dish_id)
            .select(SubscriptionDishEntity::as_select())
            .first::<SubscriptionDishEntity>(&mut *self.conn)
            .optional()?;

        Ok(result)
    }

    fn list_dish_deliveries(
        &mut self,
        subscription_dish_id: &str,
    ) -> Result<Vec<DishDeliveryEntity>> {
        let result = dish_deliveries::table
            .filter(dish_deliveries::subscription_dish_id.eq(subscription_dish_id))
            .select(DishDeliveryEntity::as_select())
            .order(dish_deliveries::expected_time.asc())
            .load::<DishDeliveryEntity>(&mut *self.conn)?;

        Ok(result)
    }

    fn update_subscription_status(
        &mut self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionEntity>> {
        let result = update(subscriptions::table.find(subscription_id))
            .set(subscriptions::status.eq(status.to_string()))
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut *self.conn)
            .optional()?;

        Ok(result)
    }

    fn update_open_delivery_status(
        &mut self,
        subscription_dish_id: &str,
        status: DeliveryStatus,
    ) -> Result<Vec<DishDeliveryEntity>> {
        // Resolved or terminal rows never match, so a repeated cancel touches nothing.
        let result = update(
            dish_deliveries::table
                .filter(dish_deliveries::subscription_dish_id.eq(subscription_dish_id))
                .filter(dish_deliveries::delivery_time.is_null())
                .filter(dish_deliveries::status.eq_any(DeliveryStatus::open_values())),
        )
        .set(dish_deliveries::status.eq(status.to_string()))
        .returning(DishDeliveryEntity::as_returning())
        .get_results::<DishDeliveryEntity>(&mut *self.conn)?;

        Ok(result)
    }
}

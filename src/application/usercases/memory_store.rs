//! Transactional in-memory store shared by the use-case and handler tests.

use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use crate::domain::{
    entities::{
        dish_deliveries::DishDeliveryEntity, subscription_dishes::SubscriptionDishEntity,
        subscriptions::SubscriptionEntity,
    },
    repositories::{subscription_store::SubscriptionStore, unit_of_work::UnitOfWork},
    value_objects::enums::{
        delivery_statuses::DeliveryStatus, frequencies::Frequency,
        subscription_statuses::SubscriptionStatus,
    },
};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub subscriptions: Vec<SubscriptionEntity>,
    pub dishes: Vec<SubscriptionDishEntity>,
    pub deliveries: Vec<DishDeliveryEntity>,
}

#[derive(Debug, Clone, Default)]
pub enum FailPoint {
    #[default]
    Never,
    DeliveryInsertAfter(usize),
    DeliveryStatusUpdate(String),
}

struct MemoryStore {
    tables: Tables,
    fail_point: FailPoint,
    delivery_inserts: usize,
}

impl SubscriptionStore for MemoryStore {
    fn insert_subscription(&mut self, entity: &SubscriptionEntity) -> Result<SubscriptionEntity> {
        if self.tables.subscriptions.iter().any(|s| s.id == entity.id) {
            bail!("duplicate subscription id {}", entity.id);
        }
        self.tables.subscriptions.push(entity.clone());
        Ok(entity.clone())
    }

    fn insert_subscription_dish(
        &mut self,
        entity: &SubscriptionDishEntity,
    ) -> Result<SubscriptionDishEntity> {
        self.tables.dishes.push(entity.clone());
        Ok(entity.clone())
    }

    fn insert_dish_delivery(&mut self, entity: &DishDeliveryEntity) -> Result<DishDeliveryEntity> {
        if let FailPoint::DeliveryInsertAfter(limit) = self.fail_point {
            if self.delivery_inserts >= limit {
                bail!("connection reset by peer");
            }
        }
        self.delivery_inserts += 1;
        self.tables.deliveries.push(entity.clone());
        Ok(entity.clone())
    }

    fn find_subscription(&mut self, subscription_id: &str) -> Result<Option<SubscriptionEntity>> {
        Ok(self
            .tables
            .subscriptions
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned())
    }

    fn find_subscription_dish(
        &mut self,
        subscription_dish_id: &str,
    ) -> Result<Option<SubscriptionDishEntity>> {
        Ok(self
            .tables
            .dishes
            .iter()
            .find(|d| d.id == subscription_dish_id)
            .cloned())
    }

    fn list_subscriptions_by_user(&mut self, user_id: &str) -> Result<Vec<SubscriptionEntity>> {
        Ok(self
            .tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_subscription_dishes(
        &mut self,
        subscription_id: &str,
    ) -> Result<Vec<SubscriptionDishEntity>> {
        Ok(self
            .tables
            .dishes
            .iter()
            .filter(|d| d.subscription_id == subscription_id)
            .cloned()
            .collect())
    }

    fn list_dish_deliveries(
        &mut self,
        subscription_dish_id: &str,
    ) -> Result<Vec<DishDeliveryEntity>> {
        let mut deliveries: Vec<_> = self
            .tables
            .deliveries
            .iter()
            .filter(|d| d.subscription_dish_id == subscription_dish_id)
            .cloned()
            .collect();
        deliveries.sort_by_key(|d| d.expected_time);
        Ok(deliveries)
    }

    fn update_subscription_status(
        &mut self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionEntity>> {
        Ok(self
            .tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
            .map(|s| {
                s.status = status.to_string();
                s.clone()
            }))
    }

    fn update_open_delivery_status(
        &mut self,
        subscription_dish_id: &str,
        status: DeliveryStatus,
    ) -> Result<Vec<DishDeliveryEntity>> {
        if matches!(&self.fail_point, FailPoint::DeliveryStatusUpdate(id) if id == subscription_dish_id)
        {
            bail!("lock wait timeout");
        }

        let mut touched = Vec::new();
        for delivery in self.tables.deliveries.iter_mut().filter(|d| {
            d.subscription_dish_id == subscription_dish_id
                && d.delivery_time.is_none()
                && DeliveryStatus::from_str(&d.status).is_some_and(|s| !s.is_terminal())
        }) {
            delivery.status = status.to_string();
            touched.push(delivery.clone());
        }
        Ok(touched)
    }
}

/// Applies a unit of work to a copy of the tables and keeps the copy only on success.
#[derive(Default)]
pub struct MemoryUnitOfWork {
    tables: Mutex<Tables>,
    fail_point: Mutex<FailPoint>,
}

impl MemoryUnitOfWork {
    pub fn seeded(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            fail_point: Mutex::new(FailPoint::Never),
        }
    }

    pub fn fail_at(&self, fail_point: FailPoint) {
        *self.fail_point.lock().unwrap() = fail_point;
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn execute<R, F>(&self, work: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn SubscriptionStore) -> Result<R> + Send + 'static,
    {
        let mut store = MemoryStore {
            tables: self.snapshot(),
            fail_point: self.fail_point.lock().unwrap().clone(),
            delivery_inserts: 0,
        };
        let result = work(&mut store)?;
        *self.tables.lock().unwrap() = store.tables;
        Ok(result)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Two dishes with five daily deliveries each; `resolved` of them already delivered.
pub fn seeded_subscription(resolved: &[(usize, usize)]) -> Tables {
    let subscription = SubscriptionEntity {
        id: "Sub1".to_string(),
        user_id: "user-1".to_string(),
        playlist_id: Some("playlist-7".to_string()),
        customized: false,
        status: SubscriptionStatus::Active.to_string(),
        frequency: Frequency::Daily.to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 5),
        receiver_name: "Ada".to_string(),
        receiver_contact: "ada@example.com".to_string(),
    };

    let mut tables = Tables {
        subscriptions: vec![subscription],
        ..Tables::default()
    };

    for dish_index in 0..2 {
        let dish_id = format!("SDish{dish_index}");
        tables.dishes.push(SubscriptionDishEntity {
            id: dish_id.clone(),
            dish_id: format!("dish-{dish_index}"),
            subscription_id: "Sub1".to_string(),
            schedule_time: date(2024, 1, 1),
            frequency: Frequency::Daily.to_string(),
            dish_options: json!([]),
            note: None,
        });

        for day in 0..5 {
            let expected_time = date(2024, 1, 1) + Duration::days(day as i64);
            let is_resolved = resolved.contains(&(dish_index, day));
            tables.deliveries.push(DishDeliveryEntity {
                id: format!("DD{dish_index}-{day}"),
                subscription_dish_id: dish_id.clone(),
                status: if is_resolved {
                    DeliveryStatus::Completed.to_string()
                } else {
                    DeliveryStatus::Active.to_string()
                },
                expected_time,
                delivery_time: is_resolved.then(|| expected_time + Duration::hours(2)),
                note: None,
            });
        }
    }

    tables
}

//! Expansion of a subscription dish into its pre-materialised deliveries.
//!
//! Expected times are `t0, step(t0), step(step(t0)), ...` for as long as they
//! are not after the subscription end date. A monthly schedule that starts on
//! the 29th to 31st settles on the clamped day after its first short month.

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    dish_deliveries::DishDeliveryEntity, subscription_dishes::SubscriptionDishEntity,
};
use crate::domain::value_objects::{
    enums::{delivery_statuses::DeliveryStatus, frequencies::Frequency},
    identifiers::new_dish_delivery_id,
};

/// Status assigned to every generated delivery.
pub const INITIAL_DELIVERY_STATUS: DeliveryStatus = DeliveryStatus::Active;

/// Finite, strictly increasing sequence of expected delivery times.
#[derive(Debug, Clone)]
pub struct DeliverySchedule {
    upcoming: Option<DateTime<Utc>>,
    frequency: Frequency,
    until: DateTime<Utc>,
}

impl DeliverySchedule {
    pub fn new(anchor: DateTime<Utc>, frequency: Frequency, until: DateTime<Utc>) -> Self {
        Self {
            upcoming: Some(anchor),
            frequency,
            until,
        }
    }
}

impl Iterator for DeliverySchedule {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let expected_time = self.upcoming.filter(|t| *t <= self.until)?;
        self.upcoming = self.frequency.step(expected_time);
        Some(expected_time)
    }
}

/// Builds one delivery record per expected time of `dish`, up to and
/// including `until`. An anchor after `until` yields no deliveries.
pub fn expand_deliveries(
    dish: &SubscriptionDishEntity,
    until: DateTime<Utc>,
) -> Vec<DishDeliveryEntity> {
    let frequency = Frequency::from_str(&dish.frequency);

    DeliverySchedule::new(dish.schedule_time, frequency, until)
        .map(|expected_time| DishDeliveryEntity {
            id: new_dish_delivery_id(),
            subscription_dish_id: dish.id.clone(),
            status: INITIAL_DELIVERY_STATUS.to_string(),
            expected_time,
            delivery_time: None,
            note: dish.note.clone(),
        })
        .collect()
}

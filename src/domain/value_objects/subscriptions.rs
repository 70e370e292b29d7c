use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::{
    dish_deliveries::DishDeliveryEntity, subscription_dishes::SubscriptionDishEntity,
    subscriptions::SubscriptionEntity,
};
use crate::domain::value_objects::enums::{
    delivery_statuses::DeliveryStatus, frequencies::Frequency,
    subscription_statuses::SubscriptionStatus,
};

/// One `(option name, selected)` pair of a dish customisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DishOption {
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: String,
    pub user_id: String,
    pub playlist_id: Option<String>,
    pub customized: bool,
    pub status: SubscriptionStatus,
    pub frequency: Frequency,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub receiver_name: String,
    pub receiver_contact: String,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    /// An unrecognised stored status is logged and read as `Active`, which
    /// leaves the caller's date-based classification in charge.
    fn from(value: SubscriptionEntity) -> Self {
        let status = SubscriptionStatus::from_str(&value.status).unwrap_or_else(|| {
            warn!(
                subscription_id = %value.id,
                stored_status = %value.status,
                "subscriptions: unknown stored status, reading as Active"
            );
            SubscriptionStatus::Active
        });

        Self {
            status,
            frequency: Frequency::from_str(&value.frequency),
            id: value.id,
            user_id: value.user_id,
            playlist_id: value.playlist_id,
            customized: value.customized,
            start_date: value.start_date,
            end_date: value.end_date,
            receiver_name: value.receiver_name,
            receiver_contact: value.receiver_contact,
        }
    }
}

impl SubscriptionModel {
    pub fn classified_at(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.status.classify(self.start_date, self.end_date, now);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionDishModel {
    pub id: String,
    pub dish_id: String,
    pub subscription_id: String,
    pub schedule_time: DateTime<Utc>,
    pub frequency: Frequency,
    pub dish_options: Vec<DishOption>,
    pub note: Option<String>,
}

impl TryFrom<SubscriptionDishEntity> for SubscriptionDishModel {
    type Error = serde_json::Error;

    fn try_from(value: SubscriptionDishEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            dish_options: serde_json::from_value(value.dish_options)?,
            frequency: Frequency::from_str(&value.frequency),
            id: value.id,
            dish_id: value.dish_id,
            subscription_id: value.subscription_id,
            schedule_time: value.schedule_time,
            note: value.note,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DishDeliveryModel {
    pub id: String,
    pub subscription_dish_id: String,
    /// `None` only when the stored value is not a known status.
    pub status: Option<DeliveryStatus>,
    pub expected_time: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl From<DishDeliveryEntity> for DishDeliveryModel {
    fn from(value: DishDeliveryEntity) -> Self {
        Self {
            status: DeliveryStatus::from_str(&value.status),
            id: value.id,
            subscription_dish_id: value.subscription_dish_id,
            expected_time: value.expected_time,
            delivery_time: value.delivery_time,
            note: value.note,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionRequest {
    pub playlist_id: Option<String>,
    #[serde(default)]
    pub customized: bool,
    pub frequency: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub receiver_name: String,
    pub receiver_contact: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionDishRequest {
    pub dish_id: String,
    /// Defaults to the subscription start date.
    pub schedule_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dish_options: Vec<DishOption>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub subscription: SubscriptionRequest,
    #[serde(default)]
    pub dishes: Vec<SubscriptionDishRequest>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatedSubscriptionDto {
    pub subscription: SubscriptionModel,
    pub dishes: Vec<SubscriptionDishModel>,
    pub deliveries: Vec<DishDeliveryModel>,
}

/// Deliveries touched by a cancellation, keyed by subscription-dish id.
pub type CancelledDeliveries = HashMap<String, Vec<DishDeliveryModel>>;

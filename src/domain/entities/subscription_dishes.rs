use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::domain::entities::subscriptions::SubscriptionEntity;
use crate::infrastructure::postgres::schema::subscription_dishes;

#[derive(
    Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Insertable, Associations,
)]
#[diesel(belongs_to(SubscriptionEntity, foreign_key = subscription_id))]
#[diesel(table_name = subscription_dishes)]
pub struct SubscriptionDishEntity {
    pub id: String,
    pub dish_id: String,
    pub subscription_id: String,
    pub schedule_time: DateTime<Utc>,
    pub frequency: String,
    pub dish_options: Value,
    pub note: Option<String>,
}

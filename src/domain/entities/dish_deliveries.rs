use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::subscription_dishes::SubscriptionDishEntity;
use crate::infrastructure::postgres::schema::dish_deliveries;

#[derive(
    Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Insertable, Associations,
)]
#[diesel(belongs_to(SubscriptionDishEntity, foreign_key = subscription_dish_id))]
#[diesel(table_name = dish_deliveries)]
pub struct DishDeliveryEntity {
    pub id: String,
    pub subscription_dish_id: String,
    pub status: String,
    pub expected_time: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl DishDeliveryEntity {
    /// A delivery with a recorded delivery time is resolved and never changes again.
    pub fn is_resolved(&self) -> bool {
        self.delivery_time.is_some()
    }
}

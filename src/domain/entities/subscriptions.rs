use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: String,
    pub user_id: String,
    pub playlist_id: Option<String>,
    pub customized: bool,
    pub status: String,
    pub frequency: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub receiver_name: String,
    pub receiver_contact: String,
}

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{
    entities::{subscription_dishes::SubscriptionDishEntity, subscriptions::SubscriptionEntity},
    repositories::{
        mail_notifier::MailNotifier, subscription_store::SubscriptionStore,
        unit_of_work::UnitOfWork,
    },
    value_objects::{
        delivery_schedule::expand_deliveries,
        enums::{
            delivery_statuses::DeliveryStatus, frequencies::Frequency,
            subscription_statuses::SubscriptionStatus,
        },
        identifiers::{new_subscription_dish_id, new_subscription_id},
        mail::MailPayload,
        subscriptions::{
            CancelledDeliveries, CreateSubscriptionRequest, CreatedSubscriptionDto,
            DishDeliveryModel, SubscriptionDishModel, SubscriptionModel,
        },
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("invalid subscription request: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("storage failure while {step}: {cause}")]
    Persistence {
        step: &'static str,
        cause: anyhow::Error,
    },
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn persistence(step: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| SubscriptionError::Persistence { step, cause }
    }

    /// Recovers the typed error raised inside a unit of work; anything else
    /// (pool, commit, join failures) is reported against `step`.
    fn from_unit_of_work(step: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |err| match err.downcast::<SubscriptionError>() {
            Ok(typed) => typed,
            Err(cause) => SubscriptionError::Persistence { step, cause },
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<U, M>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    unit_of_work: Arc<U>,
    mail_notifier: Arc<M>,
}

impl<U, M> SubscriptionUseCase<U, M>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    pub fn new(unit_of_work: Arc<U>, mail_notifier: Arc<M>) -> Self {
        Self {
            unit_of_work,
            mail_notifier,
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: &str,
        request: CreateSubscriptionRequest,
    ) -> UseCaseResult<CreatedSubscriptionDto> {
        info!(
            user_id,
            customized = request.subscription.customized,
            dish_count = request.dishes.len(),
            "subscriptions: create requested"
        );

        let (subscription, dishes) = prepare_subscription(user_id, request).map_err(|err| {
            warn!(
                user_id,
                error = %err,
                status = err.status_code().as_u16(),
                "subscriptions: rejected create request"
            );
            err
        })?;
        let subscription_id = subscription.id.clone();

        let created = self
            .unit_of_work
            .execute(move |store| {
                persist_new_subscription(store, subscription, dishes).map_err(anyhow::Error::from)
            })
            .await
            .map_err(SubscriptionError::from_unit_of_work("committing new subscription"))
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to create subscription"
                );
                err
            })?;

        info!(
            %subscription_id,
            dish_count = created.dishes.len(),
            delivery_count = created.deliveries.len(),
            "subscriptions: subscription created"
        );

        self.send_confirmation(&created).await;

        Ok(created)
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> UseCaseResult<CancelledDeliveries> {
        info!(subscription_id, "subscriptions: cancel requested");

        let target = subscription_id.to_string();
        let cancelled = self
            .unit_of_work
            .execute(move |store| {
                cancel_open_deliveries(store, &target).map_err(anyhow::Error::from)
            })
            .await
            .map_err(SubscriptionError::from_unit_of_work("committing cancellation"))
            .map_err(|err| {
                match &err {
                    SubscriptionError::NotFound(_) => warn!(
                        subscription_id,
                        status = err.status_code().as_u16(),
                        "subscriptions: cancel target not found"
                    ),
                    _ => error!(
                        subscription_id,
                        db_error = ?err,
                        "subscriptions: failed to cancel subscription"
                    ),
                }
                err
            })?;

        let delivery_count: usize = cancelled.values().map(Vec::len).sum();
        info!(
            subscription_id,
            dish_count = cancelled.len(),
            delivery_count,
            "subscriptions: subscription cancelled"
        );

        Ok(cancelled)
    }

    pub async fn get_subscription(&self, subscription_id: &str) -> UseCaseResult<SubscriptionModel> {
        let target = subscription_id.to_string();
        let subscription = self
            .unit_of_work
            .execute(move |store| store.find_subscription(&target))
            .await
            .map_err(SubscriptionError::persistence("loading subscription"))?
            .ok_or_else(|| SubscriptionError::NotFound(format!("subscription {subscription_id}")))?;

        Ok(SubscriptionModel::from(subscription).classified_at(Utc::now()))
    }

    pub async fn list_user_subscriptions(
        &self,
        user_id: &str,
    ) -> UseCaseResult<Vec<SubscriptionModel>> {
        let target = user_id.to_string();
        let subscriptions = self
            .unit_of_work
            .execute(move |store| store.list_subscriptions_by_user(&target))
            .await
            .map_err(SubscriptionError::persistence("listing user subscriptions"))?;

        debug!(
            user_id,
            count = subscriptions.len(),
            "subscriptions: user subscriptions loaded"
        );

        let now = Utc::now();
        Ok(subscriptions
            .into_iter()
            .map(|entity| SubscriptionModel::from(entity).classified_at(now))
            .collect())
    }

    pub async fn list_subscription_dishes(
        &self,
        subscription_id: &str,
    ) -> UseCaseResult<Vec<SubscriptionDishModel>> {
        let target = subscription_id.to_string();
        let dishes = self
            .unit_of_work
            .execute(move |store| {
                if store.find_subscription(&target)?.is_none() {
                    return Ok(None);
                }
                store.list_subscription_dishes(&target).map(Some)
            })
            .await
            .map_err(SubscriptionError::persistence("listing subscription dishes"))?
            .ok_or_else(|| SubscriptionError::NotFound(format!("subscription {subscription_id}")))?;

        dishes
            .into_iter()
            .map(|entity| {
                SubscriptionDishModel::try_from(entity)
                    .map_err(|err| SubscriptionError::persistence("decoding dish options")(err.into()))
            })
            .collect()
    }

    /// Deliveries of one subscription dish, visible only to the user owning
    /// the parent subscription. Unknown and foreign dishes are both `NotFound`.
    pub async fn list_dish_deliveries(
        &self,
        user_id: &str,
        subscription_dish_id: &str,
    ) -> UseCaseResult<Vec<DishDeliveryModel>> {
        let caller = user_id.to_string();
        let target = subscription_dish_id.to_string();
        let deliveries = self
            .unit_of_work
            .execute(move |store| {
                let Some(dish) = store.find_subscription_dish(&target)? else {
                    return Ok(None);
                };
                match store.find_subscription(&dish.subscription_id)? {
                    Some(subscription) if subscription.user_id == caller => {}
                    _ => return Ok(None),
                }
                store.list_dish_deliveries(&target).map(Some)
            })
            .await
            .map_err(SubscriptionError::persistence("listing dish deliveries"))?
            .ok_or_else(|| {
                SubscriptionError::NotFound(format!("subscription dish {subscription_dish_id}"))
            })?;

        Ok(deliveries.into_iter().map(DishDeliveryModel::from).collect())
    }

    async fn send_confirmation(&self, created: &CreatedSubscriptionDto) {
        let subscription = &created.subscription;
        let mail = MailPayload {
            from: self.mail_notifier.sender(),
            to: subscription.receiver_contact.clone(),
            subject: "Your meal subscription is confirmed".to_string(),
            message: format!(
                "Hi {}, your {} subscription {} runs from {} to {} with {} scheduled deliveries.",
                subscription.receiver_name,
                subscription.frequency,
                subscription.id,
                subscription.start_date.format("%Y-%m-%d"),
                subscription.end_date.format("%Y-%m-%d"),
                created.deliveries.len(),
            ),
        };

        // The subscription is already committed; a lost mail is not worth failing the request.
        if let Err(err) = self.mail_notifier.send(mail).await {
            warn!(
                subscription_id = %subscription.id,
                error = ?err,
                "subscriptions: failed to send confirmation mail"
            );
        }
    }
}

/// Validates a create request and assigns identifiers. Nothing is persisted.
pub fn prepare_subscription(
    user_id: &str,
    request: CreateSubscriptionRequest,
) -> UseCaseResult<(SubscriptionEntity, Vec<SubscriptionDishEntity>)> {
    let CreateSubscriptionRequest {
        subscription,
        dishes,
    } = request;

    if subscription.start_date > subscription.end_date {
        return Err(SubscriptionError::Validation(
            "start date is after end date".to_string(),
        ));
    }

    let playlist_id = subscription
        .playlist_id
        .filter(|playlist_id| !playlist_id.trim().is_empty());

    if !subscription.customized && playlist_id.is_none() {
        return Err(SubscriptionError::Validation(
            "playlist id is required unless the subscription is customized".to_string(),
        ));
    }

    if dishes.is_empty() {
        let reason = if subscription.customized {
            "a customized subscription needs at least one dish"
        } else {
            "the playlist dish set is missing"
        };
        return Err(SubscriptionError::Validation(reason.to_string()));
    }

    let frequency = Frequency::from_str(&subscription.frequency);
    let subscription_entity = SubscriptionEntity {
        id: new_subscription_id(),
        user_id: user_id.to_string(),
        playlist_id,
        customized: subscription.customized,
        status: SubscriptionStatus::Active.to_string(),
        frequency: frequency.to_string(),
        start_date: subscription.start_date,
        end_date: subscription.end_date,
        receiver_name: subscription.receiver_name,
        receiver_contact: subscription.receiver_contact,
    };

    let dish_entities = dishes
        .into_iter()
        .map(|dish| {
            if dish.dish_id.trim().is_empty() {
                return Err(SubscriptionError::Validation(
                    "dish id must not be empty".to_string(),
                ));
            }

            let schedule_time = dish.schedule_time.unwrap_or(subscription_entity.start_date);
            if schedule_time < subscription_entity.start_date {
                return Err(SubscriptionError::Validation(format!(
                    "dish {} is scheduled before the subscription starts",
                    dish.dish_id
                )));
            }

            let dish_options = serde_json::to_value(&dish.dish_options).map_err(|err| {
                SubscriptionError::Validation(format!("invalid dish options: {err}"))
            })?;

            Ok(SubscriptionDishEntity {
                id: new_subscription_dish_id(),
                dish_id: dish.dish_id,
                subscription_id: subscription_entity.id.clone(),
                schedule_time,
                frequency: frequency.to_string(),
                dish_options,
                note: dish.note,
            })
        })
        .collect::<UseCaseResult<Vec<_>>>()?;

    Ok((subscription_entity, dish_entities))
}

/// Writes the subscription, then each dish followed by its expanded deliveries.
/// Stops at the first failure; the surrounding unit of work discards the rest.
pub fn persist_new_subscription(
    store: &mut dyn SubscriptionStore,
    subscription: SubscriptionEntity,
    dishes: Vec<SubscriptionDishEntity>,
) -> UseCaseResult<CreatedSubscriptionDto> {
    let stored_subscription = store
        .insert_subscription(&subscription)
        .map_err(SubscriptionError::persistence("inserting subscription"))?;

    let mut created_dishes = Vec::with_capacity(dishes.len());
    let mut created_deliveries = Vec::new();

    for dish in dishes {
        let stored_dish = store
            .insert_subscription_dish(&dish)
            .map_err(SubscriptionError::persistence("inserting subscription dish"))?;

        let deliveries = expand_deliveries(&stored_dish, stored_subscription.end_date);
        debug!(
            subscription_dish_id = %stored_dish.id,
            delivery_count = deliveries.len(),
            "subscriptions: expanded dish schedule"
        );

        for delivery in deliveries {
            let stored_delivery = store
                .insert_dish_delivery(&delivery)
                .map_err(SubscriptionError::persistence("inserting dish delivery"))?;
            created_deliveries.push(DishDeliveryModel::from(stored_delivery));
        }

        let dish_model = SubscriptionDishModel::try_from(stored_dish)
            .map_err(|err| SubscriptionError::persistence("decoding dish options")(err.into()))?;
        created_dishes.push(dish_model);
    }

    Ok(CreatedSubscriptionDto {
        subscription: SubscriptionModel::from(stored_subscription),
        dishes: created_dishes,
        deliveries: created_deliveries,
    })
}

/// Marks the subscription cancelled and cascades to every open delivery of
/// every dish it owns. Resolved deliveries are left as they are.
pub fn cancel_open_deliveries(
    store: &mut dyn SubscriptionStore,
    subscription_id: &str,
) -> UseCaseResult<CancelledDeliveries> {
    let subscription = store
        .update_subscription_status(subscription_id, SubscriptionStatus::Cancelled)
        .map_err(SubscriptionError::persistence("updating subscription status"))?
        .ok_or_else(|| SubscriptionError::NotFound(format!("subscription {subscription_id}")))?;

    let dishes = store
        .list_subscription_dishes(&subscription.id)
        .map_err(SubscriptionError::persistence("listing subscription dishes"))?;

    let mut cancelled = CancelledDeliveries::with_capacity(dishes.len());
    for dish in dishes {
        let mut touched = store
            .update_open_delivery_status(&dish.id, DeliveryStatus::Cancelled)
            .map_err(SubscriptionError::persistence("updating dish delivery status"))?;
        touched.sort_by_key(|delivery| delivery.expected_time);

        debug!(
            subscription_dish_id = %dish.id,
            touched = touched.len(),
            "subscriptions: cancelled open deliveries"
        );

        cancelled.insert(
            dish.id,
            touched.into_iter().map(DishDeliveryModel::from).collect(),
        );
    }

    Ok(cancelled)
}

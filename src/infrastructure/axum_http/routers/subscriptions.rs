use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::{
    application::usercases::subscriptions::SubscriptionUseCase,
    domain::{
        repositories::{mail_notifier::MailNotifier, unit_of_work::UnitOfWork},
        value_objects::subscriptions::{CreateSubscriptionRequest, SubscriptionModel},
    },
    infrastructure::{
        axum_http::{api_response::ApiResponse, auth::AuthUser, error_responses::AppError},
        mail::http_mail::HttpMailNotifier,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::subscriptions::PgUnitOfWork,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, mail_notifier: Arc<HttpMailNotifier>) -> Router {
    let unit_of_work = PgUnitOfWork::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(Arc::new(unit_of_work), mail_notifier);

    Router::new()
        .route(
            "/",
            post(create::<PgUnitOfWork, HttpMailNotifier>)
                .get(list_mine::<PgUnitOfWork, HttpMailNotifier>),
        )
        .route(
            "/:subscription_id",
            get(get_one::<PgUnitOfWork, HttpMailNotifier>),
        )
        .route(
            "/:subscription_id/cancel",
            put(cancel::<PgUnitOfWork, HttpMailNotifier>),
        )
        .route(
            "/:subscription_id/dishes",
            get(list_dishes::<PgUnitOfWork, HttpMailNotifier>),
        )
        .with_state(Arc::new(subscription_usecase))
}

/// Loads the subscription and hides it from anyone but its owner.
async fn owned_subscription<U, M>(
    subscription_usecase: &SubscriptionUseCase<U, M>,
    auth: &AuthUser,
    subscription_id: &str,
) -> Result<SubscriptionModel, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    let subscription = subscription_usecase.get_subscription(subscription_id).await?;
    if subscription.user_id != auth.user_id {
        return Err(AppError::NotFound(format!(
            "subscription {subscription_id} not found"
        )));
    }
    Ok(subscription)
}

pub async fn create<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
    Json(create_request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    let created = subscription_usecase
        .create_subscription(&auth.user_id, create_request)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("subscription created", created),
    ))
}

pub async fn list_mine<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    let subscriptions = subscription_usecase
        .list_user_subscriptions(&auth.user_id)
        .await?;

    Ok(ApiResponse::ok("subscriptions loaded", subscriptions))
}

pub async fn get_one<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    let subscription = owned_subscription(&subscription_usecase, &auth, &subscription_id).await?;

    Ok(ApiResponse::ok("subscription loaded", subscription))
}

pub async fn cancel<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    owned_subscription(&subscription_usecase, &auth, &subscription_id).await?;
    let cancelled = subscription_usecase
        .cancel_subscription(&subscription_id)
        .await?;

    Ok(ApiResponse::ok("subscription cancelled", cancelled))
}

pub async fn list_dishes<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    owned_subscription(&subscription_usecase, &auth, &subscription_id).await?;
    let dishes = subscription_usecase
        .list_subscription_dishes(&subscription_id)
        .await?;

    Ok(ApiResponse::ok("subscription dishes loaded", dishes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usercases::memory_store::{MemoryUnitOfWork, seeded_subscription},
        domain::repositories::mail_notifier::MockMailNotifier,
    };

    type TestUseCase = SubscriptionUseCase<MemoryUnitOfWork, MockMailNotifier>;

    fn usecase(unit_of_work: Arc<MemoryUnitOfWork>) -> Arc<TestUseCase> {
        Arc::new(SubscriptionUseCase::new(
            unit_of_work,
            Arc::new(MockMailNotifier::new()),
        ))
    }

    fn caller(user_id: &str) -> AuthUser {
        AuthUser {
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn foreign_subscription_reads_as_not_found() {
        let unit_of_work = Arc::new(MemoryUnitOfWork::seeded(seeded_subscription(&[])));
        let usecase = usecase(unit_of_work);

        let response = get_one(
            State(Arc::clone(&usecase)),
            caller("user-2"),
            Path("Sub1".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = list_dishes(
            State(Arc::clone(&usecase)),
            caller("user-2"),
            Path("Sub1".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get_one(State(usecase), caller("user-1"), Path("Sub1".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn foreign_cancel_is_not_found_and_changes_nothing() {
        let unit_of_work = Arc::new(MemoryUnitOfWork::seeded(seeded_subscription(&[])));
        let usecase = usecase(Arc::clone(&unit_of_work));

        let response = cancel(
            State(Arc::clone(&usecase)),
            caller("user-2"),
            Path("Sub1".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let tables = unit_of_work.snapshot();
        assert_eq!(tables.subscriptions[0].status, "Active");
        assert!(tables.deliveries.iter().all(|d| d.status == "Active"));

        let response = cancel(State(usecase), caller("user-1"), Path("Sub1".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(unit_of_work.snapshot().subscriptions[0].status, "Cancelled");
    }
}

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use crate::{
    application::usercases::subscriptions::SubscriptionUseCase,
    domain::repositories::{mail_notifier::MailNotifier, unit_of_work::UnitOfWork},
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
            "/:subscription_dish_id/deliveries",
            get(list_deliveries::<PgUnitOfWork, HttpMailNotifier>),
        )
        .with_state(Arc::new(subscription_usecase))
}

pub async fn list_deliveries<U, M>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<U, M>>>,
    auth: AuthUser,
    Path(subscription_dish_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: UnitOfWork + 'static,
    M: MailNotifier + Send + Sync + 'static,
{
    let deliveries = subscription_usecase
        .list_dish_deliveries(&auth.user_id, &subscription_dish_id)
        .await?;

    Ok(ApiResponse::ok("dish deliveries loaded", deliveries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usercases::memory_store::{MemoryUnitOfWork, seeded_subscription},
        domain::repositories::mail_notifier::MockMailNotifier,
    };
    use axum::http::StatusCode;

    #[tokio::test]
    async fn deliveries_of_a_foreign_dish_are_not_found() {
        let unit_of_work = Arc::new(MemoryUnitOfWork::seeded(seeded_subscription(&[])));
        let usecase = Arc::new(SubscriptionUseCase::new(
            unit_of_work,
            Arc::new(MockMailNotifier::new()),
        ));

        for (user_id, dish_id, expected) in [
            ("user-2", "SDish0", StatusCode::NOT_FOUND),
            ("user-1", "SDish404", StatusCode::NOT_FOUND),
            ("user-1", "SDish0", StatusCode::OK),
        ] {
            let response = list_deliveries(
                State(Arc::clone(&usecase)),
                AuthUser {
                    user_id: user_id.to_string(),
                },
                Path(dish_id.to_string()),
            )
            .await
            .into_response();
            assert_eq!(response.status(), expected, "{user_id} reading {dish_id}");
        }
    }
}

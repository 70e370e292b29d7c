use anyhow::Result;
use meal_subscription::{
    config::config_loader,
    infrastructure::{axum_http::http_serve, postgres::postgres_connection},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Service exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    meal_subscription::observability::init_observability("meal-subscription")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.connect_attempts,
        Duration::from_secs(dotenvy_env.database.connect_backoff_secs),
    )
    .await?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}

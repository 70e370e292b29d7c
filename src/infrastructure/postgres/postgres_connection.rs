use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tokio::task;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn build_pool(database_url: &str, connect_timeout: Duration) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_timeout(connect_timeout)
        .connection_customizer(Box::new(DisablePreparedStatements))
        .build(manager)?;
    Ok(pool)
}

/// Builds the pool, retrying while the database is still coming up.
pub async fn establish_connection(
    database_url: &str,
    attempts: u32,
    backoff: Duration,
) -> Result<PgPoolSquad> {
    connect_with(database_url, attempts, backoff, CONNECT_TIMEOUT).await
}

async fn connect_with(
    database_url: &str,
    attempts: u32,
    backoff: Duration,
    connect_timeout: Duration,
) -> Result<PgPoolSquad> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        // r2d2 blocks until the first connections are up or the timeout passes.
        let url = database_url.to_string();
        let built = task::spawn_blocking(move || build_pool(&url, connect_timeout)).await?;

        match built {
            Ok(pool) => {
                info!(attempt, "postgres: connection pool ready");
                return Ok(pool);
            }
            Err(err) if attempt < attempts => {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %err,
                    "postgres: not yet ready, retrying in {:?}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("postgres unreachable after {attempts} attempts"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    const UNREACHABLE: &str = "postgres://nobody@127.0.0.1:1/unreachable";

    #[tokio::test(flavor = "current_thread")]
    async fn pool_build_leaves_the_runtime_free() {
        let ticks = Arc::new(AtomicU32::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let result = connect_with(
            UNREACHABLE,
            1,
            Duration::from_millis(10),
            Duration::from_millis(300),
        )
        .await;
        ticker.abort();

        assert!(result.is_err());
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn gives_up_after_the_configured_attempts() {
        let err = connect_with(
            UNREACHABLE,
            2,
            Duration::from_millis(10),
            Duration::from_millis(100),
        )
        .await
        .err()
        .expect("an unreachable database must not yield a pool");

        assert!(err.to_string().contains("after 2 attempts"));
    }
}

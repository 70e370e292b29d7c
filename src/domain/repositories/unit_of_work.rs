use anyhow::Result;
use async_trait::async_trait;

use crate::domain::repositories::subscription_store::SubscriptionStore;

/// Runs a block of store operations as one atomic unit. Returning `Err` from
/// `work` discards every write it made.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn execute<R, F>(&self, work: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn SubscriptionStore) -> Result<R> + Send + 'static;
}

#[cfg(test)]
pub mod memory_store;
pub mod subscriptions;

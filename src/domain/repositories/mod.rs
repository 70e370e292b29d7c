pub mod mail_notifier;
pub mod subscription_store;
pub mod unit_of_work;

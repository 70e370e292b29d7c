pub mod axum_http;
pub mod mail;
pub mod postgres;

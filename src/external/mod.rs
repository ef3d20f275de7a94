pub mod api;
pub mod auth_client;
pub mod http;
pub mod retry;

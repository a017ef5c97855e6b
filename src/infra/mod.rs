pub mod http_client;
pub mod session_store;

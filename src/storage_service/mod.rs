pub mod http_client;
pub mod models;
pub mod storage_client;

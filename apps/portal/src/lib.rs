pub mod api_client;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod profile;
pub mod sanitize;
pub mod state;
pub mod store;

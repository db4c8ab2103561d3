pub mod admin;
pub mod config;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod metrics;
pub mod observability;
pub mod password;
pub mod registration;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;

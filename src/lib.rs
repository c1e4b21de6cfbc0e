pub mod api;
pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod models;
pub mod publisher;
pub mod worker;

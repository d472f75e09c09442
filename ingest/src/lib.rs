pub mod api;
pub mod config;
pub mod envelope;
pub mod handler;
pub mod ip;
pub mod request;
pub mod sink;

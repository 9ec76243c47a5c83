pub mod models;
pub mod service;
pub mod shopping;
pub mod store;

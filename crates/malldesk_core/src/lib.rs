pub mod config;
pub mod error;
pub mod listener;
pub mod model;
pub mod storage;
pub mod ticket_api;

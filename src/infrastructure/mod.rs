pub mod config;
pub mod day_store;
pub mod error;
pub mod export;

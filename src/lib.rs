pub mod api;
pub mod collect;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pacer;
pub mod parser;
pub mod stats;
pub mod store;

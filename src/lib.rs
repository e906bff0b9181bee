pub mod aggregates;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod http_api;
pub mod innings;
pub mod logging;
pub mod partnerships;
pub mod performance;
pub mod phase;
pub mod stats;
pub mod tables;

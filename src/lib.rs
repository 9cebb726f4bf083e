pub mod adapters;
pub mod cache;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod refresh;
pub mod renderer;
pub mod server;
pub mod service;
pub mod sources;
pub mod types;

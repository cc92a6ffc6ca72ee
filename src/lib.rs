pub mod analysis;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod types;

pub mod client;
pub mod config;
pub mod messages;
pub mod status;
pub mod telemetry;

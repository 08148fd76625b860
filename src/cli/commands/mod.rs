//! CLI command implementations.

mod agent;
mod config;
mod doctor;
mod fetch;
mod report;

pub use agent::run_agent;
pub use config::run_config;
pub use doctor::run_doctor;
pub use fetch::run_fetch;
pub use report::run_report;

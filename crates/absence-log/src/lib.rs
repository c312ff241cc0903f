pub mod absences;
pub mod config;
pub mod error;
pub mod telemetry;

//! Port traits for the data, configuration and report boundaries.

pub mod config_port;
pub mod data_port;
pub mod report_port;

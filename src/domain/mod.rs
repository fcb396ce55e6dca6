//! Core domain types and logic.

pub mod error;
pub mod table;
pub mod cleaning;
pub mod features;
pub mod window;
pub mod linalg;
pub mod metrics;
pub mod models;
pub mod feature_bag;
pub mod evaluation;
pub mod ranking;
pub mod config_validation;
pub mod study;

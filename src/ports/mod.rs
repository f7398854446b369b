//! Port traits the engine consumes; concrete implementations live in
//! [`crate::adapters`].

pub mod config_port;
pub mod fundamentals_port;
pub mod price_port;
pub mod report_port;
pub mod scoring_port;

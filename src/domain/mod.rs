//! Core domain types and logic.

pub mod allocation;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod fundamentals;
pub mod history;
pub mod metrics;
pub mod portfolio;
pub mod prices;
pub mod schedule;
pub mod scoring;
pub mod selection;
pub mod simulation;

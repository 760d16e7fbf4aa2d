//! Core domain types and logic.

pub mod alignment;
pub mod analysis;
pub mod config_validation;
pub mod correlation;
pub mod error;
pub mod forecast;
pub mod indicator;
pub mod interval;
pub mod ohlcv;
pub mod screener;
pub mod selector;
pub mod sentiment;
pub mod ticker_finder;
pub mod universe;

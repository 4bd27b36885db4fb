//! Core exchange-rate abstractions

pub mod dates;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use rate::{HistoricalSeries, RateProvider, RateQuote, RateTable};

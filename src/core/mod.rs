//! Core conversion logic and abstractions

pub mod config;
pub mod converter;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use converter::{Converter, ConverterState, FetchFailure, Quote};
pub use rates::{RateProvider, RateTable};

//! Core business logic abstractions

pub mod convert;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionEngine, ConvertError};
pub use rates::{CurrencyCatalog, RateError, RateProvider};

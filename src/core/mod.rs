//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod source;

// Re-export main types for cleaner imports
pub use error::SourceError;
pub use source::{
    Catalog, ConfigOption, ConfigValue, Conversion, ConvertedAmount, OptionKind, Source,
    SourceConfig,
};
